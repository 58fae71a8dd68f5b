//! Per-port result table.
//!
//! The table holds one [`Sample`] for every possible TCP port and a rank
//! order over all of them. The rank order persists between calls to
//! [`ResultTable::rank`], and the sort is stable, so ports with equal samples
//! keep the relative position they had on the previous refresh.

use serde::{Deserialize, Serialize};

/// Number of entries in the table (one per possible port)
pub const PORT_COUNT: usize = 1 << 16;

/// Latest outcome for one port
///
/// Variant order matters: the derived `Ord` sorts every `Reachable` sample
/// (by ascending latency) before `Unreachable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sample {
    /// Connect latency in milliseconds
    Reachable(u64),
    Unreachable,
}

impl Sample {
    pub fn latency_ms(&self) -> Option<u64> {
        match self {
            Sample::Reachable(ms) => Some(*ms),
            Sample::Unreachable => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, Sample::Reachable(_))
    }
}

/// A reachable port and its latest latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortLatency {
    pub port: u16,
    pub latency_ms: u64,
}

/// Port → latest sample, plus the persistent rank order
#[derive(Debug, Clone)]
pub struct ResultTable {
    samples: Vec<Sample>,
    order: Vec<u16>,
}

impl Default for ResultTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultTable {
    /// Every port starts out unreachable
    pub fn new() -> Self {
        Self {
            samples: vec![Sample::Unreachable; PORT_COUNT],
            order: (0..=u16::MAX).collect(),
        }
    }

    pub fn set(&mut self, port: u16, sample: Sample) {
        self.samples[port as usize] = sample;
    }

    pub fn get(&self, port: u16) -> Sample {
        self.samples[port as usize]
    }

    /// Re-sort all ports by their current sample and return the order
    pub fn rank(&mut self) -> &[u16] {
        let samples = &self.samples;
        self.order.sort_by_key(|&port| samples[port as usize]);
        &self.order
    }

    /// Reachable ports in rank order, as of the last call to [`rank`](Self::rank)
    pub fn ranked_reachable(&self) -> Vec<PortLatency> {
        self.order
            .iter()
            .map_while(|&port| {
                self.samples[port as usize]
                    .latency_ms()
                    .map(|latency_ms| PortLatency { port, latency_ms })
            })
            .collect()
    }

    pub fn reachable_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_reachable()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_table_is_all_unreachable() {
        let table = ResultTable::new();
        assert_eq!(table.get(0), Sample::Unreachable);
        assert_eq!(table.get(u16::MAX), Sample::Unreachable);
        assert_eq!(table.reachable_count(), 0);
    }

    #[test]
    fn test_set_replaces_previous_sample() {
        let mut table = ResultTable::new();
        table.set(80, Sample::Reachable(12));
        table.set(80, Sample::Reachable(3));
        assert_eq!(table.get(80), Sample::Reachable(3));

        table.set(80, Sample::Unreachable);
        assert_eq!(table.get(80), Sample::Unreachable);
        assert_eq!(table.reachable_count(), 0);
    }

    #[test]
    fn test_sample_ordering() {
        assert!(Sample::Reachable(0) < Sample::Reachable(1));
        assert!(Sample::Reachable(u64::MAX) < Sample::Unreachable);
    }

    #[test]
    fn test_rank_orders_by_latency() {
        let mut table = ResultTable::new();
        table.set(80, Sample::Reachable(5));
        table.set(443, Sample::Reachable(2));
        table.set(22, Sample::Reachable(9));

        let order = table.rank();
        assert_eq!(&order[..3], &[443, 80, 22]);

        let ranked = table.ranked_reachable();
        assert_eq!(
            ranked,
            vec![
                PortLatency { port: 443, latency_ms: 2 },
                PortLatency { port: 80, latency_ms: 5 },
                PortLatency { port: 22, latency_ms: 9 },
            ]
        );
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let mut table = ResultTable::new();
        table.set(8080, Sample::Reachable(4));
        table.set(22, Sample::Reachable(1));
        table.rank();

        // 8080 now ties with 22; it was behind 22 before and stays there
        table.set(8080, Sample::Reachable(1));
        let order = table.rank();
        assert_eq!(&order[..2], &[22, 8080]);

        // Swap the tie the other way round by making 22 slower, then equal again
        table.set(22, Sample::Reachable(7));
        table.rank();
        table.set(22, Sample::Reachable(1));
        let order = table.rank();
        assert_eq!(&order[..2], &[8080, 22]);
    }

    #[test]
    fn test_port_dropping_out_leaves_reachable_list() {
        let mut table = ResultTable::new();
        table.set(80, Sample::Reachable(5));
        table.set(443, Sample::Reachable(2));
        table.rank();
        table.set(443, Sample::Unreachable);
        table.rank();

        let ranked = table.ranked_reachable();
        assert_eq!(ranked, vec![PortLatency { port: 80, latency_ms: 5 }]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_rank_is_total_and_ordered(
            writes in prop::collection::vec((any::<u16>(), prop::option::of(0u64..5_000)), 0..200)
        ) {
            let mut table = ResultTable::new();
            for (port, latency) in &writes {
                let sample = latency.map(Sample::Reachable).unwrap_or(Sample::Unreachable);
                table.set(*port, sample);
            }

            let order = table.rank().to_vec();
            prop_assert_eq!(order.len(), PORT_COUNT);

            // Every port appears exactly once
            let mut seen = vec![false; PORT_COUNT];
            for &port in &order {
                prop_assert!(!seen[port as usize]);
                seen[port as usize] = true;
            }

            // Non-decreasing samples: reachable ascending, unreachable last
            for pair in order.windows(2) {
                prop_assert!(table.get(pair[0]) <= table.get(pair[1]));
            }

            let ranked = table.ranked_reachable();
            prop_assert_eq!(ranked.len(), table.reachable_count());
        }
    }
}
