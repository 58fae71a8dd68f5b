//! Per-port latency history gathered from successive snapshots.
//!
//! The scan engine only keeps the latest sample per port; the TUI keeps a
//! short rolling window of what it has displayed so the port list can draw
//! sparklines. Nothing here outlives the process.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

use crate::state::Snapshot;

/// Samples kept per port
pub const HISTORY_LEN: usize = 60;

#[derive(Debug, Default)]
pub struct LatencyHistory {
    ports: HashMap<u16, VecDeque<Option<u64>>>,
    last_taken: Option<DateTime<Utc>>,
}

impl LatencyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a snapshot; the same snapshot seen twice is only counted once.
    ///
    /// Ports that were reachable before but are missing now get a gap.
    pub fn observe(&mut self, snapshot: &Snapshot) {
        if self.last_taken == Some(snapshot.taken_at) {
            return;
        }
        self.last_taken = Some(snapshot.taken_at);

        for entry in &snapshot.reachable {
            self.ports.entry(entry.port).or_default();
        }

        for (port, samples) in self.ports.iter_mut() {
            let sample = snapshot
                .reachable
                .iter()
                .find(|p| p.port == *port)
                .map(|p| p.latency_ms);
            samples.push_back(sample);
            if samples.len() > HISTORY_LEN {
                samples.pop_front();
            }
        }
    }

    pub fn samples(&self, port: u16) -> Vec<Option<u64>> {
        self.ports
            .get(&port)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Min, average and max over the recorded latencies of a port
    pub fn stats(&self, port: u16) -> Option<(u64, f64, u64)> {
        let samples = self.ports.get(&port)?;
        let values: Vec<u64> = samples.iter().flatten().copied().collect();
        if values.is_empty() {
            return None;
        }
        let min = *values.iter().min()?;
        let max = *values.iter().max()?;
        let avg = values.iter().sum::<u64>() as f64 / values.len() as f64;
        Some((min, avg, max))
    }

    /// Fraction of recorded refreshes where the port was missing
    pub fn gap_pct(&self, port: u16) -> f64 {
        match self.ports.get(&port) {
            Some(samples) if !samples.is_empty() => {
                let gaps = samples.iter().filter(|s| s.is_none()).count();
                gaps as f64 / samples.len() as f64 * 100.0
            }
            _ => 0.0,
        }
    }
}
