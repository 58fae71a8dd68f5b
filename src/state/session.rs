use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use crate::config::Config;
use crate::state::table::{PortLatency, ResultTable, Sample};

/// Highest valid TCP port
pub const MAX_PORT: i64 = u16::MAX as i64;

/// Host being scanned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub original: String,
    pub resolved: IpAddr,
    pub hostname: Option<String>,
}

impl Target {
    pub fn new(original: String, resolved: IpAddr) -> Self {
        Self {
            original,
            resolved,
            hostname: None,
        }
    }
}

/// Inclusive port range, always within `[0, 65535]` and `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl Default for PortRange {
    fn default() -> Self {
        Self { start: 1, end: u16::MAX }
    }
}

impl PortRange {
    /// Clamp both bounds into `[0, 65535]`; an inverted range collapses to `start`
    pub fn new(start: i64, end: i64) -> Self {
        let start = start.clamp(0, MAX_PORT) as u16;
        let end = end.clamp(0, MAX_PORT) as u16;
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn single(port: u16) -> Self {
        Self { start: port, end: port }
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of ports in the range (never zero)
    pub fn len(&self) -> u32 {
        self.end as u32 - self.start as u32 + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Probe lifecycle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeCounters {
    /// Probes ever created
    pub total: u64,
    /// Probes currently alive
    pub active: u64,
    /// Probes that gave up on their port
    pub dead: u64,
}

impl ProbeCounters {
    pub fn record_spawned(&mut self) {
        self.total += 1;
        self.active += 1;
    }

    pub fn record_abandoned(&mut self) {
        self.active = self.active.saturating_sub(1);
        self.dead += 1;
    }
}

/// State shared by the scheduler, every probe and the renderers
#[derive(Debug, Clone)]
pub struct ScanSession {
    pub target: Target,
    pub range: PortRange,
    pub config: Config,
    pub started_at: DateTime<Utc>,
    pub table: ResultTable,
    pub counters: ProbeCounters,
}

impl ScanSession {
    pub fn new(target: Target, range: PortRange, config: Config) -> Self {
        Self {
            target,
            range,
            config,
            started_at: Utc::now(),
            table: ResultTable::new(),
            counters: ProbeCounters::default(),
        }
    }

    /// Store the latest outcome for a port
    pub fn record(&mut self, port: u16, sample: Sample) {
        self.table.set(port, sample);
    }

    /// Re-rank the table and capture what the renderer needs
    pub fn snapshot(&mut self) -> Snapshot {
        self.table.rank();
        Snapshot {
            target: self.target.clone(),
            range: self.range,
            counters: self.counters,
            reachable: self.table.ranked_reachable(),
            started_at: self.started_at,
            taken_at: Utc::now(),
        }
    }
}

/// Ranked view of a scan at one refresh tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub target: Target,
    pub range: PortRange,
    pub counters: ProbeCounters,
    /// Reachable ports, fastest first
    pub reachable: Vec<PortLatency>,
    pub started_at: DateTime<Utc>,
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// Rank (0-based) of a port among the reachable ones
    pub fn position(&self, port: u16) -> Option<usize> {
        self.reachable.iter().position(|p| p.port == port)
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.taken_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn session() -> ScanSession {
        let target = Target::new(
            "localhost".to_string(),
            IpAddr::V4(Ipv4Addr::LOCALHOST),
        );
        ScanSession::new(target, PortRange::new(1, 1000), Config::default())
    }

    #[test]
    fn test_range_clamps_out_of_bounds() {
        let range = PortRange::new(-5, 70000);
        assert_eq!(range.start(), 0);
        assert_eq!(range.end(), 65535);
        assert_eq!(range.len(), 65536);
    }

    #[test]
    fn test_inverted_range_collapses_to_start() {
        let range = PortRange::new(100, 50);
        assert_eq!(range, PortRange::single(100));
        assert_eq!(range.len(), 1);
    }

    #[test]
    fn test_range_both_bounds_above_max() {
        let range = PortRange::new(70000, 80000);
        assert_eq!(range, PortRange::single(65535));
    }

    #[test]
    fn test_range_display_and_contains() {
        let range = PortRange::new(1, 1024);
        assert_eq!(range.to_string(), "1-1024");
        assert!(range.contains(1));
        assert!(range.contains(1024));
        assert!(!range.contains(0));
        assert!(!range.contains(1025));
        assert_eq!(PortRange::default(), PortRange::new(1, 65535));
    }

    #[test]
    fn test_counters_lifecycle() {
        let mut counters = ProbeCounters::default();
        counters.record_spawned();
        counters.record_spawned();
        counters.record_abandoned();

        assert_eq!(counters.total, 2);
        assert_eq!(counters.active, 1);
        assert_eq!(counters.dead, 1);
    }

    #[test]
    fn test_snapshot_lists_reachable_only() {
        let mut session = session();
        session.record(80, Sample::Reachable(7));
        session.record(443, Sample::Reachable(3));
        session.record(22, Sample::Unreachable);
        session.counters.record_spawned();

        let snapshot = session.snapshot();
        let ports: Vec<u16> = snapshot.reachable.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![443, 80]);
        assert_eq!(snapshot.counters.total, 1);
        assert_eq!(snapshot.position(80), Some(1));
        assert_eq!(snapshot.position(22), None);
        assert_eq!(snapshot.range, PortRange::new(1, 1000));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut session = session();
        session.record(8080, Sample::Reachable(11));
        let snapshot = session.snapshot();

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
