//! Handles of running port probes.
//!
//! Each admitted port has exactly one entry, keyed by port number. Probes
//! run on their own; the scheduler reaps the entries of probes that have
//! finished (abandoned their port) at the start of every tick.

use std::collections::HashMap;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct ProbeSet {
    handles: HashMap<u16, JoinHandle<()>>,
}

impl ProbeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, port: u16, handle: JoinHandle<()>) {
        if let Some(previous) = self.handles.insert(port, handle) {
            // A port is only ever admitted once
            previous.abort();
        }
    }

    pub fn contains(&self, port: u16) -> bool {
        self.handles.contains_key(&port)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Drop handles of probes that have stopped, returning how many were removed
    pub fn reap(&mut self) -> usize {
        let before = self.handles.len();
        self.handles.retain(|_, handle| !handle.is_finished());
        before - self.handles.len()
    }

    /// Wait for every probe to exit; callers cancel the probes first
    pub async fn join_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reap_removes_finished_only() {
        let mut set = ProbeSet::new();
        set.insert(80, tokio::spawn(async {}));
        set.insert(
            443,
            tokio::spawn(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }),
        );

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(set.reap(), 1);
        assert!(!set.contains(80));
        assert!(set.contains(443));
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_join_all_empties_set() {
        let mut set = ProbeSet::new();
        set.insert(22, tokio::spawn(async {}));
        set.insert(23, tokio::spawn(async {}));

        set.join_all().await;
        assert!(set.is_empty());
    }
}
