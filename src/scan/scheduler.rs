use anyhow::Result;
use parking_lot::RwLock;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::probe::Connector;
use crate::scan::probe::PortProbe;
use crate::scan::tasks::ProbeSet;
use crate::state::{PortRange, ScanSession, Snapshot};

/// Admits port probes under a concurrency budget and publishes ranked snapshots
pub struct ProbeScheduler<C> {
    address: IpAddr,
    range: PortRange,
    concurrency: u64,
    /// Next port not yet handed to a probe (u32 so it can pass 65535)
    frontier: u32,
    state: Arc<RwLock<ScanSession>>,
    connector: Arc<C>,
    probes: ProbeSet,
    cancel: CancellationToken,
}

impl<C: Connector> ProbeScheduler<C> {
    pub fn new(
        state: Arc<RwLock<ScanSession>>,
        connector: Arc<C>,
        cancel: CancellationToken,
    ) -> Self {
        let (address, range, concurrency) = {
            let state = state.read();
            (
                state.target.resolved,
                state.range,
                state.config.concurrency.max(1) as u64,
            )
        };

        Self {
            address,
            range,
            concurrency,
            frontier: range.start() as u32,
            state,
            connector,
            probes: ProbeSet::new(),
            cancel,
        }
    }

    /// Ports not yet admitted
    pub fn remaining(&self) -> u32 {
        (self.range.end() as u32 + 1).saturating_sub(self.frontier)
    }

    /// Number of probe handles currently held
    pub fn held(&self) -> usize {
        self.probes.len()
    }

    fn has_capacity(&self) -> bool {
        self.state.read().counters.active < self.concurrency
    }

    /// Start probes for unassigned ports while under the concurrency budget
    pub fn admit(&mut self) -> usize {
        let mut admitted = 0;

        while self.frontier <= self.range.end() as u32 && self.has_capacity() {
            let port = self.frontier as u16;
            let probe = PortProbe::new(
                self.address,
                port,
                self.state.clone(),
                self.connector.clone(),
                self.cancel.child_token(),
            );
            self.probes.insert(port, probe.spawn());
            self.frontier += 1;
            admitted += 1;
        }

        if admitted > 0 {
            debug!(admitted, remaining = self.remaining(), "admitted probes");
        }
        admitted
    }

    /// One refresh: reap, admit, rank
    pub fn tick(&mut self) -> Snapshot {
        self.probes.reap();
        self.admit();
        self.state.write().snapshot()
    }

    /// Tick on the refresh interval until cancelled, publishing every snapshot
    pub async fn run(mut self, snapshot_tx: watch::Sender<Snapshot>) -> Result<()> {
        let mut interval = tokio::time::interval(self.state.read().config.refresh_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    break;
                }
                _ = interval.tick() => {
                    let snapshot = self.tick();
                    snapshot_tx.send_replace(snapshot);
                }
            }
        }

        self.probes.join_all().await;
        Ok(())
    }
}
