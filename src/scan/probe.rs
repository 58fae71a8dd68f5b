use parking_lot::RwLock;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::probe::{Connector, FailureKind, ProbeOutcome};
use crate::state::ScanSession;

/// What a probe does after recording an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Retry,
    Abandon,
}

/// Consecutive-failure allowance for one port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    initial: u32,
    remaining: u32,
}

impl RetryBudget {
    pub fn new(initial: u32) -> Self {
        let initial = initial.max(1);
        Self {
            initial,
            remaining: initial,
        }
    }

    #[allow(dead_code)]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// A success restores the full allowance
    pub fn on_success(&mut self) {
        self.remaining = self.initial;
    }

    pub fn on_failure(&mut self) -> Verdict {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            Verdict::Abandon
        } else {
            Verdict::Retry
        }
    }
}

/// Repeatedly probes one port until its retry budget runs out.
///
/// A port that keeps answering is probed for the lifetime of the scan; only
/// cancellation ends it. Creating a probe counts it as spawned and active in
/// the session counters, and abandoning the port counts it as dead.
pub struct PortProbe<C> {
    addr: SocketAddr,
    budget: RetryBudget,
    interval: Duration,
    state: Arc<RwLock<ScanSession>>,
    connector: Arc<C>,
    cancel: CancellationToken,
}

impl<C: Connector> PortProbe<C> {
    pub fn new(
        address: IpAddr,
        port: u16,
        state: Arc<RwLock<ScanSession>>,
        connector: Arc<C>,
        cancel: CancellationToken,
    ) -> Self {
        let (budget, interval) = {
            let mut state = state.write();
            state.counters.record_spawned();
            (
                RetryBudget::new(state.config.retry_budget),
                state.config.probe_interval,
            )
        };

        Self {
            addr: SocketAddr::new(address, port),
            budget,
            interval,
            state,
            connector,
            cancel,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Attempt, record, wait, repeat
    pub async fn run(mut self) {
        loop {
            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => return,
                outcome = self.connector.connect(self.addr) => outcome,
            };

            if self.record(outcome) == Verdict::Abandon {
                self.state.write().counters.record_abandoned();
                debug!(port = self.port(), "port abandoned");
                return;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    /// Apply one outcome to the table and the retry budget
    fn record(&mut self, outcome: ProbeOutcome) -> Verdict {
        let port = self.port();
        match outcome {
            ProbeOutcome::Connected { latency_ms } => {
                trace!(port, latency_ms, "connected");
                self.state.write().record(port, outcome.sample());
                self.budget.on_success();
                Verdict::Retry
            }
            ProbeOutcome::Failed(FailureKind::LocalResource) => {
                warn!(port, "local socket resources exhausted, retrying");
                Verdict::Retry
            }
            ProbeOutcome::Failed(kind) => {
                trace!(port, ?kind, "connect failed");
                self.state.write().record(port, outcome.sample());
                self.budget.on_failure()
            }
        }
    }
}
