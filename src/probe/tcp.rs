use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use crate::probe::socket::{create_connect_socket, is_local_resource_error};
use crate::state::{Clock, Sample};

/// Why a connect attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Refused,
    TimedOut,
    Unreachable,
    /// Ran out of local sockets or ports; says nothing about the target
    LocalResource,
    Other(io::ErrorKind),
}

impl From<&io::Error> for FailureKind {
    fn from(err: &io::Error) -> Self {
        if is_local_resource_error(err) {
            return FailureKind::LocalResource;
        }
        match err.kind() {
            io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => {
                FailureKind::Refused
            }
            io::ErrorKind::TimedOut => FailureKind::TimedOut,
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
                FailureKind::Unreachable
            }
            kind => FailureKind::Other(kind),
        }
    }
}

/// Result of a single connect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Connected { latency_ms: u64 },
    Failed(FailureKind),
}

impl ProbeOutcome {
    /// Table entry for this outcome
    pub fn sample(&self) -> Sample {
        match self {
            ProbeOutcome::Connected { latency_ms } => Sample::Reachable(*latency_ms),
            ProbeOutcome::Failed(_) => Sample::Unreachable,
        }
    }
}

/// Performs one connection attempt against an address
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, addr: SocketAddr) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Real TCP handshake connector
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector {
    timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl Connector for TcpConnector {
    async fn connect(&self, addr: SocketAddr) -> ProbeOutcome {
        connect_once(addr, self.timeout).await
    }
}

/// Await `attempt`, failing with `TimedOut` once `limit` has passed.
///
/// Without a limit the attempt runs until it settles on its own.
pub async fn bounded<F, T>(attempt: F, limit: Option<Duration>) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, attempt)
            .await
            .unwrap_or_else(|_| Err(io::ErrorKind::TimedOut.into())),
        None => attempt.await,
    }
}

/// Attempt a TCP handshake and time it; the connection is closed right away
pub async fn connect_once(addr: SocketAddr, timeout: Option<Duration>) -> ProbeOutcome {
    let clock = Clock::started();

    let attempt = async {
        let socket = create_connect_socket(&addr)?;
        socket.connect(addr).await
    };

    let result = bounded(attempt, timeout).await;

    match result {
        Ok(stream) => {
            let latency_ms = clock.peek().unwrap_or_default();
            drop(stream);
            ProbeOutcome::Connected { latency_ms }
        }
        Err(e) => ProbeOutcome::Failed(FailureKind::from(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_to_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let outcome = connect_once(addr, Some(Duration::from_secs(2))).await;
        assert!(matches!(outcome, ProbeOutcome::Connected { .. }));
        assert!(outcome.sample().is_reachable());
    }

    #[tokio::test]
    async fn test_connect_to_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = connect_once(addr, Some(Duration::from_secs(2))).await;
        assert!(matches!(outcome, ProbeOutcome::Failed(_)));
        assert_eq!(outcome.sample(), Sample::Unreachable);
    }

    #[tokio::test]
    async fn test_connector_without_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);

        let connector = TcpConnector::new(None);
        let outcome = connector.connect(addr).await;
        assert!(matches!(outcome, ProbeOutcome::Connected { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_attempt_times_out() {
        let started = tokio::time::Instant::now();
        let limit = Duration::from_millis(3000);

        let err = bounded(std::future::pending::<io::Result<()>>(), Some(limit))
            .await
            .unwrap_err();
        assert_eq!(FailureKind::from(&err), FailureKind::TimedOut);
        assert!(started.elapsed() >= limit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_passes_through_settled_attempt() {
        let result = bounded(async { Ok::<_, io::Error>(7) }, Some(Duration::from_secs(1))).await;
        assert_eq!(result.unwrap(), 7);

        let refused = bounded(
            async { Err::<(), _>(io::Error::from(io::ErrorKind::ConnectionRefused)) },
            Some(Duration::from_secs(1)),
        )
        .await
        .unwrap_err();
        assert_eq!(FailureKind::from(&refused), FailureKind::Refused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_attempt_waits_for_settlement() {
        let attempt = bounded(std::future::pending::<io::Result<()>>(), None);
        let outer = tokio::time::timeout(Duration::from_secs(3600), attempt).await;
        assert!(outer.is_err());
    }

    #[test]
    fn test_failure_kind_classification() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(FailureKind::from(&refused), FailureKind::Refused);

        let timed_out = io::Error::from(io::ErrorKind::TimedOut);
        assert_eq!(FailureKind::from(&timed_out), FailureKind::TimedOut);

        let unreachable = io::Error::from(io::ErrorKind::HostUnreachable);
        assert_eq!(FailureKind::from(&unreachable), FailureKind::Unreachable);

        let other = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(
            FailureKind::from(&other),
            FailureKind::Other(io::ErrorKind::PermissionDenied)
        );
    }
}
