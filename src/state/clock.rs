use std::time::Instant;

/// Stopwatch used to time a single connect attempt
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    started_at: Option<Instant>,
}

impl Clock {
    pub fn new() -> Self {
        Self { started_at: None }
    }

    /// Create a clock that is already running
    pub fn started() -> Self {
        Self {
            started_at: Some(Instant::now()),
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Elapsed milliseconds since `start()`, or `None` if the clock is not running
    pub fn peek(&self) -> Option<u64> {
        self.started_at
            .map(|at| at.elapsed().as_millis().min(u64::MAX as u128) as u64)
    }

    /// Read the elapsed time and stop the clock
    pub fn stop(&mut self) -> Option<u64> {
        let elapsed = self.peek();
        self.started_at = None;
        elapsed
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}
