use std::{fmt, iter::Sum, ops::Add, time::Duration};

/// Identifies a single worker within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(usize);

impl WorkerId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Counters kept by a single worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// completed request/response cycles
    pub succeeded: u64,
    /// attempts that errored or whose response could not be fully read
    pub failed: u64,
    /// sum of all response body sizes, only counted when bodies are read
    pub bytes_read: u64,
}

impl Tally {
    pub fn record_success(&mut self, body_size: u64) {
        self.succeeded += 1;
        self.bytes_read = self.bytes_read.saturating_add(body_size);
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn attempts(&self) -> u64 {
        self.succeeded + self.failed
    }

    /// Close the tally of a worker that observed cancellation.
    ///
    /// One failure is taken back (never below zero): the attempt racing
    /// the deadline is not counted against the measured window.
    /// This is an approximation, not exact accounting.
    pub fn finalize(mut self) -> Self {
        self.failed = self.failed.saturating_sub(1);
        self
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Self) -> Self::Output {
        Tally {
            succeeded: self.succeeded.saturating_add(rhs.succeeded),
            failed: self.failed.saturating_add(rhs.failed),
            bytes_read: self.bytes_read.saturating_add(rhs.bytes_read),
        }
    }
}

impl Sum for Tally {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Tally::default(), Add::add)
    }
}

/// Totals of all workers of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    clients: usize,
    duration: Duration,
    totals: Tally,
}

impl AggregateResult {
    pub fn new(
        clients: usize,
        duration: Duration,
        tallies: impl IntoIterator<Item = Tally>,
    ) -> Self {
        Self {
            clients,
            duration,
            totals: tallies.into_iter().sum(),
        }
    }

    pub fn clients(&self) -> usize {
        self.clients
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn totals(&self) -> Tally {
        self.totals
    }

    pub fn succeeded(&self) -> u64 {
        self.totals.succeeded
    }

    pub fn failed(&self) -> u64 {
        self.totals.failed
    }

    pub fn bytes_read(&self) -> u64 {
        self.totals.bytes_read
    }

    /// Attempted pages per minute.
    ///
    /// Failed attempts are included: this measures the load put on the
    /// target, not only the successful throughput.
    pub fn pages_per_minute(&self) -> f64 {
        self.per_second(self.totals.attempts()) * 60.
    }

    pub fn bytes_per_second(&self) -> f64 {
        self.per_second(self.totals.bytes_read)
    }

    fn per_second(&self, value: u64) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0. { 0. } else { value as f64 / secs }
    }
}
