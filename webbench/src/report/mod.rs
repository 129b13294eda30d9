//! Reporting of a benchmark run, as human text or JSON lines.
//!
//! Reports are written to stdout (or any other writer),
//! logs go to stderr and are not part of the report.

use crate::{
    bench::{AggregateResult, Tally, WorkerId},
    config::RunConfig,
};

mod human;
mod json;

pub use self::{human::HumanReporter, json::JsonlReporter};

pub trait Reporter: Send + Sync + 'static {
    /// Called once, before any worker starts.
    fn on_start(&mut self, cfg: &RunConfig);
    /// Called once per worker, in order of arrival.
    fn on_worker_done(&mut self, worker: WorkerId, tally: &Tally);
    /// Called once, after all workers reported.
    fn finish(&mut self, result: &AggregateResult);
}
