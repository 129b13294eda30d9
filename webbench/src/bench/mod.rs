//! The concurrent benchmark engine.
//!
//! A run spawns one worker task per client. All workers replay the same
//! request until a shared deadline fires, after which each of them hands
//! its [`Tally`] back over a channel to be summed into an [`AggregateResult`].

use std::fmt;

use rama::{
    Service,
    http::{Request, Response},
    telemetry::tracing::{self, Instrument as _},
};
use tokio::sync::mpsc;

use crate::{config::RunConfig, report::Reporter};

mod signal;
mod tally;
mod worker;

pub use self::{
    signal::{CancelSignal, CancelTrigger, cancel_signal, spawn_deadline},
    tally::{AggregateResult, Tally, WorkerId},
    worker::run_worker,
};

/// Final tally of a single worker, sent exactly once.
#[derive(Debug)]
struct WorkerReport {
    worker: WorkerId,
    tally: Tally,
}

/// Run the benchmark described by `cfg` using `client` for all requests.
///
/// Returns once every worker reported its tally, which happens at the latest
/// one request timeout after the deadline (or after `interrupt` resolved).
/// Worker level failures are only ever visible as counts in the result.
pub async fn run<S, F>(
    cfg: &RunConfig,
    client: S,
    interrupt: F,
    reporter: &mut dyn Reporter,
) -> AggregateResult
where
    S: Service<Request, Output = Response, Error: fmt::Display + Send> + Clone,
    F: Future<Output: Send + 'static> + Send + 'static,
{
    reporter.on_start(cfg);

    let clients = cfg.clients();
    if clients == 0 {
        tracing::info!("no clients configured: nothing to benchmark");
        let result = AggregateResult::new(0, cfg.duration(), []);
        reporter.finish(&result);
        return result;
    }

    tracing::info!(
        uri = %cfg.request().uri(),
        method = %cfg.request().method(),
        %clients,
        duration = ?cfg.duration(),
        request_timeout = ?cfg.request_timeout(),
        fire_and_forget = cfg.fire_and_forget(),
        "start benchmark run",
    );

    let (cancel, deadline) = spawn_deadline(cfg.duration(), interrupt);
    let (report_tx, mut report_rx) = mpsc::channel(clients);

    for index in 0..clients {
        let worker = WorkerId::new(index);
        let client = client.clone();
        let request = cfg.request().clone();
        let cancel = cancel.clone();
        let report_tx = report_tx.clone();
        let fire_and_forget = cfg.fire_and_forget();

        tokio::spawn(
            async move {
                let tally = run_worker(worker, client, request, cancel, fire_and_forget).await;
                if let Err(err) = report_tx.send(WorkerReport { worker, tally }).await {
                    tracing::debug!("failed to send worker report msg: {err}");
                }
            }
            .instrument(tracing::debug_span!("bench worker", worker = %worker)),
        );
    }

    // only the workers keep the channel open from here on
    drop(report_tx);

    let mut tallies = Vec::with_capacity(clients);
    while let Some(WorkerReport { worker, tally }) = report_rx.recv().await {
        tracing::debug!(%worker, ?tally, "received worker report");
        reporter.on_worker_done(worker, &tally);
        tallies.push(tally);
        if tallies.len() == clients {
            break;
        }
    }

    if tallies.len() < clients {
        tracing::error!(
            missing = clients - tallies.len(),
            "not all workers reported: result only contains the received tallies",
        );
    }

    deadline.abort();

    let result = AggregateResult::new(clients, cfg.duration(), tallies);
    tracing::info!(
        succeeded = result.succeeded(),
        failed = result.failed(),
        bytes_read = result.bytes_read(),
        "benchmark run finished",
    );
    reporter.finish(&result);
    result
}
