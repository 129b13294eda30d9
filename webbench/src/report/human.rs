use std::io::Write;

use rama::telemetry::tracing;

use crate::{
    bench::{AggregateResult, Tally, WorkerId},
    config::RunConfig,
};

use super::Reporter;

/// Plain text report, in the format made familiar by the classic `webbench`.
pub struct HumanReporter<W = std::io::Stdout> {
    writer: W,
}

impl HumanReporter {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }
}

impl Default for HumanReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> HumanReporter<W> {
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    pub(super) fn format_start(cfg: &RunConfig) -> String {
        let request = cfg.request();

        let clients = match cfg.clients() {
            1 => "1 client".to_owned(),
            n => format!("{n} clients"),
        };
        let mut details = vec![clients, format!("running {} sec", cfg.duration().as_secs())];
        if cfg.fire_and_forget() {
            details.push("early socket close".to_owned());
        }
        if let Some(proxy) = cfg.proxy() {
            details.push(format!("via proxy server {proxy}"));
        }
        if request.is_reload() {
            details.push("forcing reload".to_owned());
        }

        format!(
            "Benchmarking: {} {}\n{}.\n",
            request.method(),
            request.uri(),
            details.join(", "),
        )
    }

    pub(super) fn format_result(result: &AggregateResult) -> String {
        format!(
            "\n------ result ------\nSpeed={} pages/min, {} bytes/sec.\nRequests: {} succeeded, {} failed.\n",
            result.pages_per_minute() as u64,
            result.bytes_per_second() as u64,
            result.succeeded(),
            result.failed(),
        )
    }
}

impl<W: Write + Send + Sync + 'static> HumanReporter<W> {
    fn emit(&mut self, text: &str) {
        if let Err(err) = self
            .writer
            .write_all(text.as_bytes())
            .and_then(|_| self.writer.flush())
        {
            tracing::error!("failed to write human report: {err}");
        }
    }
}

impl<W: Write + Send + Sync + 'static> Reporter for HumanReporter<W> {
    fn on_start(&mut self, cfg: &RunConfig) {
        self.emit(&Self::format_start(cfg));
    }

    fn on_worker_done(&mut self, worker: WorkerId, tally: &Tally) {
        tracing::debug!(
            %worker,
            succeeded = tally.succeeded,
            failed = tally.failed,
            bytes_read = tally.bytes_read,
            "worker done",
        );
    }

    fn finish(&mut self, result: &AggregateResult) {
        self.emit(&Self::format_result(result));
    }
}
