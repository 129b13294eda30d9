use std::io::Write;

use rama::telemetry::tracing;

use crate::{
    bench::{AggregateResult, Tally, WorkerId},
    config::RunConfig,
};

use super::Reporter;

/// Machine readable report, one JSON object per line.
pub struct JsonlReporter<W = std::io::Stdout> {
    writer: W,
}

impl JsonlReporter {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }
}

impl Default for JsonlReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> JsonlReporter<W> {
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + Sync + 'static> JsonlReporter<W> {
    fn emit(&mut self, line: serde_json::Value) {
        if let Err(err) = writeln!(self.writer, "{line}").and_then(|_| self.writer.flush()) {
            tracing::error!("failed to write json report line: {err}");
        }
    }
}

impl<W: Write + Send + Sync + 'static> Reporter for JsonlReporter<W> {
    fn on_start(&mut self, cfg: &RunConfig) {
        let request = cfg.request();
        self.emit(serde_json::json!({
            "type": "start",
            "url": request.uri().to_string(),
            "method": request.method().as_str(),
            "clients": cfg.clients(),
            "duration_s": cfg.duration().as_secs_f64(),
            "request_timeout_ms": cfg.request_timeout().as_millis() as u64,
            "fire_and_forget": cfg.fire_and_forget(),
            "reload": request.is_reload(),
            "proxy": cfg.proxy().map(|proxy| proxy.to_string()),
        }));
    }

    fn on_worker_done(&mut self, worker: WorkerId, tally: &Tally) {
        self.emit(serde_json::json!({
            "type": "worker",
            "worker": worker.index(),
            "succeeded": tally.succeeded,
            "failed": tally.failed,
            "bytes_read": tally.bytes_read,
        }));
    }

    fn finish(&mut self, result: &AggregateResult) {
        self.emit(serde_json::json!({
            "type": "final",
            "clients": result.clients(),
            "duration_s": result.duration().as_secs_f64(),
            "succeeded": result.succeeded(),
            "failed": result.failed(),
            "bytes_read": result.bytes_read(),
            "pages_per_minute": result.pages_per_minute(),
            "bytes_per_second": result.bytes_per_second(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rama::http::Uri;

    use crate::config::{HttpMethod, RequestSpec};

    use super::*;

    #[test]
    fn test_jsonl_report_output() {
        let request = RequestSpec::try_new(
            HttpMethod::Head,
            Uri::from_static("https://example.test/page"),
            true,
        )
        .unwrap();
        let cfg = RunConfig::try_new(request, Duration::from_secs(10))
            .unwrap()
            .with_clients(2)
            .with_request_timeout(Duration::from_secs(5));

        let mut reporter = JsonlReporter::with_writer(Vec::new());
        reporter.on_start(&cfg);

        let tallies = [
            Tally {
                succeeded: 90,
                failed: 5,
                bytes_read: 0,
            },
            Tally {
                succeeded: 100,
                failed: 5,
                bytes_read: 0,
            },
        ];
        reporter.on_worker_done(WorkerId::new(1), &tallies[0]);
        reporter.on_worker_done(WorkerId::new(0), &tallies[1]);
        reporter.finish(&AggregateResult::new(2, cfg.duration(), tallies));

        let output = String::from_utf8(reporter.into_writer()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);

        assert_eq!(lines[0]["type"], "start");
        assert_eq!(lines[0]["url"], "https://example.test/page");
        assert_eq!(lines[0]["method"], "HEAD");
        assert_eq!(lines[0]["clients"], 2);
        assert_eq!(lines[0]["request_timeout_ms"], 5000);
        assert_eq!(lines[0]["reload"], true);
        assert!(lines[0]["proxy"].is_null());

        assert_eq!(lines[1]["type"], "worker");
        assert_eq!(lines[1]["worker"], 1);
        assert_eq!(lines[1]["succeeded"], 90);
        assert_eq!(lines[2]["worker"], 0);

        assert_eq!(lines[3]["type"], "final");
        assert_eq!(lines[3]["succeeded"], 190);
        assert_eq!(lines[3]["failed"], 10);
        assert_eq!(lines[3]["pages_per_minute"], 1200.0);
        assert_eq!(lines[3]["bytes_per_second"], 0.0);
    }
}
