use crate::{
    bench::{AggregateResult, Tally, WorkerId},
    config::RunConfig,
    report::Reporter,
};

mod test_bench;

/// [`Reporter`] keeping every event in memory, for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    pub(crate) started: bool,
    pub(crate) workers: Vec<(WorkerId, Tally)>,
    pub(crate) finished: Option<AggregateResult>,
}

impl Reporter for RecordingReporter {
    fn on_start(&mut self, _cfg: &RunConfig) {
        assert!(!self.started, "run started twice");
        self.started = true;
    }

    fn on_worker_done(&mut self, worker: WorkerId, tally: &Tally) {
        assert!(self.started, "worker done before run started");
        self.workers.push((worker, *tally));
    }

    fn finish(&mut self, result: &AggregateResult) {
        assert!(self.finished.is_none(), "run finished twice");
        self.finished = Some(result.clone());
    }
}
