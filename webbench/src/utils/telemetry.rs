use std::{fs::OpenOptions, io::IsTerminal as _, path::Path};

use rama::{
    error::{BoxError, ErrorContext as _, OpaqueError},
    telemetry::tracing::{
        self,
        metadata::LevelFilter,
        subscriber::{EnvFilter, fmt::writer::BoxMakeWriter},
    },
};

/// Options for [`init_tracing`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryConfig<'a> {
    /// DEBUG instead of INFO as the default level
    pub verbose: bool,
    /// multi-line output, easier on the eyes while debugging a run
    pub pretty: bool,
    /// append logs to this file instead of writing them to stderr
    pub output: Option<&'a Path>,
}

impl TelemetryConfig<'_> {
    fn default_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }

    // colors only make sense for a terminal
    fn use_ansi(&self) -> bool {
        self.output.is_none() && std::io::stderr().is_terminal()
    }

    fn make_writer(&self) -> Result<BoxMakeWriter, OpaqueError> {
        let Some(path) = self.output else {
            return Ok(BoxMakeWriter::new(std::io::stderr));
        };

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("open log file '{}'", path.display()))?;
        Ok(BoxMakeWriter::new(file))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the default level.
/// Stdout is never written to, as it is reserved for the benchmark report.
pub fn init_tracing(cfg: TelemetryConfig<'_>) -> Result<(), BoxError> {
    let filter = EnvFilter::builder()
        .with_default_directive(cfg.default_level().into())
        .from_env_lossy();

    let subscriber = tracing::subscriber::fmt()
        .with_ansi(cfg.use_ansi())
        .with_env_filter(filter)
        .with_writer(cfg.make_writer()?);

    if cfg.pretty {
        subscriber.pretty().try_init()?;
    } else {
        subscriber.try_init()?;
    }

    tracing::debug!(
        verbose = cfg.verbose,
        pretty = cfg.pretty,
        output = ?cfg.output,
        "tracing initialised",
    );
    Ok(())
}
