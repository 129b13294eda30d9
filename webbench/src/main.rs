#![cfg_attr(
    not(test),
    warn(clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

use std::{path::PathBuf, time::Duration};

use rama::{
    error::{BoxError, ErrorContext as _, OpaqueError},
    graceful::{self, ShutdownGuard},
    http::{Request, Response, Uri},
    net::address::ProxyAddress,
    rt::Executor,
    service::BoxService,
    telemetry::tracing,
};

use clap::Parser;
use webbench::{
    bench, client,
    config::{HttpMethod, RequestSpec, RunConfig},
    report::{HumanReporter, JsonlReporter, Reporter},
    utils,
};

#[cfg(target_family = "unix")]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// CLI arguments for configuring a webbench run.
#[derive(Debug, Clone, Parser)]
#[command(name = "webbench")]
#[command(bin_name = "webbench")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// absolute http(s) url to benchmark
    #[arg(value_name = "URL", required = true)]
    pub url: Uri,

    /// request method to use
    #[arg(
        long,
        short = 'm',
        value_enum,
        ignore_case = true,
        default_value_t = HttpMethod::Get
    )]
    pub method: HttpMethod,

    /// run the benchmark for the given amount of seconds
    #[arg(long, short = 't', value_name = "SECONDS", default_value_t = 30)]
    pub time: u64,

    /// run N http clients at once
    #[arg(
        long,
        short = 'c',
        visible_alias = "client",
        value_name = "N",
        default_value_t = 1
    )]
    pub clients: usize,

    /// don't wait for reply from server
    #[arg(long, short = 'f', default_value_t = false)]
    pub force: bool,

    /// send reload request: `Pragma: no-cache`
    #[arg(long, short = 'r', default_value_t = false)]
    pub reload: bool,

    /// use proxy server for all requests
    #[arg(
        long,
        short = 'p',
        value_name = "<scheme>://[user:[password]@]<host>[:port]"
    )]
    pub proxy: Option<ProxyAddress>,

    /// timeout of a single request, capped to 90% of the benchmark time (<= 0.0 = the cap)
    #[arg(long, value_name = "SECONDS", default_value_t = 30.)]
    pub timeout: f64,

    /// report json lines instead of a human-friendly format
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// debug logging as default instead of Info; use RUST_LOG env for more options
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,

    /// enable pretty logging (format for humans)
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// write the tracing output to the provided (log) file instead of stderr
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "SECONDS", default_value_t = 0.)]
    /// the graceful shutdown timeout (<= 0.0 = no timeout)
    pub graceful: f64,

    #[cfg(target_family = "unix")]
    /// Set the limit of max open file descriptors for this process and its children.
    #[arg(long, value_name = "N", default_value_t = 262_144)]
    pub ulimit: utils::os::rlim_t,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();

    utils::telemetry::init_tracing(utils::telemetry::TelemetryConfig {
        verbose: args.verbose,
        pretty: args.pretty,
        output: args.output.as_deref(),
    })?;

    #[cfg(target_family = "unix")]
    utils::os::raise_nofile(args.ulimit).context("set file descriptor limit")?;

    let base_shutdown_signal = graceful::default_signal();
    if let Err(err) = run_with_args(base_shutdown_signal, args).await {
        eprintln!("🚩 exit with error: {err}");
        std::process::exit(1);
    }

    Ok(())
}

/// Validate the args and run a single benchmark,
/// returning once the report has been written.
async fn run_with_args<F>(base_shutdown_signal: F, args: Args) -> Result<(), BoxError>
where
    F: Future<Output: Send + 'static> + Send + 'static,
{
    let cfg = run_config_from_args(&args).context("invalid benchmark configuration")?;

    let graceful_timeout = (args.graceful > 0.).then(|| Duration::from_secs_f64(args.graceful));

    let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
    let graceful = graceful::Shutdown::new(new_shutdown_signal(done_rx, base_shutdown_signal));

    let client = client::new_bench_client(
        Executor::graceful(graceful.guard()),
        cfg.request_timeout(),
        cfg.proxy().cloned(),
    )
    .context("create bench web client")?;

    let reporter: Box<dyn Reporter> = if args.json {
        Box::new(JsonlReporter::new())
    } else {
        Box::new(HumanReporter::new())
    };

    graceful.spawn_task_fn(async move |guard| {
        exec(guard, cfg, client, reporter).await;
        let _ = done_tx.send(());
    });

    let delay = match graceful_timeout {
        Some(duration) => graceful.shutdown_with_limit(duration).await?,
        None => graceful.shutdown().await,
    };

    tracing::debug!("gracefully shutdown with a delay of: {delay:?}");
    Ok(())
}

async fn exec(
    guard: ShutdownGuard,
    cfg: RunConfig,
    client: BoxService<Request, Response, BoxError>,
    mut reporter: Box<dyn Reporter>,
) {
    // a shutdown signal (e.g. ctrl+c) ends the run early,
    // the partial result is still reported
    let interrupt = guard.clone_weak().into_cancelled();
    let result = bench::run(&cfg, client, interrupt, reporter.as_mut()).await;
    tracing::debug!(?result, "bench run complete");
}

fn run_config_from_args(args: &Args) -> Result<RunConfig, OpaqueError> {
    let request = RequestSpec::try_new(args.method, args.url.clone(), args.reload)?;

    let request_timeout = if args.timeout > 0. {
        Duration::try_from_secs_f64(args.timeout).context("parse request timeout")?
    } else {
        Duration::ZERO
    };

    Ok(RunConfig::try_new(request, Duration::from_secs(args.time))?
        .with_clients(args.clients)
        .with_fire_and_forget(args.force)
        .with_request_timeout(request_timeout)
        .with_proxy(args.proxy.clone()))
}

fn new_shutdown_signal(
    done_rx: tokio::sync::oneshot::Receiver<()>,
    base_shutdown_signal: impl Future<Output: Send + 'static> + Send + 'static,
) -> impl Future + Send + 'static {
    async move {
        tokio::select! {
            _ = base_shutdown_signal => {
                tracing::debug!("default signal triggered: init graceful shutdown");
            }
            _ = done_rx => {
                tracing::debug!("bench run is finished, return control");
            }
        }
    }
}
