use std::time::Duration;

use rama::{
    http::{StatusCode, Uri},
    net::address::SocketAddress,
    rt::Executor,
};
use tokio::time::Instant;

use crate::{
    bench,
    client::new_bench_client,
    config::{HttpMethod, RequestSpec, RunConfig},
};

use super::{
    RecordingReporter,
    mock_server::{MockConfig, spawn_mock_server, unreachable_addr},
};

fn run_config(addr: SocketAddress, method: HttpMethod, duration: Duration) -> RunConfig {
    let uri: Uri = format!("http://{addr}/").parse().unwrap();
    let request = RequestSpec::try_new(method, uri, false).unwrap();
    RunConfig::try_new(request, duration).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[tracing_test::traced_test]
async fn test_bench_against_mock_server() {
    let addr = spawn_mock_server(MockConfig {
        latency: Duration::from_millis(10),
        body_size: 100,
        ..Default::default()
    })
    .await;

    let cfg = run_config(addr, HttpMethod::Get, Duration::from_secs(1))
        .with_clients(4)
        .with_request_timeout(Duration::from_millis(500));
    let client = new_bench_client(Executor::default(), cfg.request_timeout(), None).unwrap();

    let mut reporter = RecordingReporter::default();
    let result = bench::run(&cfg, client, std::future::pending::<()>(), &mut reporter).await;

    // ideally 4 * (1000ms / 10ms) = 400, minus connection setup and scheduling overhead
    assert!((40..=420).contains(&result.succeeded()), "result: {result:?}");
    assert_eq!(result.failed(), 0);
    assert_eq!(result.bytes_read(), result.succeeded() * 100);
    assert_eq!(reporter.workers.len(), 4);
    assert!(logs_contain("benchmark run finished"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bench_counts_error_status_as_completed() {
    let addr = spawn_mock_server(MockConfig {
        latency: Duration::from_millis(5),
        body_size: 10,
        status: StatusCode::INTERNAL_SERVER_ERROR,
    })
    .await;

    let cfg = run_config(addr, HttpMethod::Get, Duration::from_secs(1)).with_clients(2);
    let client = new_bench_client(Executor::default(), cfg.request_timeout(), None).unwrap();

    let mut reporter = RecordingReporter::default();
    let result = bench::run(&cfg, client, std::future::pending::<()>(), &mut reporter).await;

    assert!(result.succeeded() > 0, "result: {result:?}");
    assert_eq!(result.failed(), 0);
    assert_eq!(result.bytes_read(), result.succeeded() * 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bench_fire_and_forget_against_mock_server() {
    let addr = spawn_mock_server(MockConfig {
        latency: Duration::from_millis(10),
        body_size: 100,
        ..Default::default()
    })
    .await;

    let cfg = run_config(addr, HttpMethod::Get, Duration::from_secs(1))
        .with_clients(2)
        .with_fire_and_forget(true);
    let client = new_bench_client(Executor::default(), cfg.request_timeout(), None).unwrap();

    let mut reporter = RecordingReporter::default();
    let result = bench::run(&cfg, client, std::future::pending::<()>(), &mut reporter).await;

    assert!(result.succeeded() > 0, "result: {result:?}");
    assert_eq!(result.bytes_read(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bench_head_reads_no_body() {
    let addr = spawn_mock_server(MockConfig::default()).await;

    let cfg = run_config(addr, HttpMethod::Head, Duration::from_secs(1));
    let client = new_bench_client(Executor::default(), cfg.request_timeout(), None).unwrap();

    let mut reporter = RecordingReporter::default();
    let result = bench::run(&cfg, client, std::future::pending::<()>(), &mut reporter).await;

    assert!(result.succeeded() > 0, "result: {result:?}");
    assert_eq!(result.bytes_read(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bench_against_unreachable_server() {
    let addr = unreachable_addr();

    let duration = Duration::from_secs(1);
    let request_timeout = Duration::from_millis(500);
    let cfg = run_config(addr, HttpMethod::Get, duration)
        .with_clients(2)
        .with_request_timeout(request_timeout);
    let client = new_bench_client(Executor::default(), cfg.request_timeout(), None).unwrap();

    let start = Instant::now();
    let mut reporter = RecordingReporter::default();
    let result = bench::run(&cfg, client, std::future::pending::<()>(), &mut reporter).await;
    let elapsed = start.elapsed();

    assert_eq!(result.succeeded(), 0);
    assert!(result.failed() > 0, "result: {result:?}");
    assert_eq!(result.bytes_read(), 0);
    assert!(
        elapsed < duration + request_timeout + Duration::from_millis(500),
        "elapsed: {elapsed:?}"
    );
}
