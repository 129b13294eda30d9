//! (web) client used by all benchmark workers
//!
//! The client is created once and cloned into every worker,
//! such that all workers share the same connection pool.

use std::time::Duration;

use rama::{
    Layer as _, Service as _,
    error::{BoxError, ErrorContext as _, OpaqueError},
    http::{
        Request, Response,
        client::{EasyHttpWebClient, ProxyConnectorLayer, proxy::layer::HttpProxyConnectorLayer},
    },
    layer::{AddInputExtensionLayer, MapErrLayer, TimeoutLayer},
    net::address::ProxyAddress,
    proxy::socks5::Socks5ProxyConnectorLayer,
    rt::Executor,
    service::BoxService,
};

/// Create the shared web client for a benchmark run.
///
/// Every attempt is bounded by `request_timeout`, a timed out attempt
/// results in an error like any other transport failure.
/// When a `proxy` is given all requests are sent via that
/// http(s) or socks5 proxy.
pub fn new_bench_client(
    exec: Executor,
    request_timeout: Duration,
    proxy: Option<ProxyAddress>,
) -> Result<BoxService<Request, Response, BoxError>, OpaqueError> {
    let inner = EasyHttpWebClient::connector_builder()
        .with_default_transport_connector()
        .without_tls_proxy_support()
        .with_custom_proxy_connector(ProxyConnectorLayer::optional(
            Socks5ProxyConnectorLayer::required(),
            HttpProxyConnectorLayer::required(),
        ))
        .with_tls_support_using_boringssl(None)
        .with_default_http_connector(exec)
        .try_with_default_connection_pool()
        .context("create connection pool for bench web client")?
        .build_client();

    Ok((
        MapErrLayer::new(Into::<BoxError>::into),
        TimeoutLayer::new(request_timeout),
        proxy.map(AddInputExtensionLayer::new),
    )
        .into_layer(inner)
        .boxed())
}
