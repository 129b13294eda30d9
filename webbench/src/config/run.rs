use std::{sync::Arc, time::Duration};

use rama::{error::OpaqueError, net::address::ProxyAddress};

use super::RequestSpec;

/// Everything a benchmark run needs, fixed for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    request: Arc<RequestSpec>,
    duration: Duration,
    clients: usize,
    fire_and_forget: bool,
    request_timeout: Option<Duration>,
    proxy: Option<ProxyAddress>,
}

impl RunConfig {
    /// Create a [`RunConfig`] for a single client,
    /// replaying `request` for the given (non-zero) `duration`.
    pub fn try_new(request: RequestSpec, duration: Duration) -> Result<Self, OpaqueError> {
        if duration.is_zero() {
            return Err(OpaqueError::from_display(
                "benchmark duration must be greater than zero",
            ));
        }

        Ok(Self {
            request: Arc::new(request),
            duration,
            clients: 1,
            fire_and_forget: false,
            request_timeout: None,
            proxy: None,
        })
    }

    /// Set the amount of concurrent clients (workers).
    pub fn with_clients(mut self, clients: usize) -> Self {
        self.clients = clients;
        self
    }

    /// Do not wait for (or read) the response body.
    pub fn with_fire_and_forget(mut self, fire_and_forget: bool) -> Self {
        self.fire_and_forget = fire_and_forget;
        self
    }

    /// Set the timeout of a single request attempt.
    ///
    /// A zero timeout is ignored.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Route requests via the given http(s) or socks5 proxy.
    pub fn with_proxy(mut self, proxy: Option<ProxyAddress>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn request(&self) -> &Arc<RequestSpec> {
        &self.request
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn clients(&self) -> usize {
        self.clients
    }

    pub fn fire_and_forget(&self) -> bool {
        self.fire_and_forget
    }

    /// Timeout of a single request attempt,
    /// capped to 90% of the run duration such that it stays shorter than the run.
    pub fn request_timeout(&self) -> Duration {
        let max = self.duration - self.duration / 10;
        match self.request_timeout {
            Some(timeout) => timeout.min(max),
            None => max,
        }
    }

    pub fn proxy(&self) -> Option<&ProxyAddress> {
        self.proxy.as_ref()
    }
}
