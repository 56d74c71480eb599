use std::time::Duration;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use tokio::time::Instant;
use crate::debug::{debug_log, debug_response};
use crate::error::{ConfigError, FetchError, Result};
use crate::network::host_limit::HostLimiter;
use crate::network::RawPayload;
use crate::request::{DispatcherConfig, RequestItem};

/// Performs exactly one request. Implementations must be safe to call
/// concurrently up to `max_connections_per_host` and must resolve (success,
/// failure or timeout) rather than hang.
pub trait HttpAdapter: Send + Sync {
    fn fetch<'a>(&'a self, request: &'a RequestItem) -> BoxFuture<'a, Result<RawPayload>>;

    /// Ceiling on simultaneous calls the adapter serves without queueing.
    fn max_connections_per_host(&self) -> usize;
}

/// True when the error chain bottoms out in "no route to the network".
/// Refused connections and DNS failures are not offline; they surface as is.
pub(crate) fn is_offline(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            return matches!(
                io.kind(),
                std::io::ErrorKind::NetworkUnreachable
                    | std::io::ErrorKind::NetworkDown
                    | std::io::ErrorKind::HostUnreachable
            );
        }
        current = e.source();
    }
    false
}

/// `HttpAdapter` over a shared `reqwest::Client`.
pub struct ReqwestAdapter {
    client: Client,
    limiter: HostLimiter,
    request_timeout: Duration,
    waits_for_connectivity: bool,
    poll_interval: Duration,
}

pub(crate) fn build_client(config: &DispatcherConfig) -> std::result::Result<Client, ConfigError> {
    let mut builder = Client::builder()
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .pool_max_idle_per_host(config.max_connections_per_host)
        .user_agent(config.user_agent.clone());

    builder = config.http_version.apply_to_builder(builder);

    builder.build().map_err(|e| ConfigError::Client(e.to_string()))
}

impl ReqwestAdapter {
    pub fn new(config: &DispatcherConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self::with_client(build_client(config)?, config))
    }

    pub fn with_client(client: Client, config: &DispatcherConfig) -> Self {
        Self {
            client,
            limiter: HostLimiter::new(config.max_connections_per_host),
            request_timeout: config.request_timeout,
            waits_for_connectivity: config.waits_for_connectivity,
            poll_interval: config.connectivity_poll_interval,
        }
    }

    async fn send_once(&self, req: &RequestItem, timeout: Duration) -> std::result::Result<RawPayload, reqwest::Error> {
        let mut builder = self.client
            .request(req.method.clone(), req.url.clone())
            .headers(req.headers.clone())
            .timeout(timeout);
        if let Some(body) = &req.body {
            builder = builder.body(body.clone());
        }

        let res = builder.send().await?;
        let status = res.status();
        let headers = res.headers().clone();
        let url = res.url().to_string();
        let body = res.bytes().await?.to_vec();

        debug_response(req.tag_or_default(), req.method.as_str(), &url, status, body.len());

        Ok(RawPayload { status, headers, body, url })
    }

    async fn execute(&self, req: &RequestItem) -> Result<RawPayload> {
        let timeout = req.effective_timeout(self.request_timeout);
        let deadline = Instant::now() + timeout;

        let _permit = match tokio::time::timeout_at(deadline, self.limiter.acquire(&req.host_key())).await {
            Ok(permit) => permit?,
            Err(_) => return Err(FetchError::Timeout(timeout)),
        };

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(FetchError::Timeout(timeout));
            }

            match tokio::time::timeout(remaining, self.send_once(req, remaining)).await {
                Ok(Ok(payload)) => return Ok(payload),
                Ok(Err(e)) if self.waits_for_connectivity && e.is_connect() && is_offline(&e) => {
                    debug_log(
                        req.tag_or_default(),
                        &format!("waiting for connectivity to {}: {}", req.url, e),
                    );
                    let left = deadline.saturating_duration_since(Instant::now());
                    tokio::time::sleep(self.poll_interval.min(left)).await;
                }
                Ok(Err(e)) if e.is_timeout() => return Err(FetchError::Timeout(timeout)),
                Ok(Err(e)) => return Err(FetchError::from(e)),
                Err(_) => return Err(FetchError::Timeout(timeout)),
            }
        }
    }
}

impl HttpAdapter for ReqwestAdapter {
    fn fetch<'a>(&'a self, request: &'a RequestItem) -> BoxFuture<'a, Result<RawPayload>> {
        self.execute(request).boxed()
    }

    fn max_connections_per_host(&self) -> usize {
        self.limiter.cap()
    }
}
