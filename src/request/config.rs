use std::time::Duration;
use crate::error::ConfigError;
use crate::network::HttpVersion;

pub const DEFAULT_MAX_CONCURRENT: usize = 4;
pub const DEFAULT_MAX_CONNECTIONS_PER_HOST: usize = 4;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECTIVITY_POLL: Duration = Duration::from_millis(250);

/// Settings shared by a `Dispatcher` and the adapter it drives.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatcherConfig {
    /// Window size: requests in flight at once.
    pub max_concurrent: usize,
    /// Default per-request timeout, overridable per `RequestItem`.
    pub request_timeout: Duration,
    pub max_connections_per_host: usize,
    /// Wait out connect failures until the request timeout instead of failing fast.
    pub waits_for_connectivity: bool,
    pub connectivity_poll_interval: Duration,
    pub http_version: HttpVersion,
    pub user_agent: String,
    pub session_description: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_connections_per_host: DEFAULT_MAX_CONNECTIONS_PER_HOST,
            waits_for_connectivity: true,
            connectivity_poll_interval: DEFAULT_CONNECTIVITY_POLL,
            http_version: HttpVersion::Auto,
            user_agent: concat!("rusty-batch/", env!("CARGO_PKG_VERSION")).to_string(),
            session_description: "BatchNetworkSession".to_string(),
        }
    }
}

impl DispatcherConfig {
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_connections_per_host(mut self, cap: usize) -> Self {
        self.max_connections_per_host = cap;
        self
    }

    pub fn with_waits_for_connectivity(mut self, waits: bool) -> Self {
        self.waits_for_connectivity = waits;
        self
    }

    pub fn with_connectivity_poll_interval(mut self, interval: Duration) -> Self {
        self.connectivity_poll_interval = interval;
        self
    }

    pub fn with_http_version(mut self, version: HttpVersion) -> Self {
        self.http_version = version;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_session_description(mut self, description: impl Into<String>) -> Self {
        self.session_description = description.into();
        self
    }

    /// The window may never exceed the per-host connection cap, otherwise the
    /// client would queue requests the dispatcher counts as in flight.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.max_connections_per_host == 0 {
            return Err(ConfigError::ZeroConnections);
        }
        if self.max_concurrent > self.max_connections_per_host {
            return Err(ConfigError::WindowExceedsConnectionCap {
                window: self.max_concurrent,
                cap: self.max_connections_per_host,
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
