use std::time::Duration;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Per-request failure. Every variant is captured as data inside a batch
/// result; none of them aborts sibling requests.
#[derive(Error, Debug)]
pub enum FetchError {
    /// A scheduled slot had no request behind it.
    #[error("no request found at index {0}")]
    IndexNotFound(usize),

    #[error("invalid url '{url}': {reason}")]
    NoValidUrl { url: String, reason: String },

    /// The payload could not be turned into the caller's expected type.
    #[error("payload is not valid for the expected type: {0}")]
    NoValidData(String),

    /// The task finished without producing any result (panicked or was lost).
    #[error("task produced no result")]
    NoDecodable,

    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("invalid http method '{0}'")]
    InvalidMethod(String),

    #[error("HTTP status error: {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("request timeout after {:.2} seconds", .0.as_secs_f64())]
    Timeout(Duration),

    /// Transport failure passed through from the HTTP client.
    #[error("request error: {0}")]
    Transport(#[source] BoxError),
}

impl FetchError {
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FetchError::Transport(Box::new(err))
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::Transport(inner) => inner
                .downcast_ref::<reqwest::Error>()
                .map(|e| e.is_timeout())
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Timeout(_))
    }

    /// Short type name, used for the `exception.type` field of exported results.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::IndexNotFound(_) => "IndexNotFound",
            FetchError::NoValidUrl { .. } => "NoValidUrl",
            FetchError::NoValidData(_) => "NoValidData",
            FetchError::NoDecodable => "NoDecodable",
            FetchError::InvalidHeader { .. } => "InvalidHeader",
            FetchError::InvalidMethod(_) => "InvalidMethod",
            FetchError::HttpStatus { .. } => "HttpStatusError",
            FetchError::Timeout(_) => "Timeout",
            FetchError::Transport(_) => "HttpError",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(Box::new(err))
    }
}

/// Rejected `DispatcherConfig`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max_concurrent must be at least 1")]
    ZeroWindow,

    #[error("max_connections_per_host must be at least 1")]
    ZeroConnections,

    #[error("window of {window} exceeds the per-host connection cap of {cap}")]
    WindowExceedsConnectionCap { window: usize, cap: usize },

    #[error("request_timeout must be greater than zero")]
    ZeroTimeout,

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;
