// src/network/mod.rs
pub mod adapter;
pub mod host_limit;
pub mod http_version;
pub mod payload;

pub use adapter::{HttpAdapter, ReqwestAdapter};
pub use host_limit::HostLimiter;
pub use http_version::HttpVersion;
pub use payload::RawPayload;
