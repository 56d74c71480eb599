//! Bounded-concurrency HTTP batch dispatcher.
//!
//! A [`Dispatcher`] runs a batch of [`RequestItem`]s with at most
//! `max_concurrent` (4 by default) in flight, starting the next request the
//! moment a slot frees up. Every request yields exactly one result; a failure
//! stays in its own slot and never aborts the batch.
//!
//! ```no_run
//! use rusty_batch::{decode, Dispatcher, DispatcherConfig, RequestItem};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(DispatcherConfig::default())?;
//! let requests = vec![
//!     RequestItem::get("https://example.com/a")?,
//!     RequestItem::get("https://example.com/b")?,
//! ];
//! for result in dispatcher.fetch_all(requests, decode::text()).await {
//!     match result {
//!         Ok(body) => println!("{} bytes", body.len()),
//!         Err(e) => eprintln!("failed: {}", e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod debug;
pub mod error;
pub mod network;
pub mod request;
pub mod utils;

#[cfg(feature = "python")]
mod python;

pub use debug::set_debug;
pub use error::{ConfigError, FetchError, Result};
pub use network::{HttpAdapter, HttpVersion, RawPayload, ReqwestAdapter};
pub use request::{
    decode, BatchSummary, Completion, Decoder, Dispatcher, DispatcherConfig, RequestItem,
};
