// request/mod.rs

pub mod request_item;
pub mod executor;
pub mod concurrency;
pub mod config;
pub mod decode;
pub mod completion;

// re-exported for callers of the crate root
pub use request_item::RequestItem;
pub use executor::Dispatcher;
pub use concurrency::{execute_sliding_window, Finished};
pub use config::DispatcherConfig;
pub use decode::Decoder;
pub use completion::{BatchSummary, Completion};
