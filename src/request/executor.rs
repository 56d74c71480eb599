use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use crate::debug::{debug_log, is_debug};
use crate::error::{ConfigError, FetchError, Result};
use crate::network::{HttpAdapter, ReqwestAdapter};
use crate::request::concurrency::execute_sliding_window;
use crate::request::decode::Decoder;
use crate::request::{BatchSummary, Completion, DispatcherConfig, RequestItem};

/// Bounded-concurrency request dispatcher.
///
/// Runs batches through an `HttpAdapter` with at most
/// `config.max_concurrent` requests in flight, refilling a slot as soon as one
/// frees up. Cloning is cheap; clones share the adapter and the
/// `completed_count` counter.
///
/// Each `fetch_all` call owns its request list and scheduling cursor, so
/// concurrent batches on one dispatcher do not interfere.
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<DispatcherConfig>,
    adapter: Arc<dyn HttpAdapter>,
    completed: Arc<AtomicU64>,
}

impl Dispatcher {
    /// Dispatcher backed by a fresh `reqwest` client built from `config`.
    pub fn new(config: DispatcherConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let adapter = ReqwestAdapter::new(&config)?;
        Self::with_adapter(config, Arc::new(adapter))
    }

    pub fn with_adapter(
        config: DispatcherConfig,
        adapter: Arc<dyn HttpAdapter>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let cap = adapter.max_connections_per_host();
        if config.max_concurrent > cap {
            return Err(ConfigError::WindowExceedsConnectionCap { window: config.max_concurrent, cap });
        }
        Ok(Self { config: Arc::new(config), adapter, completed: Arc::new(AtomicU64::new(0)) })
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn window_size(&self) -> usize {
        self.config.max_concurrent
    }

    /// Requests dispatched so far across all batches. Bumped when a request is
    /// handed to the adapter, before it resolves.
    pub fn completed_count(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    pub async fn fetch_one<T>(&self, request: &RequestItem, decoder: &Decoder<T>) -> Result<T> {
        let payload = self.adapter.fetch(request).await?;
        decoder(payload)
    }

    /// Fetches every request and returns one result per request, in
    /// completion order.
    pub async fn fetch_all<T>(&self, requests: Vec<RequestItem>, decoder: Decoder<T>) -> Vec<Result<T>>
    where
        T: Send + 'static,
    {
        self.fetch_all_detailed(requests, decoder)
            .await
            .into_iter()
            .map(Completion::into_result)
            .collect()
    }

    /// Like `fetch_all`, keeping index, tag and timing per completion.
    pub async fn fetch_all_detailed<T>(&self, requests: Vec<RequestItem>, decoder: Decoder<T>) -> Vec<Completion<T>>
    where
        T: Send + 'static,
    {
        if requests.is_empty() {
            return Vec::new();
        }

        let total = requests.len();
        let window = self.config.max_concurrent.min(total);
        let session = self.config.session_description.as_str();
        debug_log(session, &format!("batch start: {} requests, window {}", total, window));

        let requests: Arc<[RequestItem]> = requests.into();
        let finished = execute_sliding_window(total, window, |index| {
            run_slot(
                Arc::clone(&requests),
                index,
                Arc::clone(&self.adapter),
                Arc::clone(&decoder),
                Arc::clone(&self.completed),
            )
        })
        .await;

        let completions: Vec<Completion<T>> = finished
            .into_iter()
            .map(|done| {
                let completion = Completion {
                    index: done.index,
                    tag: requests.get(done.index).and_then(|r| r.tag.clone()),
                    started_at: done.started_at,
                    elapsed: done.elapsed,
                    result: done.output.unwrap_or(Err(FetchError::NoDecodable)),
                };
                if is_debug() {
                    let outcome = match &completion.result {
                        Ok(_) => "ok".to_string(),
                        Err(e) => format!("failed: {}", e),
                    };
                    debug_log(
                        session,
                        &format!("#{} {} in {}s", completion.index, outcome, completion.process_time()),
                    );
                }
                completion
            })
            .collect();

        if is_debug() {
            let summary = BatchSummary::from_completions(&completions);
            debug_log(
                session,
                &format!(
                    "batch done: {} ok, {} failed ({:.1}% ok), avg {:?}",
                    summary.succeeded,
                    summary.failed,
                    summary.success_rate(),
                    summary.avg_elapsed
                ),
            );
        }
        completions
    }
}

async fn run_slot<T>(
    requests: Arc<[RequestItem]>,
    index: usize,
    adapter: Arc<dyn HttpAdapter>,
    decoder: Decoder<T>,
    completed: Arc<AtomicU64>,
) -> Result<T> {
    let request = requests.get(index).ok_or(FetchError::IndexNotFound(index))?;
    completed.fetch_add(1, Ordering::SeqCst);
    debug_log(request.tag_or_default(), &format!("#{} {} {}", index, request.method, request.url));

    let payload = adapter.fetch(request).await?;
    decoder(payload)
}
