use std::time::{Duration, SystemTime};
use serde_json::{json, Value};
use crate::error::{FetchError, Result};
use crate::network::RawPayload;
use crate::utils::format_span;

/// One finished slot of a batch, in the order it completed.
#[derive(Debug)]
pub struct Completion<T> {
    /// Position of the request in the submitted batch.
    pub index: usize,
    pub tag: Option<String>,
    pub started_at: SystemTime,
    pub elapsed: Duration,
    pub result: Result<T>,
}

impl<T> Completion<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn request_time(&self) -> String {
        format_span(self.started_at, self.elapsed)
    }

    pub fn process_time(&self) -> String {
        format!("{:.4}", self.elapsed.as_secs_f64())
    }

    pub fn into_result(self) -> Result<T> {
        self.result
    }

    fn meta(&self) -> Value {
        let mut meta = serde_json::Map::new();
        meta.insert("request_time".to_string(), Value::String(self.request_time()));
        meta.insert("process_time".to_string(), Value::String(self.process_time()));
        if let Some(tag) = &self.tag {
            meta.insert("tag".to_string(), Value::String(tag.clone()));
        }
        Value::Object(meta)
    }
}

fn exception(err: &FetchError) -> Value {
    json!({ "type": err.kind(), "message": err.to_string() })
}

impl Completion<RawPayload> {
    /// Flat row with `index`, `http_status`, `response`, `exception` and `meta`.
    /// Non-2xx responses keep their body and report an `HttpStatusError`.
    pub fn to_json(&self) -> Value {
        match &self.result {
            Ok(payload) => {
                let headers: serde_json::Map<String, Value> = payload.headers.iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v.to_str().unwrap_or("").to_string())))
                    .collect();
                let exc = if payload.is_success() {
                    json!({})
                } else {
                    exception(&FetchError::HttpStatus { status: payload.status.as_u16(), url: payload.url.clone() })
                };
                json!({
                    "index": self.index,
                    "http_status": payload.status.as_u16(),
                    "response": { "headers": headers, "content": payload.text_lossy() },
                    "exception": exc,
                    "meta": self.meta(),
                })
            }
            Err(err) => json!({
                "index": self.index,
                "http_status": 0,
                "response": { "headers": {}, "content": "" },
                "exception": exception(err),
                "meta": self.meta(),
            }),
        }
    }
}

/// Aggregate view of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub avg_elapsed: Duration,
}

impl BatchSummary {
    pub fn from_completions<T>(completions: &[Completion<T>]) -> Self {
        let total = completions.len();
        let succeeded = completions.iter().filter(|c| c.is_success()).count();
        let elapsed: Duration = completions.iter().map(|c| c.elapsed).sum();
        let avg_elapsed = if total > 0 { elapsed / total as u32 } else { Duration::ZERO };

        Self { total, succeeded, failed: total - succeeded, avg_elapsed }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.succeeded as f64 / self.total as f64 * 100.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn completion<T>(index: usize, ms: u64, result: Result<T>) -> Completion<T> {
        Completion {
            index,
            tag: Some(format!("req-{}", index)),
            started_at: SystemTime::now(),
            elapsed: Duration::from_millis(ms),
            result,
        }
    }

    #[test]
    fn summary_counts_outcomes() {
        let done = vec![
            completion(0, 10, Ok(1)),
            completion(1, 30, Err(FetchError::NoDecodable)),
            completion(2, 20, Ok(3)),
        ];
        let summary = BatchSummary::from_completions(&done);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.avg_elapsed, Duration::from_millis(20));
    }

    #[test]
    fn empty_summary() {
        let summary = BatchSummary::from_completions::<()>(&[]);
        assert_eq!(summary.avg_elapsed, Duration::ZERO);
        assert_eq!(summary.success_rate(), 0.0);
    }

    #[test]
    fn failed_row_has_exception() {
        let row = completion::<RawPayload>(4, 5, Err(FetchError::Timeout(Duration::from_secs(3)))).to_json();
        assert_eq!(row["index"], 4);
        assert_eq!(row["http_status"], 0);
        assert_eq!(row["exception"]["type"], "Timeout");
        assert_eq!(row["meta"]["tag"], "req-4");
        assert_eq!(row["meta"]["process_time"], "0.0050");
    }

    #[test]
    fn status_error_row_keeps_body() {
        let payload = RawPayload::new(StatusCode::SERVICE_UNAVAILABLE, "busy").with_url("http://h/");
        let row = completion(0, 1, Ok(payload)).to_json();
        assert_eq!(row["http_status"], 503);
        assert_eq!(row["response"]["content"], "busy");
        assert_eq!(row["exception"]["type"], "HttpStatusError");
    }
}
