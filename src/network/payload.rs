use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use crate::error::{FetchError, Result};

/// Raw response handed from the adapter to a decoder.
#[derive(Clone, Debug)]
pub struct RawPayload {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub url: String,
}

impl RawPayload {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into(), url: String::new() }
    }

    /// A 200 payload, mostly for adapters that do not speak HTTP.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Non-2xx statuses become `HttpStatus`; the client itself never fails on them.
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(FetchError::HttpStatus { status: self.status.as_u16(), url: self.url })
        }
    }

    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_carries_url() {
        let payload = RawPayload::new(StatusCode::NOT_FOUND, "missing").with_url("http://h/x");
        match payload.error_for_status() {
            Err(FetchError::HttpStatus { status, url }) => {
                assert_eq!(status, 404);
                assert_eq!(url, "http://h/x");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn success_passes_through() {
        let payload = RawPayload::ok("fine").error_for_status().unwrap();
        assert_eq!(payload.text_lossy(), "fine");
    }
}
