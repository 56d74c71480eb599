use std::time::Duration;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use url::Url;
use crate::error::{FetchError, Result};

/// One outbound call. Built up front, then only read by the dispatcher.
#[derive(Clone, Debug)]
pub struct RequestItem {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Overrides the dispatcher's `request_timeout` for this call.
    pub timeout: Option<Duration>,
    pub tag: Option<String>,
}

impl RequestItem {
    pub fn new(method: Method, url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| FetchError::NoValidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(FetchError::NoValidUrl {
                    url: url.to_string(),
                    reason: format!("unsupported scheme '{}'", other),
                })
            }
        }
        Ok(Self { method, url, headers: HeaderMap::new(), body: None, timeout: None, tag: None })
    }

    /// Accepts a method name in any case, e.g. `"post"`.
    pub fn from_parts(method: &str, url: &str) -> Result<Self> {
        let method = method
            .to_uppercase()
            .parse::<Method>()
            .map_err(|_| FetchError::InvalidMethod(method.to_string()))?;
        Self::new(method, url)
    }

    pub fn get(url: &str) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    pub fn post(url: &str) -> Result<Self> {
        Self::new(Method::POST, url)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let invalid = || FetchError::InvalidHeader { name: name.to_string() };
        let h_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let h_val = HeaderValue::from_str(value).map_err(|_| invalid())?;
        self.headers.insert(h_name, h_val);
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the body and sets `Content-Type: application/json`.
    pub fn with_json(mut self, value: &Value) -> Self {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(value.to_string().into_bytes());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn tag_or_default(&self) -> &str {
        self.tag.as_deref().unwrap_or("no-tag")
    }

    /// Host key used for per-host connection accounting.
    pub fn host_key(&self) -> String {
        format!(
            "{}://{}:{}",
            self.url.scheme(),
            self.url.host_str().unwrap_or(""),
            self.url.port_or_known_default().unwrap_or(0)
        )
    }

    pub fn effective_timeout(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_unparseable_url() {
        match RequestItem::get("not a url") {
            Err(FetchError::NoValidUrl { url, .. }) => assert_eq!(url, "not a url"),
            other => panic!("expected NoValidUrl, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(matches!(RequestItem::get("ftp://example.com/file"), Err(FetchError::NoValidUrl { .. })));
    }

    #[test]
    fn parses_method_names() {
        let req = RequestItem::from_parts("patch", "https://example.com/a").unwrap();
        assert_eq!(req.method, Method::PATCH);
        assert!(matches!(RequestItem::from_parts("GE T", "https://example.com"), Err(FetchError::InvalidMethod(_))));
    }

    #[test]
    fn builds_json_post() {
        let req = RequestItem::post("http://localhost:8080/items")
            .unwrap()
            .with_json(&json!({"id": 1}))
            .with_tag("create")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(req.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(req.body.as_deref(), Some(br#"{"id":1}"#.as_slice()));
        assert_eq!(req.tag_or_default(), "create");
        assert_eq!(req.effective_timeout(Duration::from_secs(30)), Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_header() {
        let req = RequestItem::get("https://example.com").unwrap();
        assert!(matches!(req.with_header("bad header", "v"), Err(FetchError::InvalidHeader { .. })));
    }

    #[test]
    fn host_key_uses_default_port() {
        let a = RequestItem::get("https://example.com/a").unwrap();
        let b = RequestItem::get("https://example.com:443/b").unwrap();
        assert_eq!(a.host_key(), b.host_key());
        assert_eq!(RequestItem::get("http://example.com").unwrap().host_key(), "http://example.com:80");
    }
}
