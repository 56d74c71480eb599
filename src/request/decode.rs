//! Payload decode strategies.
//!
//! A `Decoder<T>` turns the adapter's `RawPayload` into the caller's type.
//! Anything that does not fit yields `FetchError::NoValidData`.

use std::sync::Arc;
use serde::de::DeserializeOwned;
use crate::error::{FetchError, Result};
use crate::network::RawPayload;

pub type Decoder<T> = Arc<dyn Fn(RawPayload) -> Result<T> + Send + Sync>;

pub fn decoder<T, F>(f: F) -> Decoder<T>
where
    F: Fn(RawPayload) -> Result<T> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Hands the payload back untouched.
pub fn raw() -> Decoder<RawPayload> {
    decoder(|payload: RawPayload| Ok(payload))
}

pub fn bytes() -> Decoder<Vec<u8>> {
    decoder(|payload: RawPayload| Ok(payload.body))
}

pub fn text() -> Decoder<String> {
    decoder(|payload: RawPayload| {
        String::from_utf8(payload.body).map_err(|e| FetchError::NoValidData(e.to_string()))
    })
}

pub fn json<T>() -> Decoder<T>
where
    T: DeserializeOwned + 'static,
{
    decoder(|payload: RawPayload| {
        serde_json::from_slice(&payload.body).map_err(|e| FetchError::NoValidData(e.to_string()))
    })
}

/// Rejects non-2xx payloads with `HttpStatus` before running `inner`.
pub fn success_only<T: 'static>(inner: Decoder<T>) -> Decoder<T> {
    decoder(move |payload: RawPayload| inner(payload.error_for_status()?))
}
