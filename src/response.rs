//! Response metadata returned alongside every decoded result.

use std::borrow::Cow;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// What the server sent back, independent of whether decoding succeeded.
///
/// Errors carry the same metadata, so rate-limit headers stay readable on
/// failed calls.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Vec<u8>,
    /// Time from sending the request to reading the full body.
    pub elapsed: Duration,
    /// When the body finished arriving.
    pub received_at: DateTime<Utc>,
}

impl ResponseMeta {
    /// A header value as text, if present and valid ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body as UTF-8, lossily.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Requests left in the current rate-limit window, if reported.
    pub fn rate_limit_remaining(&self) -> Option<u64> {
        self.header(RATE_LIMIT_REMAINING)
            .and_then(|v| v.trim().parse().ok())
    }

    /// Seconds to wait before retrying, from `Retry-After`.
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.header(RETRY_AFTER.as_str())
            .and_then(|v| v.trim().parse().ok())
    }
}

/// A decoded result paired with its response metadata.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// The decoded body.
    pub data: T,
    /// Status, headers, raw body and timing.
    pub meta: ResponseMeta,
}

impl<T> ApiResponse<T> {
    /// Discard the metadata.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Map the decoded body, keeping the metadata.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            meta: self.meta,
        }
    }
}
