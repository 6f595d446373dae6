//! Request classification and response formatting.
//!
//! The responder speaks just enough HTTP/1.0 for a browser: every request is
//! answered with `200 OK` and the connection is closed afterwards. Requests
//! are classified by looking for a route anywhere in the first
//! [`MAX_REQUEST_BYTES`] bytes, so headers, query strings and the protocol
//! version are irrelevant. Anything unrecognised gets the display page.

use crate::error::CoreError;
use crate::snapshot::SensorSnapshot;

/// Largest request read from a client; anything beyond is ignored.
pub const MAX_REQUEST_BYTES: usize = 1024;

/// Body of the calibration acknowledgement.
pub const CALIBRATED_BODY: &str = "Calibrated.";

const DATA_PATTERN: &[u8] = b"GET /data";
const CALIBRATE_PATTERN: &[u8] = b"GET /calibrate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Current snapshot as JSON
    Data,
    /// Reset tracking, then acknowledge
    Calibrate,
    /// The display page
    Index,
}

impl Route {
    /// Classify a raw request buffer. Never fails.
    pub fn classify(request: &[u8]) -> Route {
        let request = &request[..request.len().min(MAX_REQUEST_BYTES)];
        if contains(request, DATA_PATTERN) {
            Route::Data
        } else if contains(request, CALIBRATE_PATTERN) {
            Route::Calibrate
        } else {
            Route::Index
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Data => write!(f, "data"),
            Route::Calibrate => write!(f, "calibrate"),
            Route::Index => write!(f, "index"),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Text,
    Html,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Text => "text/plain",
            ContentType::Html => "text/html",
        }
    }
}

/// A complete `200 OK` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    content_type: ContentType,
    body: Vec<u8>,
}

impl Response {
    pub fn json(snapshot: &SensorSnapshot) -> Result<Self, CoreError> {
        Ok(Self {
            content_type: ContentType::Json,
            body: snapshot.to_json()?.into_bytes(),
        })
    }

    pub fn calibrated() -> Self {
        Self {
            content_type: ContentType::Text,
            body: CALIBRATED_BODY.as_bytes().to_vec(),
        }
    }

    /// The display page, passed through unmodified.
    pub fn html(document: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: ContentType::Html,
            body: document.into(),
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Serialize status line, header and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.0 200 OK\r\nContent-Type: {}\r\n\r\n",
            self.content_type.as_str()
        );
        let mut bytes = Vec::with_capacity(head.len() + self.body.len());
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }
}
