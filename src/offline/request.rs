//! Intercepted requests and their responses

use crate::error::{CamaraError, CamaraResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// What kind of resource a request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Top-level navigation (an HTML page)
    Document,
    /// Script file
    Script,
    /// Stylesheet
    Style,
    /// Image
    Image,
    /// Web app manifest
    Manifest,
    /// Anything else (fetch/XHR, fonts, ...)
    Other,
}

impl Destination {
    /// Guess the destination from the URL path
    pub fn infer(url: &Url) -> Self {
        let path = url.path();
        if path.ends_with('/') {
            return Self::Document;
        }

        let extension = path
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("html" | "htm") => Self::Document,
            Some("js" | "mjs") => Self::Script,
            Some("css") => Self::Style,
            Some("png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico") => Self::Image,
            Some("webmanifest") => Self::Manifest,
            Some("json") if path.ends_with("manifest.json") => Self::Manifest,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "document",
            Self::Script => "script",
            Self::Style => "style",
            Self::Image => "image",
            Self::Manifest => "manifest",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// An outbound request issued by the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    /// Upper-case HTTP method
    pub method: String,
    /// Absolute URL
    pub url: Url,
    /// Resource kind
    pub destination: Destination,
    /// Request body (empty for GET/HEAD)
    pub body: Vec<u8>,
}

impl ResourceRequest {
    /// Create a request with an inferred destination
    pub fn new(method: &str, url: Url) -> CamaraResult<Self> {
        let method = method.trim().to_ascii_uppercase();
        if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CamaraError::InvalidRequest(format!(
                "invalid HTTP method '{method}'"
            )));
        }

        Ok(Self {
            method,
            destination: Destination::infer(&url),
            url,
            body: Vec::new(),
        })
    }

    /// Create a GET request with an inferred destination
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            destination: Destination::infer(&url),
            url,
            body: Vec::new(),
        }
    }

    /// Override the destination
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Attach a request body
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Whether this is a GET request
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// A response as seen by the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers in received order
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Vec<u8>,
}

impl ResourceResponse {
    /// Create a response without headers
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Whether the status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
