//! Outbound response model.
//!
//! # Responsibilities
//! - Carry what a handler wants written back: status, headers, body, content type
//! - Fill defaults at build time (status 200)
//!
//! # Design Decisions
//! - Built once through [`ResponseBuilder`], immutable afterwards
//! - A missing content type means "use the handler's declared type"
//! - Headers are applied verbatim over the dispatcher's defaults

use std::collections::HashMap;

/// Status used when the builder is never given one.
pub const DEFAULT_STATUS: u16 = 200;

/// A structured handler result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    http_status: u16,
    body: Option<String>,
    content_type: Option<String>,
    headers: HashMap<String, String>,
}

impl Response {
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

/// Builder for [`Response`].
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    http_status: Option<u16>,
    body: Option<String>,
    content_type: Option<String>,
    headers: HashMap<String, String>,
}

impl ResponseBuilder {
    pub fn status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add a header. A later call with the same name replaces the earlier value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn build(self) -> Response {
        Response {
            http_status: self.http_status.unwrap_or(DEFAULT_STATUS),
            body: self.body,
            content_type: self.content_type,
            headers: self.headers,
        }
    }
}
