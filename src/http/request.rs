//! Inbound request model and adaptation from the transport.
//!
//! # Responsibilities
//! - Normalize the transport's request head and buffered body into [`Request`]
//! - Extract the routing path and decode query parameters
//! - Decide whether the client asked for connection reuse
//!
//! # Design Decisions
//! - Header names arrive lowercased from the transport; lookups are case-insensitive
//! - Repeated headers: last value wins. Repeated query keys: first value wins
//! - The body is decoded as UTF-8 (lossy); an empty body is an empty string

use std::collections::HashMap;

use axum::http::{header, request::Parts, HeaderMap, Version};

use crate::routing::strip_query;

/// A normalized, immutable inbound request handed to a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    method: String,
    url: String,
    body: String,
    content_type: Option<String>,
    headers: HashMap<String, String>,
    query_parameters: HashMap<String, String>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Adapt a request head plus its fully buffered body.
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| parts.uri.path());

        let mut headers = HashMap::with_capacity(parts.headers.len());
        for (name, value) in parts.headers.iter() {
            headers.insert(
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }

        let content_type = headers.get(header::CONTENT_TYPE.as_str()).cloned();

        Self::builder()
            .method(parts.method.as_str())
            .url(strip_query(target))
            .headers(headers)
            .content_type(content_type)
            .query_parameters(decode_query(target))
            .body(String::from_utf8_lossy(body).into_owned())
            .build()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request path, without the query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    pub fn query_parameters(&self) -> &HashMap<String, String> {
        &self.query_parameters
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_parameters.get(name).map(String::as_str)
    }
}

/// Builder for [`Request`]. Mostly useful for exercising handlers directly.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    inner: Request,
}

impl RequestBuilder {
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.inner.method = method.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.inner.url = url.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.inner.body = body.into();
        self
    }

    pub fn content_type(mut self, content_type: Option<String>) -> Self {
        self.inner.content_type = content_type;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.inner.headers = headers;
        self
    }

    pub fn query_parameters(mut self, params: HashMap<String, String>) -> Self {
        self.inner.query_parameters = params;
        self
    }

    pub fn build(self) -> Request {
        self.inner
    }
}

/// Decode the query component of a request-target, keeping the first value
/// of each repeated key.
pub fn decode_query(target: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let Some((_, query)) = target.split_once('?') else {
        return params;
    };

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key.is_empty() {
            continue;
        }
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

/// Whether the client asked to keep the connection open.
///
/// A `close` token always wins. HTTP/1.1 and later default to keep-alive,
/// HTTP/1.0 needs an explicit `keep-alive` token.
pub fn is_keep_alive(version: Version, headers: &HeaderMap) -> bool {
    let has_token = |token: &str| {
        headers.get_all(header::CONNECTION).iter().any(|value| {
            value
                .to_str()
                .map(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case(token)))
                .unwrap_or(false)
        })
    };

    if has_token("close") {
        return false;
    }
    match version {
        Version::HTTP_09 | Version::HTTP_10 => has_token("keep-alive"),
        _ => true,
    }
}
