//! Request dispatch and response synthesis.
//!
//! # Responsibilities
//! - Resolve the handler for a fully received request
//! - Adapt the wire request into a [`Request`]
//! - Run the handler on its own task and await its completion
//! - Turn the handler's output, or its failure, into a wire response
//!
//! # Response rules
//! ```text
//! Structured(resp) → resp status; Content-Type = resp type or `produces`;
//!                    resp headers override; Content-Length when a body exists
//! Opaque(text)     → 200; Content-Type = `produces`; Content-Length
//! Empty            → 204; Content-Type = `produces`; no Content-Length
//! body over cap    → 413, empty
//! failure          → 500 with the error message as the only content
//! ```
//! `Connection: keep-alive` is added to every non-failure response when the
//! client asked for it.
//!
//! # Design Decisions
//! - Content-Length is the UTF-8 byte length of the body
//! - The handler runs under `tokio::spawn`, so a panic becomes a 500 instead
//!   of tearing down the connection task

use std::any::Any;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use http_body_util::LengthLimitError;
use thiserror::Error;
use tokio::task::JoinError;

use super::handler::{HandlerError, HandlerOutput};
use super::request::{is_keep_alive, Request};
use crate::observability::metrics;
use crate::routing::RouteRegistry;

/// What the transport gets back.
pub type WireResponse = axum::http::Response<Body>;

/// Anything that turns a request into the minimal 500 response.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The transport failed while the body was being buffered.
    #[error("{0}")]
    Body(String),

    /// The body grew past the aggregation cap while being buffered.
    #[error("length limit exceeded")]
    PayloadTooLarge,

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("{0}")]
    Panicked(String),

    #[error("invalid status code: {0}")]
    InvalidStatus(u16),

    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// Dispatches buffered requests to the handlers of a [`RouteRegistry`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
    max_body_size: usize,
}

impl Dispatcher {
    pub fn new(registry: Arc<RouteRegistry>, max_body_size: usize) -> Self {
        Self {
            registry,
            max_body_size,
        }
    }

    /// Handle one request. Never fails: an oversized body is answered with
    /// a 413, every other error with a 500.
    pub async fn dispatch(&self, raw: axum::http::Request<Body>) -> WireResponse {
        let start = Instant::now();
        let method = raw.method().as_str().to_string();
        let request_id = raw
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let response = match self.try_dispatch(raw, &request_id).await {
            Ok(response) => response,
            Err(DispatchError::PayloadTooLarge) => {
                tracing::debug!(request_id = %request_id, method = %method, "Request body over limit");
                payload_too_large()
            }
            Err(e) => {
                tracing::warn!(request_id = %request_id, method = %method, error = %e, "Request failed");
                internal_error(&e.to_string())
            }
        };

        metrics::record_request(&method, response.status().as_u16(), start);
        response
    }

    async fn try_dispatch(
        &self,
        raw: axum::http::Request<Body>,
        request_id: &str,
    ) -> Result<WireResponse, DispatchError> {
        let handler = {
            let uri = raw.uri();
            let target = uri
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or_else(|| uri.path());
            self.registry.resolve(raw.method().as_str(), target)
        };
        let keep_alive = is_keep_alive(raw.version(), raw.headers());

        let (parts, body) = raw.into_parts();
        let bytes = axum::body::to_bytes(body, self.max_body_size)
            .await
            .map_err(|e| {
                if is_length_limit(&e) {
                    DispatchError::PayloadTooLarge
                } else {
                    DispatchError::Body(e.to_string())
                }
            })?;
        let request = Request::from_parts(&parts, &bytes);

        tracing::debug!(
            request_id = %request_id,
            method = request.method(),
            path = request.url(),
            "Dispatching request"
        );

        let produces = handler.produces().to_string();
        let output = tokio::spawn(async move { handler.call(request).await })
            .await
            .map_err(|e| DispatchError::Panicked(join_error_message(e)))??;

        synthesize(output, &produces, keep_alive)
    }
}

/// Build the wire response for a completed handler.
pub fn synthesize(
    output: HandlerOutput,
    produces: &str,
    keep_alive: bool,
) -> Result<WireResponse, DispatchError> {
    let mut headers = HeaderMap::new();
    if keep_alive {
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    }

    let (status, body) = match output {
        HandlerOutput::Structured(resp) => {
            let status = StatusCode::from_u16(resp.http_status())
                .map_err(|_| DispatchError::InvalidStatus(resp.http_status()))?;

            headers.insert(
                header::CONTENT_TYPE,
                header_value(header::CONTENT_TYPE.as_str(), resp.content_type().unwrap_or(produces))?,
            );
            for (name, value) in resp.headers() {
                headers.insert(header_name(name)?, header_value(name, value)?);
            }

            match resp.body() {
                Some(text) => {
                    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(text.len()));
                    (status, Body::from(text.to_string()))
                }
                None => (status, Body::empty()),
            }
        }
        HandlerOutput::Opaque(text) => {
            headers.insert(header::CONTENT_TYPE, header_value(header::CONTENT_TYPE.as_str(), produces)?);
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(text.len()));
            (StatusCode::OK, Body::from(text))
        }
        HandlerOutput::Empty => {
            headers.insert(header::CONTENT_TYPE, header_value(header::CONTENT_TYPE.as_str(), produces)?);
            (StatusCode::NO_CONTENT, Body::empty())
        }
    };

    let mut response = WireResponse::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// The failure response: status 500 and the message, nothing else.
pub fn internal_error(message: &str) -> WireResponse {
    let mut response = WireResponse::new(Body::from(message.to_string()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// The transport-level rejection of a body over the aggregation cap.
pub fn payload_too_large() -> WireResponse {
    let mut response = WireResponse::new(Body::empty());
    *response.status_mut() = StatusCode::PAYLOAD_TOO_LARGE;
    response
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

fn header_name(name: &str) -> Result<HeaderName, DispatchError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| DispatchError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, DispatchError> {
    HeaderValue::from_str(value).map_err(|e| DispatchError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn join_error_message(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        "handler task was cancelled".to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
