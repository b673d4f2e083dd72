//! Route handlers and what they produce.
//!
//! A handler is an async function from [`Request`] to a [`HandlerOutput`],
//! paired with the content type it declares for its output.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;

use super::request::Request;
use super::response::Response;

/// The future every handler is erased to.
pub type HandlerFuture = BoxFuture<'static, Result<HandlerOutput, HandlerError>>;

type HandlerFn = dyn Fn(Request) -> HandlerFuture + Send + Sync;

/// What a handler produced.
#[derive(Debug)]
pub enum HandlerOutput {
    /// A response carrying its own status, headers, body and content type.
    Structured(Response),
    /// Any other value, written as its text form with status 200.
    Opaque(String),
    /// Nothing at all; answered with 204.
    Empty,
}

impl HandlerOutput {
    /// Wrap any displayable value as an opaque result.
    pub fn opaque(value: impl fmt::Display) -> Self {
        HandlerOutput::Opaque(value.to_string())
    }
}

impl From<Response> for HandlerOutput {
    fn from(resp: Response) -> Self {
        HandlerOutput::Structured(resp)
    }
}

impl From<String> for HandlerOutput {
    fn from(text: String) -> Self {
        HandlerOutput::Opaque(text)
    }
}

impl From<&str> for HandlerOutput {
    fn from(text: &str) -> Self {
        HandlerOutput::Opaque(text.to_string())
    }
}

impl From<serde_json::Value> for HandlerOutput {
    fn from(value: serde_json::Value) -> Self {
        HandlerOutput::Opaque(value.to_string())
    }
}

impl From<()> for HandlerOutput {
    fn from(_: ()) -> Self {
        HandlerOutput::Empty
    }
}

impl<T: Into<HandlerOutput>> From<Option<T>> for HandlerOutput {
    fn from(value: Option<T>) -> Self {
        value.map_or(HandlerOutput::Empty, Into::into)
    }
}

/// A handler failure. Its message becomes the body of the 500 response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// A registered handler. Cheap to clone; clones share the function.
#[derive(Clone)]
pub struct Handler {
    func: Arc<HandlerFn>,
    produces: Arc<str>,
}

impl Handler {
    /// Create a handler declaring `produces` as its content type.
    pub fn new<F, Fut, O>(produces: &str, func: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
        O: Into<HandlerOutput> + 'static,
    {
        let func: Arc<HandlerFn> = Arc::new(move |req: Request| -> HandlerFuture {
            func(req)
                .map(|res| res.map(Into::<HandlerOutput>::into))
                .boxed()
        });
        Self {
            func,
            produces: Arc::from(produces),
        }
    }

    /// The fallback used when no route matches: 404, `not found`, `text/plain`.
    pub fn not_found() -> Self {
        Self::new("text/plain", |_req| async {
            Ok::<_, HandlerError>(Response::builder().status(404).body("not found").build())
        })
    }

    pub fn produces(&self) -> &str {
        &self.produces
    }

    /// Start the handler's computation for `request`.
    pub fn call(&self, request: Request) -> HandlerFuture {
        (self.func)(request)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("produces", &self.produces)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn not_found_handler_yields_404() {
        let handler = Handler::not_found();
        assert_eq!(handler.produces(), "text/plain");

        match handler.call(Request::default()).await {
            Ok(HandlerOutput::Structured(resp)) => {
                assert_eq!(resp.http_status(), 404);
                assert_eq!(resp.body(), Some("not found"));
                assert_eq!(resp.content_type(), None);
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[tokio::test]
    async fn outputs_convert_into_variants() {
        let json = Handler::new("application/json", |_req| async {
            Ok::<_, HandlerError>(serde_json::json!({"id": 7}))
        });
        let empty = Handler::new("text/plain", |_req| async { Ok::<_, HandlerError>(()) });
        let none = Handler::new("text/plain", |_req| async {
            Ok::<Option<String>, HandlerError>(None)
        });

        assert!(matches!(
            json.call(Request::default()).await,
            Ok(HandlerOutput::Opaque(ref s)) if s == r#"{"id":7}"#
        ));
        assert!(matches!(empty.call(Request::default()).await, Ok(HandlerOutput::Empty)));
        assert!(matches!(none.call(Request::default()).await, Ok(HandlerOutput::Empty)));
    }

    #[tokio::test]
    async fn handler_sees_the_request() {
        let handler = Handler::new("text/plain", |req: Request| async move {
            Ok::<_, HandlerError>(format!("{} {}", req.method(), req.url()))
        });
        let req = Request::builder().method("GET").url("/x").build();
        assert!(matches!(
            handler.call(req).await,
            Ok(HandlerOutput::Opaque(ref s)) if s == "GET /x"
        ));
    }

    #[test]
    fn error_displays_its_message() {
        let err = HandlerError::new("boom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.message(), "boom");
    }
}
