//! Per-pattern method dispatch.
//!
//! Every pattern registered through [`Router::on`](crate::Router::on) (or
//! its `get`/`post`/... sugar) gets one [`MethodDispatcher`]. The path table
//! resolves the pattern to the dispatcher; the dispatcher picks the handler
//! by method.

use std::sync::Arc;

use http::StatusCode;
use http::header::{ALLOW, HeaderValue};

use crate::error::RouteError;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, ready};
use crate::method::Method;
use crate::middleware::{Middleware, Next, StrictMethod};
use crate::request::Request;
use crate::response::Response;

/// At most one handler per method, for a single pattern.
#[derive(Clone)]
pub(crate) struct MethodDispatcher {
    pattern: Arc<str>,
    handlers: [Option<BoxedHandler>; Method::COUNT],
}

impl MethodDispatcher {
    pub(crate) fn new(pattern: &str) -> Self {
        Self { pattern: Arc::from(pattern), handlers: Default::default() }
    }

    /// Stores `handler` for `method`, guarded so it only ever sees that method.
    ///
    /// A second registration for the same method is rejected; the first
    /// handler stays in place.
    pub(crate) fn register(&mut self, method: Method, handler: BoxedHandler) -> Result<(), RouteError> {
        let slot = &mut self.handlers[method.index()];
        if slot.is_some() {
            return Err(RouteError::DuplicateMethod {
                method,
                pattern: self.pattern.to_string(),
            });
        }

        let guarded = StrictMethod::new([method]).wrap(Next::from_boxed(handler));
        *slot = Some(guarded.into_boxed());
        Ok(())
    }

    /// Methods with a registered handler, in [`Method::ALL`] order.
    pub(crate) fn allowed(&self) -> impl Iterator<Item = Method> + '_ {
        Method::ALL.into_iter().filter(|m| self.handlers[m.index()].is_some())
    }

    fn method_not_allowed(&self) -> Response {
        let allow = self.allowed().map(Method::as_str).collect::<Vec<_>>().join(", ");
        let builder = Response::builder().status(StatusCode::METHOD_NOT_ALLOWED);
        match HeaderValue::from_str(&allow) {
            Ok(value) => builder.header(ALLOW, value).no_body(),
            Err(_) => builder.no_body(),
        }
    }
}

impl ErasedHandler for MethodDispatcher {
    fn call(&self, req: Request) -> BoxFuture {
        let handler = req
            .method()
            .parse::<Method>()
            .ok()
            .and_then(|m| self.handlers[m.index()].as_ref());

        match handler {
            Some(handler) => handler.call(req),
            None => ready(self.method_not_allowed()),
        }
    }
}
