use std::sync::Arc;

use http::StatusCode;

use super::{Middleware, Next};
use crate::handler::ready;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;

/// Lets a request through only if its method is one of `allowed`.
///
/// Anything else gets an empty `405 Method Not Allowed` and the wrapped
/// handler is never called. An empty set rejects every request.
#[derive(Clone, Debug)]
pub struct StrictMethod {
    allowed: Arc<[Method]>,
}

impl StrictMethod {
    pub fn new(allowed: impl IntoIterator<Item = Method>) -> Self {
        Self { allowed: allowed.into_iter().collect() }
    }

    pub fn allows(&self, method: &str) -> bool {
        self.allowed.iter().any(|m| m.matches(method))
    }
}

/// Shorthand for [`StrictMethod::new`].
pub fn strict_method(allowed: impl IntoIterator<Item = Method>) -> StrictMethod {
    StrictMethod::new(allowed)
}

impl Middleware for StrictMethod {
    fn wrap(&self, next: Next) -> Next {
        let guard = self.clone();
        Next::new(move |req: Request| {
            if guard.allows(req.method()) {
                next.run(req)
            } else {
                ready(Response::status(StatusCode::METHOD_NOT_ALLOWED))
            }
        })
    }
}
