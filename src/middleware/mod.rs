//! Middleware layer.
//!
//! A middleware takes the handler it wraps, called [`Next`], and returns a
//! new handler. It may run code before and after [`Next::run`], call it more
//! than once, or not at all to short-circuit the request.
//!
//! Any closure `Fn(Next) -> impl Handler` is a middleware:
//!
//! ```rust
//! use methodmux::middleware::Next;
//! use methodmux::{Request, Router};
//!
//! let app = Router::new().push(|next: Next| {
//!     move |req: Request| {
//!         let fut = next.run(req);
//!         async move {
//!             let res = fut.await;
//!             tracing::info!(status = %res.status_code(), "done");
//!             res
//!         }
//!     }
//! });
//! ```
//!
//! Built-in middleware:
//! - [`StrictMethod`]: rejects methods outside an allowed set with 405
//! - [`ElapsedTime`]: reports how long the wrapped handler took
//! - [`RequestCounter`]: tracks in-flight requests

mod counter;
mod elapsed;
mod strict;

pub use counter::{InFlight, RequestCounter};
pub use elapsed::ElapsedTime;
pub use strict::{StrictMethod, strict_method};

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;

/// The rest of the chain, as seen from inside a middleware.
#[derive(Clone)]
pub struct Next(BoxedHandler);

impl Next {
    /// Erases any handler into a `Next`.
    pub fn new(handler: impl Handler) -> Self {
        Self(handler.into_boxed_handler())
    }

    pub(crate) fn from_boxed(handler: BoxedHandler) -> Self {
        Self(handler)
    }

    pub(crate) fn into_boxed(self) -> BoxedHandler {
        self.0
    }

    /// Invokes the wrapped handler.
    ///
    /// Synchronous work the handler does before its first `.await` happens
    /// here; the returned future does the rest.
    pub fn run(&self, req: Request) -> BoxFuture {
        self.0.call(req)
    }
}

/// A decorator around a handler.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: Next) -> Next;
}

impl<F, H> Middleware for F
where
    F: Fn(Next) -> H + Send + Sync + 'static,
    H: Handler,
{
    fn wrap(&self, next: Next) -> Next {
        Next::new(self(next))
    }
}

/// A middleware shared between the router and every request it composes.
pub(crate) type BoxedMiddleware = Arc<dyn Middleware>;

/// Applies `middlewares` to `handler` so that the first entry ends up
/// outermost: `[m0, m1, m2]` yields `m0(m1(m2(handler)))`.
pub fn compose(handler: Next, middlewares: &[Arc<dyn Middleware>]) -> Next {
    middlewares.iter().rev().fold(handler, |next, m| m.wrap(next))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;

    use super::*;
    use crate::response::Response;

    fn request() -> Request {
        http::Request::builder().uri("/").body(Bytes::new()).unwrap().into()
    }

    fn recorder(log: Arc<Mutex<Vec<String>>>, name: &'static str) -> BoxedMiddleware {
        Arc::new(move |next: Next| {
            let log = Arc::clone(&log);
            move |req: Request| {
                log.lock().unwrap().push(format!("{name} before"));
                let fut = next.run(req);
                let log = Arc::clone(&log);
                async move {
                    let res = fut.await;
                    log.lock().unwrap().push(format!("{name} after"));
                    res
                }
            }
        })
    }

    #[tokio::test]
    async fn empty_chain_returns_handler_unchanged() {
        let handler = Next::new(|_req: Request| async { Response::text("only") });
        let middlewares: Vec<BoxedMiddleware> = Vec::new();

        let res = compose(handler, &middlewares).run(request()).await;

        assert_eq!(res.body(), b"only");
    }

    #[tokio::test]
    async fn first_registered_runs_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let middlewares = vec![
            recorder(Arc::clone(&log), "a"),
            recorder(Arc::clone(&log), "b"),
            recorder(Arc::clone(&log), "c"),
        ];
        let handler = {
            let log = Arc::clone(&log);
            Next::new(move |_req: Request| {
                log.lock().unwrap().push("handler".to_owned());
                async { Response::text("ok") }
            })
        };

        compose(handler, &middlewares).run(request()).await;

        assert_eq!(
            *log.lock().unwrap(),
            ["a before", "b before", "c before", "handler", "c after", "b after", "a after"],
        );
    }

    #[tokio::test]
    async fn composing_has_no_side_effects_until_invoked() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let middlewares = vec![recorder(Arc::clone(&log), "a")];

        let chain = compose(Next::new(|_req: Request| async { "x" }), &middlewares);
        assert!(log.lock().unwrap().is_empty());

        chain.run(request()).await;
        assert_eq!(log.lock().unwrap().len(), 2);
    }
}
