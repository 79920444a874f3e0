//! # methodmux
//!
//! Per-method route registration, ordered middleware and strict-method
//! guards on top of a radix-tree router.
//!
//! Path matching is [`matchit`]'s job. This crate adds what sits around it:
//!
//! - **Per-method handlers**: `get`/`post`/`put`/`head`/`delete` on the same
//!   pattern, one handler per method, `405 Method Not Allowed` for the rest
//! - **Registration checks**: registering a (pattern, method) pair twice, or
//!   a pattern both raw and per-method, fails at startup instead of silently
//!   replacing a handler
//! - **Ordered middleware**: the first middleware pushed runs outermost
//! - **Subtree patterns and mounting**: a pattern ending in `/` owns its
//!   subtree; [`Router::embed`] mounts a handler or a whole router under it
//!   with the prefix stripped
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use methodmux::middleware::{ElapsedTime, RequestCounter};
//! use methodmux::{Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), methodmux::Error> {
//!     let counter = RequestCounter::new();
//!
//!     let api = Router::new()
//!         .get("/users/{id}", get_user)
//!         .delete("/users/{id}", delete_user)
//!         .post("/users", create_user);
//!
//!     let app = Router::new()
//!         .push(ElapsedTime::new())
//!         .push(counter.clone())
//!         .embed("/api/", api);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(_req: Request) -> Response {
//!     Response::builder()
//!         .status(http::StatusCode::CREATED)
//!         .json(r#"{"id":"99"}"#)
//! }
//!
//! async fn delete_user(_req: Request) -> http::StatusCode {
//!     http::StatusCode::NO_CONTENT
//! }
//! ```

mod dispatcher;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod table;

pub mod middleware;

pub use error::{Error, RouteError};
pub use handler::{BoxFuture, Handler};
pub use method::Method;
pub use request::{Request, RequestLine};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
