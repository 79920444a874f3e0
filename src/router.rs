//! The application router.
//!
//! Registration happens on an owned `Router`: every builder method takes
//! `self` and hands it back, so once the router is moved into
//! [`Server::serve`](crate::Server::serve) (or an `Arc`) nothing can change
//! it any more. Serving only ever needs `&self`.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use http::header::{HeaderValue, LOCATION};
use tracing::debug;

use crate::dispatcher::MethodDispatcher;
use crate::error::RouteError;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, ready};
use crate::method::Method;
use crate::middleware::{BoxedMiddleware, Middleware, Next, compose};
use crate::request::Request;
use crate::response::Response;
use crate::table::{Found, PathTable, Resolution};

/// What a pattern in the path table points at.
#[derive(Clone)]
enum Endpoint {
    /// Raw or embedded handler, called for every method.
    Handler(BoxedHandler),
    /// Index into `Router::dispatchers`.
    Methods(usize),
}

/// Pattern table, global middleware list and per-pattern method dispatchers.
///
/// ```rust
/// use methodmux::{Request, Response, Router};
/// use methodmux::middleware::ElapsedTime;
///
/// async fn list(_req: Request) -> Response { Response::text("[]") }
/// async fn create(_req: Request) -> Response { Response::text("created") }
///
/// let app = Router::new()
///     .push(ElapsedTime::new())
///     .get("/items", list)
///     .post("/items", create);
/// ```
pub struct Router {
    table: PathTable<Endpoint>,
    middlewares: Vec<BoxedMiddleware>,
    dispatchers: Vec<Arc<MethodDispatcher>>,
    patterns: HashMap<String, usize>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            table: PathTable::new(),
            middlewares: Vec::new(),
            dispatchers: Vec::new(),
            patterns: HashMap::new(),
        }
    }

    /// A router whose global middleware list starts out as `middlewares`,
    /// in order. Equivalent to calling [`push`](Router::push) for each.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use methodmux::Router;
    /// use methodmux::middleware::{ElapsedTime, Middleware, RequestCounter};
    ///
    /// let common: Vec<Arc<dyn Middleware>> = vec![
    ///     Arc::new(ElapsedTime::new()) as Arc<dyn Middleware>,
    ///     Arc::new(RequestCounter::new()),
    /// ];
    /// let app = Router::with_middlewares(common.iter().cloned());
    /// ```
    pub fn with_middlewares(middlewares: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        Self { middlewares: middlewares.into_iter().collect(), ..Self::new() }
    }

    // ── Per-method registration ───────────────────────────────────────────────

    /// Register `handler` for `method` on `pattern`. Returns `self` for chaining.
    ///
    /// Several methods can share a pattern; each is dispatched independently
    /// and any method without a handler gets `405 Method Not Allowed`.
    ///
    /// # Panics
    ///
    /// Panics if `method` is already registered for `pattern`, or if
    /// `pattern` is malformed or taken by [`handle`](Router::handle) /
    /// [`embed`](Router::embed). See [`try_on`](Router::try_on).
    pub fn on(self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.try_on(method, pattern, handler)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of [`on`](Router::on).
    pub fn try_on(mut self, method: Method, pattern: &str, handler: impl Handler) -> Result<Self, RouteError> {
        let index = match self.patterns.get(pattern) {
            Some(&index) => index,
            None => {
                let index = self.dispatchers.len();
                self.table.register(pattern, Endpoint::Methods(index))?;
                self.dispatchers.push(Arc::new(MethodDispatcher::new(pattern)));
                self.patterns.insert(pattern.to_owned(), index);
                index
            }
        };

        Arc::make_mut(&mut self.dispatchers[index]).register(method, handler.into_boxed_handler())?;
        debug!(%method, pattern, "route registered");
        Ok(self)
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, pattern, handler)
    }

    pub fn head(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Head, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, pattern, handler)
    }

    // ── Raw registration ──────────────────────────────────────────────────────

    /// Register `handler` for every method on `pattern`.
    ///
    /// No method checks: the handler sees whatever method arrives. A
    /// pattern ending in `/` also matches everything below it unless a more
    /// specific pattern claims it, and a request for the same path without
    /// the trailing slash is redirected to it.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is malformed or already registered, including
    /// through [`on`](Router::on). See [`try_handle`](Router::try_handle).
    pub fn handle(self, pattern: &str, handler: impl Handler) -> Self {
        self.try_handle(pattern, handler)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of [`handle`](Router::handle).
    pub fn try_handle(mut self, pattern: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.table.register(pattern, Endpoint::Handler(handler.into_boxed_handler()))?;
        debug!(pattern, "handler registered");
        Ok(self)
    }

    /// Mount `handler` under `pattern`, stripping the prefix first.
    ///
    /// The mounted handler sees a path that always starts with `/`:
    ///
    /// | pattern  | request          | mounted handler sees |
    /// |----------|------------------|----------------------|
    /// | `/api/`  | `/api/widgets/7` | `/widgets/7`         |
    /// | `/api/`  | `/api/`          | `/`                  |
    /// | `/`      | `/widgets`       | `/widgets`           |
    ///
    /// so a mounted [`Router`] can match it against its own patterns. The
    /// original URI stays available through [`Request::uri`].
    ///
    /// ```rust
    /// use methodmux::{Request, Router};
    ///
    /// async fn widgets(_req: Request) -> &'static str { "widgets" }
    ///
    /// let api = Router::new().get("/widgets", widgets);
    /// let app = Router::new().embed("/api/", api);
    /// ```
    ///
    /// # Panics
    ///
    /// Same conditions as [`handle`](Router::handle). See [`try_embed`](Router::try_embed).
    pub fn embed(self, pattern: &str, handler: impl Handler) -> Self {
        self.try_embed(pattern, handler)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of [`embed`](Router::embed).
    pub fn try_embed(mut self, pattern: &str, handler: impl Handler) -> Result<Self, RouteError> {
        let mounted = strip_prefix(handler.into_boxed_handler());
        self.table.register(pattern, Endpoint::Handler(mounted))?;
        debug!(pattern, "handler embedded");
        Ok(self)
    }

    // ── Middleware ────────────────────────────────────────────────────────────

    /// Append a middleware to the global list.
    ///
    /// Middlewares wrap every request the router serves, including not-found
    /// responses. The first one pushed runs outermost.
    pub fn push(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    // ── Serving ───────────────────────────────────────────────────────────────

    /// Route one request and produce its response.
    ///
    /// The handler is resolved from the path, wrapped in the current global
    /// middlewares and called. A path that is not registered itself but
    /// names a subtree pattern once a trailing slash is added gets a `301`
    /// there. Anything else unmatched gets `404`.
    pub fn serve(&self, mut req: Request) -> BoxFuture {
        let handler = match self.table.resolve(&req.path) {
            Resolution::Found(found) => self.endpoint(found, &mut req),
            Resolution::Redirect => redirect(&req),
            Resolution::NotFound => not_found(),
        };
        compose(Next::from_boxed(handler), &self.middlewares).run(req)
    }

    fn endpoint(&self, found: Found<'_, Endpoint>, req: &mut Request) -> BoxedHandler {
        req.pattern = Some(Arc::clone(found.pattern));
        req.params.extend(found.params);
        req.subtree = found.subtree;
        match found.value {
            Endpoint::Handler(handler) => Arc::clone(handler),
            Endpoint::Methods(index) => Arc::clone(&self.dispatchers[*index]) as BoxedHandler,
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl ErasedHandler for Router {
    fn call(&self, req: Request) -> BoxFuture {
        self.serve(req)
    }
}

// ── Built-in endpoints ────────────────────────────────────────────────────────

/// Rewrites the routing path to the subtree remainder before delegating.
fn strip_prefix(inner: BoxedHandler) -> BoxedHandler {
    (move |mut req: Request| {
        req.path = match req.subtree.take() {
            Some(rest) => format!("/{rest}"),
            None => "/".to_owned(),
        };
        inner.call(req)
    })
    .into_boxed_handler()
}

fn not_found() -> BoxedHandler {
    (|_req: Request| ready(
        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .text("404 page not found\n"),
    ))
    .into_boxed_handler()
}

/// `301` to the client's own path plus `/`. Built from the URI rather than
/// the routing path so a redirect issued behind [`Router::embed`] keeps the
/// mount prefix.
fn redirect(req: &Request) -> BoxedHandler {
    let mut path = format!("{}/", req.uri().path());
    if let Some(query) = req.query() {
        path.push('?');
        path.push_str(query);
    }
    let Ok(location) = HeaderValue::try_from(path) else {
        return not_found();
    };
    (move |_req: Request| ready(
        Response::builder()
            .status(StatusCode::MOVED_PERMANENTLY)
            .header(LOCATION, location.clone())
            .no_body(),
    ))
    .into_boxed_handler()
}
