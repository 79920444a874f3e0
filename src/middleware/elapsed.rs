use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{Middleware, Next};
use crate::request::{Request, RequestLine};
use crate::response::Response;

type LogFn = fn(&Response, &RequestLine, Duration);

/// Measures the wall-clock time of everything it wraps.
///
/// The clock starts right before the inner handler is invoked and stops when
/// its future completes, so nested middlewares are included and this
/// middleware's own bookkeeping is not. The result goes to a callback;
/// [`ElapsedTime::new`] logs it at `debug` level.
///
/// ```rust
/// use methodmux::Router;
/// use methodmux::middleware::ElapsedTime;
///
/// let app = Router::new()
///     .push(ElapsedTime::new())
///     .push(ElapsedTime::with_callback(|res, line, elapsed| {
///         if elapsed.as_millis() > 500 {
///             tracing::warn!(path = line.path(), status = %res.status_code(), "slow request");
///         }
///     }));
/// ```
pub struct ElapsedTime<F = LogFn> {
    callback: Arc<F>,
}

impl ElapsedTime {
    pub fn new() -> Self {
        Self::with_callback(log_elapsed)
    }
}

impl Default for ElapsedTime {
    fn default() -> Self { Self::new() }
}

impl<F> ElapsedTime<F>
where
    F: Fn(&Response, &RequestLine, Duration) + Send + Sync + 'static,
{
    pub fn with_callback(callback: F) -> Self {
        Self { callback: Arc::new(callback) }
    }
}

impl<F> Middleware for ElapsedTime<F>
where
    F: Fn(&Response, &RequestLine, Duration) + Send + Sync + 'static,
{
    fn wrap(&self, next: Next) -> Next {
        let callback = Arc::clone(&self.callback);
        Next::new(move |req: Request| {
            let line = req.line();
            let callback = Arc::clone(&callback);
            let start = Instant::now();
            let fut = next.run(req);
            async move {
                let res = fut.await;
                callback(&res, &line, start.elapsed());
                res
            }
        })
    }
}

fn log_elapsed(res: &Response, line: &RequestLine, elapsed: Duration) {
    debug!(
        method = line.method(),
        path = line.path(),
        status = res.status_code().as_u16(),
        ?elapsed,
        "request completed"
    );
}
