use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::{Middleware, Next};
use crate::request::Request;

/// Counts requests currently inside the wrapped handler.
///
/// Cloning yields another handle to the same counters, so keep one clone to
/// read from and push another onto the router:
///
/// ```rust
/// use methodmux::Router;
/// use methodmux::middleware::RequestCounter;
///
/// let counter = RequestCounter::new();
/// let app = Router::new().push(counter.clone());
///
/// assert_eq!(counter.in_flight(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestCounter {
    counts: Arc<Counts>,
}

#[derive(Debug, Default)]
struct Counts {
    in_flight: AtomicUsize,
    total: AtomicU64,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests entered but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.counts.in_flight.load(Ordering::Acquire)
    }

    /// Requests entered since the counter was created.
    pub fn total(&self) -> u64 {
        self.counts.total.load(Ordering::Acquire)
    }

    /// Marks one request as in flight until the guard is dropped.
    ///
    /// Dropping covers every exit path: normal completion, a panicking
    /// handler, or the request future being cancelled.
    pub fn acquire(&self) -> InFlight {
        self.counts.in_flight.fetch_add(1, Ordering::AcqRel);
        self.counts.total.fetch_add(1, Ordering::AcqRel);
        InFlight { counts: Arc::clone(&self.counts) }
    }
}

/// Scoped in-flight marker returned by [`RequestCounter::acquire`].
#[must_use = "the request stops counting as in flight when this is dropped"]
#[derive(Debug)]
pub struct InFlight {
    counts: Arc<Counts>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.counts.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Middleware for RequestCounter {
    fn wrap(&self, next: Next) -> Next {
        let counter = self.clone();
        Next::new(move |req: Request| {
            let guard = counter.acquire();
            let fut = next.run(req);
            async move {
                let res = fut.await;
                drop(guard);
                res
            }
        })
    }
}
