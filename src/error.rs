//! Error types.
//!
//! Application-level outcomes (404, 405, ...) are [`Response`](crate::Response)
//! values, never errors. What is left is split by phase: [`RouteError`] is a
//! registration-time programmer error, [`Error`] is an infrastructure failure
//! while serving.

use thiserror::Error;

use crate::method::Method;

/// The error type returned by the server's fallible operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Binding the listener failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// [`Server::bind`](crate::Server::bind) was given something that is not `host:port`.
    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        source: std::net::AddrParseError,
    },
}

/// A conflicting or malformed route registration.
///
/// These are bugs in the program building the router, not runtime
/// conditions. The fluent builder methods panic with this error's message;
/// the `try_*` methods hand it back.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A handler already exists for this method on this pattern.
    #[error("multiple registrations for {method} {pattern}")]
    DuplicateMethod { method: Method, pattern: String },

    /// The path table rejected the pattern: it is malformed or it collides
    /// with a registration already present (for example the same pattern
    /// registered both raw and per-method).
    #[error("invalid route `{pattern}`: {source}")]
    Insert {
        pattern: String,
        source: matchit::InsertError,
    },
}
