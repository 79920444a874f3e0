//! Path table: pattern registration and resolution on top of `matchit`.
//!
//! `matchit` only does whole-path matches (with `{param}` and `{*catch_all}`
//! segments). The table adds subtree patterns on top: a pattern ending in
//! `/` also claims everything below it. Resolution goes:
//!
//! 1. a registered pattern matching the whole path wins;
//! 2. otherwise, if `path/` is a subtree root, the client is redirected there;
//! 3. otherwise the longest subtree root that prefixes the path takes it.
//!
//! Subtree roots are plain `matchit` routes, so they coexist with `{param}`
//! routes at the same level (`/users/` next to `/users/{id}`).

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::error::RouteError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Kind {
    /// Exact match only.
    Exact,
    /// Pattern ending in `/`: matches itself and everything below.
    Subtree,
}

struct Entry<T> {
    pattern: Arc<str>,
    kind: Kind,
    value: T,
}

/// Outcome of [`PathTable::resolve`].
pub(crate) enum Resolution<'a, T> {
    Found(Found<'a, T>),
    /// `path` + `/` is a subtree root and `path` is not registered itself.
    Redirect,
    NotFound,
}

pub(crate) struct Found<'a, T> {
    pub(crate) pattern: &'a Arc<str>,
    pub(crate) value: &'a T,
    pub(crate) params: HashMap<String, String>,
    /// Remainder below a subtree root: `Some("widgets")` for `/api/widgets`
    /// under `/api/`, `Some("")` for `/api/` itself, `None` for exact routes.
    pub(crate) subtree: Option<String>,
}

pub(crate) struct PathTable<T> {
    routes: MatchitRouter<Entry<T>>,
}

impl<T> PathTable<T> {
    pub(crate) fn new() -> Self {
        Self { routes: MatchitRouter::new() }
    }

    /// Registers `value` under `pattern`.
    ///
    /// Fails if `pattern` is malformed or already taken, including when the
    /// same pattern was registered before with a different value.
    pub(crate) fn register(&mut self, pattern: &str, value: T) -> Result<(), RouteError> {
        let kind = if pattern.ends_with('/') { Kind::Subtree } else { Kind::Exact };
        let entry = Entry { pattern: Arc::from(pattern), kind, value };
        self.routes.insert(pattern, entry).map_err(|source| RouteError::Insert {
            pattern: pattern.to_owned(),
            source,
        })
    }

    pub(crate) fn resolve(&self, path: &str) -> Resolution<'_, T> {
        if let Some(found) = self.lookup(path, "", false) {
            return Resolution::Found(found);
        }

        if !path.ends_with('/') && self.lookup(&format!("{path}/"), "", true).is_some() {
            return Resolution::Redirect;
        }

        // Ancestors, longest first: `/a/b/c` tries `/a/b/`, `/a/`, `/`.
        let mut end = path.len();
        while let Some(slash) = path[..end].rfind('/') {
            let (prefix, rest) = path.split_at(slash + 1);
            if !rest.is_empty() {
                if let Some(found) = self.lookup(prefix, rest, true) {
                    return Resolution::Found(found);
                }
            }
            end = slash;
        }

        Resolution::NotFound
    }

    /// Matches `prefix` as a whole path. With `subtree_only`, exact entries
    /// are ignored. `rest` is what the request path has beyond `prefix`.
    fn lookup(&self, prefix: &str, rest: &str, subtree_only: bool) -> Option<Found<'_, T>> {
        let matched = self.routes.at(prefix).ok()?;
        let entry = matched.value;
        if subtree_only && entry.kind != Kind::Subtree {
            return None;
        }
        Some(Found {
            pattern: &entry.pattern,
            value: &entry.value,
            params: matched.params.iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect(),
            subtree: (entry.kind == Kind::Subtree).then(|| rest.to_owned()),
        })
    }
}
