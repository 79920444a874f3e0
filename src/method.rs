//! HTTP method as a typed enum.
//!
//! Only the five methods that can carry a per-method registration are
//! modelled. Any other method on the wire (`PATCH`, `OPTIONS`, a lower-case
//! `get`, ...) simply matches no variant and ends in `405 Method Not Allowed`
//! wherever a method set is enforced.

use std::fmt;
use std::str::FromStr;

/// A method that a handler can be registered for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Head,
    Delete,
}

impl Method {
    pub(crate) const COUNT: usize = 5;

    /// Every variant, in slot order.
    pub const ALL: [Method; Method::COUNT] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Head,
        Method::Delete,
    ];

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get    => "GET",
            Self::Post   => "POST",
            Self::Put    => "PUT",
            Self::Head   => "HEAD",
            Self::Delete => "DELETE",
        }
    }

    /// Exact, case-sensitive comparison against a request method string.
    pub fn matches(self, method: &str) -> bool {
        self.as_str() == method
    }

    /// Position in [`Method::ALL`]; used as a fixed-size table index.
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Get    => 0,
            Self::Post   => 1,
            Self::Put    => 2,
            Self::Head   => 3,
            Self::Delete => 4,
        }
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET"    => Ok(Self::Get),
            "POST"   => Ok(Self::Post),
            "PUT"    => Ok(Self::Put),
            "HEAD"   => Ok(Self::Head),
            "DELETE" => Ok(Self::Delete),
            _        => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>(), Ok(method));
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("get".parse::<Method>().is_err());
        assert!("Post".parse::<Method>().is_err());
        assert!("PATCH".parse::<Method>().is_err());
    }

    #[test]
    fn index_matches_slot_order() {
        for (i, method) in Method::ALL.into_iter().enumerate() {
            assert_eq!(method.index(), i);
        }
    }

    #[test]
    fn matches_compares_exactly() {
        assert!(Method::Delete.matches("DELETE"));
        assert!(!Method::Delete.matches("delete"));
        assert!(!Method::Get.matches("HEAD"));
    }
}
