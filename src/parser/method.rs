//! HTTP request methods.

use std::fmt;
use std::str::FromStr;

use crate::parser::error::Error;

/// The method token of a request line.
///
/// Any token made up solely of uppercase ASCII letters is accepted, so
/// extension methods pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Method(String);

impl Method {
    /// The method token as it appeared on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(Error::InvalidMethod(s.to_string()));
        }
        Ok(Method(s.to_string()))
    }
}

impl PartialEq<str> for Method {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Method {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
