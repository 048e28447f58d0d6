//! Header field parsing and storage.

use std::collections::hash_map::{self, HashMap};

use crate::parser::error::Error;

const CRLF: &[u8] = b"\r\n";

/// Non-alphanumeric characters allowed in a header name.
const TOKEN_SYMBOLS: &[u8] = b"!#$%&'*+-.^_`|~";

/// A case-insensitive header map.
///
/// Names are lowercased on insertion. Repeated fields are folded into a
/// single value joined with `", "` in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: HashMap<String, String>,
}

fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || TOKEN_SYMBOLS.contains(&b)
}

pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|w| w == CRLF)
}

impl Headers {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse at most one header line from the front of `data`.
    ///
    /// Returns the number of bytes consumed and whether the blank line
    /// closing the header block was reached. `(0, false)` means no complete
    /// line is buffered yet.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), Error> {
        let index = match find_crlf(data) {
            Some(index) => index,
            None => return Ok((0, false)),
        };

        if index == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = std::str::from_utf8(&data[..index])
            .map_err(|_| Error::MalformedHeader("header line is not valid UTF-8".to_string()))?;

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| Error::MalformedHeader(format!("missing colon separator in {line:?}")))?;

        if key != key.trim_end() {
            return Err(Error::HeaderKeyTrailingWhitespace(key.to_string()));
        }

        let key = key.trim();
        if key.is_empty() || !key.bytes().all(is_token_char) {
            return Err(Error::InvalidHeaderKey(key.to_string()));
        }

        self.append(key, value.trim());

        Ok((index + CRLF.len(), false))
    }

    /// Get a header value by name (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Check whether a header is present (case-insensitive).
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(&key.to_ascii_lowercase())
    }

    /// Insert a header, replacing any existing value.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.fields
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Insert a header, merging with an existing value as `old, new`.
    pub fn append(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) {
        let value = value.as_ref();
        match self.fields.entry(key.as_ref().to_ascii_lowercase()) {
            hash_map::Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(value);
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(value.to_string());
            }
        }
    }

    /// Remove a header, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(&key.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
