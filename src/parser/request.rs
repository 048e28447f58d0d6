//! HTTP request parsing and representation.

use std::fmt;
use std::str::FromStr;

use log::trace;

use crate::parser::error::Error;
use crate::parser::headers::{find_crlf, Headers};
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

const CRLF_LEN: usize = 2;

/// Upper bound on the body capacity reserved from a Content-Length header.
/// The rest is allocated as bytes actually arrive.
const MAX_BODY_PREALLOC: usize = 64 * 1024;

/// Where a [`Request`] is in its parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserState::Initialized => "initialized",
            ParserState::ParsingHeaders => "parsing headers",
            ParserState::ParsingBody => "parsing body",
            ParserState::Done => "done",
        };
        f.write_str(name)
    }
}

/// The first line of a request: method, target and version.
///
/// Empty until the parser has seen a complete request line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// The method token (uppercase letters only)
    pub method: Method,
    /// The request target, exactly as sent
    pub target: String,
    /// The protocol version
    pub version: HttpVersion,
}

impl FromStr for RequestLine {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split_ascii_whitespace().collect();
        let [method, target, version] = parts[..] else {
            return Err(Error::MalformedRequestLine(line.to_string()));
        };

        Ok(Self {
            method: method.parse()?,
            target: target.to_string(),
            version: version.parse()?,
        })
    }
}

/// An HTTP request, assembled incrementally by [`Request::feed`].
#[derive(Debug, Clone)]
pub struct Request {
    /// The parsed request line
    pub request_line: RequestLine,
    /// The request headers
    pub headers: Headers,
    /// The body, present only when a Content-Length header was sent
    pub body: Option<Vec<u8>>,
    state: ParserState,
    body_len: usize,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Create an empty request ready to be fed bytes.
    pub fn new() -> Self {
        Self {
            request_line: RequestLine::default(),
            headers: Headers::new(),
            body: None,
            state: ParserState::Initialized,
            body_len: 0,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// The declared body length, if a Content-Length header was sent.
    pub fn content_length(&self) -> Option<usize> {
        self.body.as_ref().map(|_| self.body_len)
    }

    /// Consume as much of `data` as the current state allows.
    ///
    /// `data` must start at the first byte not yet consumed. Returns the
    /// number of bytes consumed; `Ok(0)` means more input is needed.
    pub fn feed(&mut self, data: &[u8]) -> Result<usize, Error> {
        match self.state {
            ParserState::Initialized => self.parse_request_line(data),
            ParserState::ParsingHeaders => self.parse_headers(data),
            ParserState::ParsingBody => self.parse_body(data),
            ParserState::Done => Err(Error::ParseAfterDone),
        }
    }

    fn parse_request_line(&mut self, data: &[u8]) -> Result<usize, Error> {
        let index = match find_crlf(data) {
            Some(index) => index,
            None => return Ok(0),
        };

        let line = std::str::from_utf8(&data[..index])
            .map_err(|_| Error::MalformedRequestLine(String::from_utf8_lossy(&data[..index]).into_owned()))?;

        self.request_line = line.parse()?;
        self.state = ParserState::ParsingHeaders;
        trace!("parsed request line: {line}");

        Ok(index + CRLF_LEN)
    }

    fn parse_headers(&mut self, data: &[u8]) -> Result<usize, Error> {
        let (consumed, done) = self.headers.parse(data)?;
        if !done {
            return Ok(consumed);
        }

        let Some(value) = self.headers.get("Content-Length") else {
            self.state = ParserState::Done;
            return Ok(consumed);
        };

        // Negative values fail the usize parse as well.
        let length: usize = value
            .parse()
            .map_err(|_| Error::InvalidContentLength(value.to_string()))?;

        self.body = Some(Vec::with_capacity(length.min(MAX_BODY_PREALLOC)));
        self.body_len = length;
        self.state = if length == 0 {
            ParserState::Done
        } else {
            ParserState::ParsingBody
        };

        Ok(consumed)
    }

    fn parse_body(&mut self, data: &[u8]) -> Result<usize, Error> {
        let Some(body) = self.body.as_mut() else {
            self.state = ParserState::Done;
            return Ok(0);
        };

        let remaining = self.body_len - body.len();
        if data.len() > remaining {
            return Err(Error::BodyTooLarge {
                declared: self.body_len,
                read: body.len(),
                received: data.len(),
            });
        }

        body.extend_from_slice(data);
        if body.len() == self.body_len {
            self.state = ParserState::Done;
        }

        Ok(data.len())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Request line:")?;
        writeln!(f, "- Method: {}", self.request_line.method)?;
        writeln!(f, "- Target: {}", self.request_line.target)?;
        writeln!(f, "- Version: {}", self.request_line.version.as_str())?;
        writeln!(f, "Headers:")?;
        for (name, value) in self.headers.iter() {
            writeln!(f, "- {name}: {value}")?;
        }
        if let Some(body) = &self.body {
            writeln!(f, "Body:")?;
            writeln!(f, "{}", String::from_utf8_lossy(body))?;
        }
        Ok(())
    }
}
