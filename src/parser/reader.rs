//! Reading a request off a byte stream.

use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::parser::error::Error;
use crate::parser::request::Request;

/// A growable read buffer with a sliding window of valid bytes.
///
/// Bytes in `data[..filled]` have been read but not yet consumed by the
/// parser. Consumed bytes are dropped from the front, and the arena doubles
/// when a read would otherwise have no room.
#[derive(Debug)]
pub struct ReadBuffer {
    data: Vec<u8>,
    filled: usize,
}

impl ReadBuffer {
    /// Create a buffer with room for `capacity` bytes (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity.max(1)],
            filled: 0,
        }
    }

    /// The valid, unconsumed bytes.
    pub fn filled(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The writable tail, grown first if the buffer is full.
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        if self.filled == self.data.len() {
            let new_len = self.data.len() * 2;
            trace!("growing read buffer to {new_len} bytes");
            self.data.resize(new_len, 0);
        }
        &mut self.data[self.filled..]
    }

    /// Mark `n` bytes of the unfilled tail as valid.
    pub fn advance(&mut self, n: usize) {
        self.filled = (self.filled + n).min(self.data.len());
    }

    /// Drop the first `n` valid bytes and shift the rest to the front.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.filled);
        self.data.copy_within(n..self.filled, 0);
        self.filled -= n;
    }
}

/// Read one complete request from `reader`.
///
/// Bytes are fed to the parser after every read until it reports the
/// request is done. End of stream before that point is an
/// [`Error::IncompleteRequest`], never an empty request.
pub async fn request_from_reader<R>(reader: &mut R, initial_capacity: usize) -> Result<Request, Error>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buffer = ReadBuffer::with_capacity(initial_capacity);
    let mut request = Request::new();

    while !request.is_done() {
        let n = reader.read(buffer.unfilled_mut()).await?;
        if n == 0 {
            debug!("stream ended in state {state} with {len} bytes buffered", state = request.state(), len = buffer.len());
            return Err(Error::IncompleteRequest {
                state: request.state(),
                buffered: buffer.len(),
            });
        }
        buffer.advance(n);

        loop {
            let consumed = request.feed(buffer.filled())?;
            buffer.consume(consumed);
            if consumed == 0 || request.is_done() {
                break;
            }
        }
    }

    Ok(request)
}
