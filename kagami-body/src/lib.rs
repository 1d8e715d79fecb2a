//! In-memory message bodies used by `kagami`.

#![doc(html_root_url = "https://docs.rs/kagami-body/0.1.0")]
#![deny(
    missing_docs,
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    rust_2018_compatibility,
    unused
)]
#![forbid(clippy::unimplemented)]

use {
    bytes::Bytes,
    futures::{future, Async, Future, Poll, Stream},
    std::{cmp, io},
};

/// A message body backed by an in-memory payload.
///
/// The payload can be consumed once, either through `io::Read` or as a
/// `Stream` of chunks. Calling `rewind` makes it readable again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockBody {
    data: Bytes,
    pos: usize,
}

impl MockBody {
    /// Creates a `MockBody` from the specified payload.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    /// Creates an empty `MockBody`.
    pub fn empty() -> Self {
        Self::new(Bytes::new())
    }

    /// Returns the length of the whole payload, regardless of how much has been read.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of bytes that have not been read yet.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns a reference to the whole payload.
    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }

    /// Moves the read position back to the start of the payload.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Consumes itself and creates a `Future` that resolves to the unread part of the payload.
    pub fn concat(mut self) -> impl Future<Item = Bytes, Error = io::Error> {
        future::ok(self.take_remaining())
    }

    fn take_remaining(&mut self) -> Bytes {
        let chunk = self.data.slice_from(self.pos);
        self.pos = self.data.len();
        chunk
    }
}

impl From<()> for MockBody {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

macro_rules! impl_from_for_mock_body {
    ($($t:ty,)*) => {$(
        impl From<$t> for MockBody {
            fn from(data: $t) -> Self {
                Self::new(data)
            }
        }
    )*};
}

impl_from_for_mock_body! {
    &'static str,
    &'static [u8],
    String,
    Vec<u8>,
    Bytes,
}

impl io::Read for MockBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let rest = &self.data[self.pos..];
        let n = cmp::min(rest.len(), buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl io::BufRead for MockBody {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(&self.data[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = cmp::min(self.pos + amt, self.data.len());
    }
}

impl Stream for MockBody {
    type Item = Bytes;
    type Error = io::Error;

    fn poll(&mut self) -> Poll<Option<Self::Item>, Self::Error> {
        if self.remaining() == 0 {
            return Ok(Async::Ready(None));
        }
        Ok(Async::Ready(Some(self.take_remaining())))
    }
}
