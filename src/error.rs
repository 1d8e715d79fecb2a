use {
    crate::expect::Field,
    failure::{Backtrace, Fail},
    std::{fmt, io},
};

/// The error type returned from the matcher and the transport double.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Creates an `Error` from an arbitrary failure.
    pub fn custom(err: impl Into<failure::Error>) -> Self {
        ErrorKind::Custom(err.into()).into()
    }

    /// Returns a reference to the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Consumes itself and returns the kind of this error.
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` if this error was caused by a request attribute that did not match.
    pub fn is_mismatch(&self) -> bool {
        match self.kind {
            ErrorKind::Mismatch { .. } => true,
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.kind.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.kind.backtrace()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl From<failure::Error> for Error {
    fn from(err: failure::Error) -> Self {
        ErrorKind::Custom(err).into()
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::custom(err)
    }
}

/// The kinds of errors produced while dispatching a request.
#[derive(Debug, Fail)]
pub enum ErrorKind {
    /// A configured request attribute differs from the actual one.
    #[fail(display = "expected {} {}; got {}", field, expected, actual)]
    Mismatch {
        /// The attribute that did not match.
        field: Field,
        /// The expected value.
        expected: String,
        /// The value found on the request.
        actual: String,
    },

    /// The request body could not be read.
    #[fail(display = "unable to read request body: {}", _0)]
    ReadBody(#[fail(cause)] io::Error),

    /// The queue had no entry left.
    #[fail(display = "empty response")]
    EmptyResponse,

    /// A scripted failure was taken from the queue.
    #[fail(display = "{}", _0)]
    Unexpected(failure::Error),

    /// Some queued entries were never dispatched.
    #[fail(display = "{} queued entries were not dispatched", remaining)]
    Unconsumed {
        /// The number of entries left in the queue.
        remaining: usize,
    },

    #[allow(missing_docs)]
    #[fail(display = "custom error: {}", _0)]
    Custom(failure::Error),
}

/// A type alias of `Result<T, Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
