//! A queued transport double for testing HTTP clients.
//!
//! A test fills a [`MockTransport`] with scripted entries, hands it to the
//! client under test in place of the real transport, and lets the client run.
//! Every request the client issues consumes the oldest entry: an
//! [`Expectation`] validates the request before replying, a canned response
//! is returned as is, and a function computes the response from the request.
//!
//! # Example
//!
//! ```
//! use {
//!     http::{header::HeaderMap, Method, Request, StatusCode},
//!     kagami::{build_response, body::MockBody, Expectation, MockTransport},
//!     std::io::Read,
//! };
//!
//! # fn main() -> kagami::Result<()> {
//! let mut transport = MockTransport::new();
//! transport
//!     .add(
//!         Expectation::new()
//!             .method(Method::GET)
//!             .path("/v1/users/42")
//!             .auth("Bearer t0ken")
//!             .respond(build_response(
//!                 StatusCode::OK,
//!                 &b"{\"name\":\"alice\"}"[..],
//!                 HeaderMap::new(),
//!             )),
//!     )
//!     .add(build_response(StatusCode::SERVICE_UNAVAILABLE, &b""[..], HeaderMap::new()));
//!
//! // the client under test issues its requests through the transport.
//! let request = Request::get("https://api.example.com/v1/users/42")
//!     .header("authorization", "Bearer t0ken")
//!     .body(MockBody::empty())?;
//! let response = transport.dispatch(request)?;
//! assert_eq!(response.status(), 200);
//!
//! let mut body = String::new();
//! response.into_body().read_to_string(&mut body)
//!     .map_err(kagami::Error::custom)?;
//! assert_eq!(body, "{\"name\":\"alice\"}");
//!
//! let response = transport.dispatch(Request::new(MockBody::empty()))?;
//! assert_eq!(response.status(), 503);
//!
//! // no scripted entry is left behind.
//! transport.verify()?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/kagami/0.1.0")]
#![deny(
    missing_docs,
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    rust_2018_compatibility,
    unused
)]
#![forbid(clippy::unimplemented)]

mod error;
pub mod expect;
mod response;
pub mod transport;

#[doc(inline)]
pub use crate::{
    error::{Error, ErrorKind, Result},
    expect::{Expectation, Field},
    response::build_response,
    transport::{Entry, MockTransport},
};

#[doc(no_inline)]
pub use kagami_body as body;
