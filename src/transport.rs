//! The sequenced transport double.

use {
    crate::{
        error::ErrorKind,
        expect::{Expectation, ResponseFn},
    },
    futures::{
        future::{self, FutureResult},
        Async, Poll,
    },
    http::{Request, Response},
    kagami_body::MockBody,
    std::{collections::VecDeque, fmt, io::Read, iter::FromIterator},
    tower_service::Service,
};

/// A scripted action consumed by a single dispatch.
pub enum Entry<B> {
    /// Validates the request, then produces the reply of the expectation.
    Expect(Expectation<B>),
    /// Returns the response without looking at the request.
    Respond(Response<MockBody>),
    /// Computes the response from the request.
    Func(ResponseFn<B>),
    /// Fails the dispatch with the given error.
    Fail(failure::Error),
}

impl<B> Entry<B> {
    /// Creates an `Entry` from a function computing the response.
    pub fn func<F>(f: F) -> Self
    where
        F: FnOnce(Request<B>) -> crate::Result<Response<MockBody>> + Send + 'static,
    {
        Entry::Func(Box::new(f))
    }

    fn kind(&self) -> &'static str {
        match self {
            Entry::Expect(..) => "expectation",
            Entry::Respond(..) => "response",
            Entry::Func(..) => "function",
            Entry::Fail(..) => "error",
        }
    }
}

impl<B> fmt::Debug for Entry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Expect(expectation) => f.debug_tuple("Expect").field(expectation).finish(),
            Entry::Respond(response) => f.debug_tuple("Respond").field(response).finish(),
            Entry::Func(..) => f.debug_tuple("Func").field(&"<function>").finish(),
            Entry::Fail(err) => f.debug_tuple("Fail").field(err).finish(),
        }
    }
}

impl<B> From<Expectation<B>> for Entry<B> {
    fn from(expectation: Expectation<B>) -> Self {
        Entry::Expect(expectation)
    }
}

impl<B> From<Response<MockBody>> for Entry<B> {
    fn from(response: Response<MockBody>) -> Self {
        Entry::Respond(response)
    }
}

impl<B> From<failure::Error> for Entry<B> {
    fn from(err: failure::Error) -> Self {
        Entry::Fail(err)
    }
}

/// A stand-in for the network transport of an HTTP client.
///
/// Each call to `dispatch` pops the oldest queued `Entry` and uses it to
/// answer the request. An entry is removed even if the request does not
/// match it, so a failed expectation is never retried.
pub struct MockTransport<B> {
    queue: VecDeque<Entry<B>>,
    dispatched: usize,
}

impl<B> fmt::Debug for MockTransport<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("queue", &self.queue)
            .field("dispatched", &self.dispatched)
            .finish()
    }
}

impl<B> Default for MockTransport<B> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            dispatched: 0,
        }
    }
}

impl<B> MockTransport<B> {
    /// Creates a `MockTransport` with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to the tail of the queue.
    pub fn add(&mut self, entry: impl Into<Entry<B>>) -> &mut Self {
        let entry = entry.into();
        log::debug!("queue {} at #{}", entry.kind(), self.dispatched + self.queue.len());
        self.queue.push_back(entry);
        self
    }

    /// Appends a function computing the response to the tail of the queue.
    pub fn add_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(Request<B>) -> crate::Result<Response<MockBody>> + Send + 'static,
    {
        self.add(Entry::func(f))
    }

    /// Appends a scripted failure to the tail of the queue.
    pub fn add_error(&mut self, err: impl Into<failure::Error>) -> &mut Self {
        self.add(Entry::Fail(err.into()))
    }

    /// Returns the number of entries left in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no entries are left in the queue.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of entries consumed so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Checks that every queued entry has been dispatched.
    pub fn verify(&self) -> crate::Result<()> {
        if self.queue.is_empty() {
            Ok(())
        } else {
            Err(ErrorKind::Unconsumed {
                remaining: self.queue.len(),
            }
            .into())
        }
    }

    /// Answers the request using the entry at the head of the queue.
    pub fn dispatch(&mut self, request: Request<B>) -> crate::Result<Response<MockBody>>
    where
        B: Read,
    {
        let entry = match self.queue.pop_front() {
            Some(entry) => entry,
            None => {
                log::debug!("no entry left for {} {}", request.method(), request.uri());
                return Err(ErrorKind::EmptyResponse.into());
            }
        };
        log::debug!(
            "dispatch {} {} to {} #{}",
            request.method(),
            request.uri(),
            entry.kind(),
            self.dispatched
        );
        self.dispatched += 1;

        match entry {
            Entry::Expect(expectation) => expectation.respond_to(request),
            Entry::Respond(response) => Ok(response),
            Entry::Func(f) => f(request),
            Entry::Fail(err) => Err(ErrorKind::Unexpected(err).into()),
        }
    }
}

impl<B> From<Vec<Entry<B>>> for MockTransport<B> {
    fn from(entries: Vec<Entry<B>>) -> Self {
        entries.into_iter().collect()
    }
}

impl<B> FromIterator<Entry<B>> for MockTransport<B> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Entry<B>>,
    {
        Self {
            queue: iter.into_iter().collect(),
            dispatched: 0,
        }
    }
}

impl<B> Extend<Entry<B>> for MockTransport<B> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = Entry<B>>,
    {
        for entry in iter {
            self.add(entry);
        }
    }
}

impl<B> Service<Request<B>> for MockTransport<B>
where
    B: Read,
{
    type Response = Response<MockBody>;
    type Error = crate::Error;
    type Future = FutureResult<Self::Response, Self::Error>;

    #[inline]
    fn poll_ready(&mut self) -> Poll<(), Self::Error> {
        Ok(Async::Ready(()))
    }

    #[inline]
    fn call(&mut self, request: Request<B>) -> Self::Future {
        future::result(self.dispatch(request))
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{build_response, expect::Field},
        bytes::Bytes,
        futures::Future,
        http::{
            header::{HeaderMap, HeaderValue},
            Method, StatusCode,
        },
    };

    type Transport = MockTransport<&'static [u8]>;

    fn response(status: StatusCode, body: &'static str) -> Response<MockBody> {
        build_response(status, body, HeaderMap::new())
    }

    fn any_request() -> Request<&'static [u8]> {
        Request::new(&b""[..])
    }

    #[test]
    fn empty_queue() {
        let mut transport = Transport::new();
        let err = transport.dispatch(any_request()).unwrap_err();
        match err.kind() {
            ErrorKind::EmptyResponse => {}
            kind => panic!("unexpected error: {:?}", kind),
        }
        assert_eq!(err.to_string(), "empty response");
        assert_eq!(transport.dispatched(), 0);
    }

    #[test]
    fn consumes_one_entry_per_dispatch() -> crate::Result<()> {
        let mut transport: Transport = (0..3)
            .map(|_| Entry::from(response(StatusCode::OK, "")))
            .collect();
        assert_eq!(transport.len(), 3);

        for remaining in (0..3).rev() {
            transport.dispatch(any_request())?;
            assert_eq!(transport.len(), remaining);
        }
        assert!(transport.is_empty());
        assert_eq!(transport.dispatched(), 3);
        transport.verify()?;
        Ok(())
    }

    #[test]
    fn fifo_order() -> crate::Result<()> {
        let mut transport = Transport::new();
        transport
            .add(response(StatusCode::OK, "first"))
            .add(response(StatusCode::ACCEPTED, "second"));

        let first = transport.dispatch(any_request())?;
        assert_eq!(first.body().as_bytes(), "first");
        let second = transport.dispatch(any_request())?;
        assert_eq!(second.status(), StatusCode::ACCEPTED);
        assert_eq!(second.body().as_bytes(), "second");
        Ok(())
    }

    #[test]
    fn matched_expectation_returns_paired_response() -> crate::Result<()> {
        let mut paired = response(StatusCode::CREATED, "created");
        paired
            .headers_mut()
            .insert("x-paired", HeaderValue::from_static("yes"));

        let mut transport = Transport::new();
        transport.add(
            Expectation::new()
                .method(Method::PUT)
                .path("/items/1")
                .respond(paired),
        );

        let response = transport.dispatch(Request::put("/items/1").body(&b""[..])?)?;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-paired"], "yes");
        assert_eq!(response.body().as_bytes(), "created");
        Ok(())
    }

    #[test]
    fn failed_match_still_advances() -> crate::Result<()> {
        let mut transport = Transport::new();
        transport
            .add(
                Expectation::new()
                    .method(Method::GET)
                    .respond(response(StatusCode::OK, "A")),
            )
            .add(response(StatusCode::OK, "B"));

        let err = transport
            .dispatch(Request::post("/").body(&b""[..])?)
            .unwrap_err();
        assert!(err.to_string().contains("method"));
        match err.kind() {
            ErrorKind::Mismatch { field, .. } => assert_eq!(*field, Field::Method),
            kind => panic!("unexpected error: {:?}", kind),
        }

        let response = transport.dispatch(any_request())?;
        assert_eq!(response.body().as_bytes(), "B");
        assert!(transport.is_empty());
        Ok(())
    }

    #[test]
    fn function_result_is_propagated() -> crate::Result<()> {
        let mut transport = Transport::new();
        transport
            .add_fn(|request| {
                let status = if request.uri().path() == "/ok" {
                    StatusCode::OK
                } else {
                    StatusCode::NOT_FOUND
                };
                Ok(build_response(status, Bytes::new(), HeaderMap::new()))
            })
            .add_fn(|_| Err(failure::err_msg("connection refused").into()));

        let response = transport.dispatch(Request::get("/missing").body(&b""[..])?)?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let err = transport.dispatch(any_request()).unwrap_err();
        assert_eq!(err.to_string(), "custom error: connection refused");
        Ok(())
    }

    #[test]
    fn scripted_failure() {
        let mut transport = Transport::new();
        transport.add_error(failure::err_msg("timed out"));

        let err = transport.dispatch(any_request()).unwrap_err();
        match err.kind() {
            ErrorKind::Unexpected(..) => {}
            kind => panic!("unexpected error: {:?}", kind),
        }
        assert_eq!(err.to_string(), "timed out");
    }

    #[test]
    fn verify_reports_leftovers() {
        let mut transport = Transport::from(vec![
            Entry::from(response(StatusCode::OK, "")),
            Entry::from(Expectation::new().path("/never")),
        ]);
        assert!(transport.dispatch(any_request()).is_ok());

        let err = transport.verify().unwrap_err();
        match err.kind() {
            ErrorKind::Unconsumed { remaining } => assert_eq!(*remaining, 1),
            kind => panic!("unexpected error: {:?}", kind),
        }
    }

    #[test]
    fn as_service() -> crate::Result<()> {
        let mut transport = Transport::new();
        transport.add(response(StatusCode::NO_CONTENT, ""));

        assert!(transport.poll_ready()?.is_ready());
        let response = transport.call(any_request()).wait()?;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        assert!(transport.call(any_request()).wait().is_err());
        Ok(())
    }
}
