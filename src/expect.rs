//! Expectations on the requests issued by the client under test.

use {
    crate::{
        error::{Error, ErrorKind},
        response::build_response,
    },
    bytes::Bytes,
    http::{
        header::{
            HeaderMap, HeaderName, HeaderValue, IntoHeaderName, AUTHORIZATION, CONTENT_TYPE, HOST,
        },
        Method, Request, Response, StatusCode,
    },
    kagami_body::MockBody,
    std::{borrow::Cow, fmt, io::Read},
};

/// A boxed function that produces a response from a request.
pub type ResponseFn<B> = Box<dyn FnOnce(Request<B>) -> crate::Result<Response<MockBody>> + Send>;

/// The attribute of a request compared by an `Expectation`.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// The path component of the request URI.
    Path,
    /// The value of the `authorization` header.
    Auth,
    /// The request method.
    Method,
    /// The raw query string.
    Query,
    /// The authority of the request URI, or the `host` header.
    Host,
    /// The value of the `content-type` header.
    ContentType,
    /// An arbitrary header field.
    Header(HeaderName),
    /// The request body.
    Body,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Path => f.write_str("request path"),
            Field::Auth => f.write_str("auth header"),
            Field::Method => f.write_str("method"),
            Field::Query => f.write_str("query args"),
            Field::Host => f.write_str("host"),
            Field::ContentType => f.write_str("content-type"),
            Field::Header(name) => write!(f, "header `{}`", name),
            Field::Body => f.write_str("body"),
        }
    }
}

/// What a matched `Expectation` hands back to the client.
pub enum Reply<B> {
    /// A canned response.
    Response(Response<MockBody>),
    /// A function computing the response from the validated request.
    Func(ResponseFn<B>),
}

impl<B> Reply<B> {
    pub(crate) fn call(self, request: Request<B>) -> crate::Result<Response<MockBody>> {
        match self {
            Reply::Response(response) => Ok(response),
            Reply::Func(f) => f(request),
        }
    }
}

impl<B> fmt::Debug for Reply<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Response(response) => f.debug_tuple("Response").field(response).finish(),
            Reply::Func(..) => f.debug_tuple("Func").field(&"<function>").finish(),
        }
    }
}

/// A set of expected request attributes, paired with the reply returned on a match.
///
/// Every attribute left unset (or set to an empty value) is ignored by `check`.
///
/// ```
/// # use http::{Method, Request, StatusCode};
/// # use kagami::{build_response, Expectation};
/// # fn main() -> kagami::Result<()> {
/// let expectation = Expectation::new()
///     .method(Method::POST)
///     .path("/v1/items")
///     .payload(&b"{\"name\":\"apple\"}"[..])
///     .respond(build_response(StatusCode::CREATED, &b""[..], Default::default()));
///
/// let mut request = Request::post("/v1/items").body(&b"{\"name\":\"apple\"}"[..])?;
/// expectation.check(&mut request)?;
/// # Ok(())
/// # }
/// ```
pub struct Expectation<B> {
    path: String,
    auth: String,
    method: Option<Method>,
    query: String,
    host: String,
    content_type: String,
    headers: HeaderMap,
    payload: Bytes,
    reply: Option<Reply<B>>,
}

impl<B> fmt::Debug for Expectation<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("path", &self.path)
            .field("auth", &self.auth)
            .field("method", &self.method)
            .field("query", &self.query)
            .field("host", &self.host)
            .field("content_type", &self.content_type)
            .field("headers", &self.headers)
            .field("payload", &self.payload)
            .field("reply", &self.reply)
            .finish()
    }
}

impl<B> Default for Expectation<B> {
    fn default() -> Self {
        Self {
            path: String::new(),
            auth: String::new(),
            method: None,
            query: String::new(),
            host: String::new(),
            content_type: String::new(),
            headers: HeaderMap::new(),
            payload: Bytes::new(),
            reply: None,
        }
    }
}

impl<B> Expectation<B> {
    /// Creates an `Expectation` that accepts any request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expected path of the request URI.
    pub fn path(self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..self
        }
    }

    /// Sets the expected value of the `authorization` header.
    pub fn auth(self, auth: impl Into<String>) -> Self {
        Self {
            auth: auth.into(),
            ..self
        }
    }

    /// Sets the expected request method.
    pub fn method(self, method: Method) -> Self {
        Self {
            method: Some(method),
            ..self
        }
    }

    /// Sets the expected raw query string, without the leading `?`.
    pub fn query(self, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..self
        }
    }

    /// Sets the expected host, including the port if the client sends one.
    pub fn host(self, host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..self
        }
    }

    /// Sets the expected value of the `content-type` header.
    pub fn content_type(self, content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..self
        }
    }

    /// Adds a header field that must be present on the request.
    ///
    /// Calling this method multiple times with the same name requires all of the values.
    pub fn header<K>(mut self, name: K, value: HeaderValue) -> Self
    where
        K: IntoHeaderName,
    {
        self.headers.append(name, value);
        self
    }

    /// Sets the expected request body.
    pub fn payload(self, payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            ..self
        }
    }

    /// Sets the response returned when the request matches.
    pub fn respond(self, response: Response<MockBody>) -> Self {
        Self {
            reply: Some(Reply::Response(response)),
            ..self
        }
    }

    /// Sets a function computing the response when the request matches.
    pub fn respond_with<F>(self, f: F) -> Self
    where
        F: FnOnce(Request<B>) -> crate::Result<Response<MockBody>> + Send + 'static,
    {
        Self {
            reply: Some(Reply::Func(Box::new(f))),
            ..self
        }
    }

    /// Compares the configured attributes with the specified request.
    ///
    /// The request body is read to its end only if a payload has been configured.
    pub fn check(&self, request: &mut Request<B>) -> crate::Result<()>
    where
        B: Read,
    {
        if !self.path.is_empty() {
            compare(Field::Path, &self.path, request.uri().path())?;
        }

        if !self.auth.is_empty() {
            let actual = header_str(request.headers(), &AUTHORIZATION);
            compare(Field::Auth, &self.auth, &actual)?;
        }

        if let Some(method) = &self.method {
            compare(Field::Method, method.as_str(), request.method().as_str())?;
        }

        if !self.query.is_empty() {
            compare(Field::Query, &self.query, request.uri().query().unwrap_or(""))?;
        }

        if !self.host.is_empty() {
            let actual = match request.uri().authority_part() {
                Some(authority) => Cow::Borrowed(authority.as_str()),
                None => header_str(request.headers(), &HOST),
            };
            compare(Field::Host, &self.host, &actual)?;
        }

        if !self.content_type.is_empty() {
            let actual = header_str(request.headers(), &CONTENT_TYPE);
            compare(Field::ContentType, &self.content_type, &actual)?;
        }

        for (name, expected) in &self.headers {
            let mut values = request.headers().get_all(name).iter();
            if !values.any(|value| value == expected) {
                return Err(mismatch(
                    Field::Header(name.clone()),
                    &String::from_utf8_lossy(expected.as_bytes()),
                    &header_str(request.headers(), name),
                ));
            }
        }

        if !self.payload.is_empty() {
            let mut body = Vec::new();
            request
                .body_mut()
                .read_to_end(&mut body)
                .map_err(ErrorKind::ReadBody)?;
            if body[..] != self.payload[..] {
                return Err(mismatch(
                    Field::Body,
                    &String::from_utf8_lossy(&self.payload),
                    &String::from_utf8_lossy(&body),
                ));
            }
        }

        Ok(())
    }

    /// Validates the request and produces the configured reply.
    pub(crate) fn respond_to(self, mut request: Request<B>) -> crate::Result<Response<MockBody>>
    where
        B: Read,
    {
        self.check(&mut request)?;
        match self.reply {
            Some(reply) => reply.call(request),
            None => Ok(build_response(StatusCode::OK, Bytes::new(), HeaderMap::new())),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Cow<'a, str> {
    headers.get(name).map_or(Cow::Borrowed(""), |value| {
        String::from_utf8_lossy(value.as_bytes())
    })
}

fn compare(field: Field, expected: &str, actual: &str) -> crate::Result<()> {
    log::trace!("compare {}: expected={:?}, actual={:?}", field, expected, actual);
    if expected == actual {
        Ok(())
    } else {
        Err(mismatch(field, expected, actual))
    }
}

fn mismatch(field: Field, expected: &str, actual: &str) -> Error {
    log::debug!("{} mismatch: expected {:?}, got {:?}", field, expected, actual);
    ErrorKind::Mismatch {
        field,
        expected: expected.to_owned(),
        actual: actual.to_owned(),
    }
    .into()
}
