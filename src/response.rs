use {
    bytes::Bytes,
    http::{
        header::{HeaderMap, HeaderValue, CONTENT_LENGTH},
        Response, StatusCode, Version,
    },
    kagami_body::MockBody,
};

/// Creates a canned `Response` with the specified status, payload and header fields.
///
/// The response is always marked as `HTTP/1.1`, and its `content-length`
/// is set to the length of the payload, replacing any value in `headers`.
pub fn build_response(
    status: StatusCode,
    body: impl Into<Bytes>,
    headers: HeaderMap,
) -> Response<MockBody> {
    let body = MockBody::new(body);
    let content_length = HeaderValue::from(body.len());

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.version_mut() = Version::HTTP_11;
    *response.headers_mut() = headers;
    response
        .headers_mut()
        .insert(CONTENT_LENGTH, content_length);
    response
}
