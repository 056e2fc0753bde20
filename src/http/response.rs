//! HTTP response building module
//!
//! Builders for every status the file server sends. Bodies are boxed so that
//! in-memory messages and streamed files share one response type.

use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header::{
    HeaderValue, ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG,
    LAST_MODIFIED,
};
use hyper::{Response, StatusCode};
use std::io;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::logger;

/// Body type of every response
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Methods the server answers
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Read size when streaming file bodies
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Headers shared by 200 and 206 file responses
#[derive(Debug, Clone)]
pub struct FileHeaders<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub last_modified: Option<&'a str>,
}

/// Empty body
pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// In-memory body
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body streamed from `reader` in fixed-size chunks
pub fn stream_body<R>(reader: R) -> ResponseBody
where
    R: AsyncRead + Send + 'static,
{
    let stream = ReaderStream::with_capacity(reader, STREAM_CHUNK_SIZE).map_ok(Frame::data);
    StreamBody::new(stream).boxed_unsync()
}

/// Build 200 OK response for a file
///
/// `Content-Length` is always the full length, also for HEAD where `body` is empty.
pub fn build_file_response(
    body: ResponseBody,
    len: u64,
    headers: &FileHeaders<'_>,
) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, headers.content_type)
        .header(CONTENT_LENGTH, len);
    finish_file_response(builder, body, headers, "200")
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    body: ResponseBody,
    len: u64,
    content_range: &str,
    headers: &FileHeaders<'_>,
) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, headers.content_type)
        .header(CONTENT_LENGTH, len)
        .header(CONTENT_RANGE, content_range);
    finish_file_response(builder, body, headers, "206")
}

fn finish_file_response(
    builder: hyper::http::response::Builder,
    body: ResponseBody,
    headers: &FileHeaders<'_>,
    status: &str,
) -> Response<ResponseBody> {
    let mut builder = builder
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, headers.etag);
    if let Some(last_modified) = headers.last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }
    builder.body(body).unwrap_or_else(|e| {
        log_build_error(status, &e);
        fallback(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, last_modified: Option<&str>) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag);
    if let Some(last_modified) = last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }
    builder.body(empty_body()).unwrap_or_else(|e| {
        log_build_error("304", &e);
        fallback(StatusCode::NOT_MODIFIED)
    })
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found", is_head)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut response = build_text_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "405 Method Not Allowed",
        false,
    );
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .body(empty_body())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            fallback(StatusCode::NO_CONTENT)
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_len: u64, is_head: bool) -> Response<ResponseBody> {
    let mut response = build_text_response(
        StatusCode::RANGE_NOT_SATISFIABLE,
        "416 Range Not Satisfiable",
        is_head,
    );
    if let Ok(value) = HeaderValue::from_str(&format!("bytes */{file_len}")) {
        response.headers_mut().insert(CONTENT_RANGE, value);
    }
    response
}

/// Build 500 Internal Server Error response
pub fn build_500_response(is_head: bool) -> Response<ResponseBody> {
    build_text_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "500 Internal Server Error",
        is_head,
    )
}

/// Short plain-text response; HEAD keeps the length but drops the body
fn build_text_response(status: StatusCode, message: &'static str, is_head: bool) -> Response<ResponseBody> {
    let body = if is_head {
        empty_body()
    } else {
        full_body(message)
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, message.len())
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(status)
        })
}

/// Bare response used when a builder rejects a header
fn fallback(status: StatusCode) -> Response<ResponseBody> {
    let mut response = Response::new(empty_body());
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_bytes(response: Response<ResponseBody>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_404_response() {
        let response = build_404_response(false);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_LENGTH], "13");
        assert_eq!(body_bytes(response).await, "404 Not Found");
    }

    #[tokio::test]
    async fn test_head_404_has_no_body() {
        let response = build_404_response(true);
        assert_eq!(response.headers()[CONTENT_LENGTH], "13");
        assert!(body_bytes(response).await.is_empty());
    }

    #[test]
    fn test_405_allow_header() {
        let response = build_405_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], ALLOWED_METHODS);
    }

    #[test]
    fn test_416_content_range() {
        let response = build_416_response(42, false);
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes */42");
    }

    #[tokio::test]
    async fn test_stream_body_yields_all_bytes() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let body = stream_body(std::io::Cursor::new(data.clone()));
        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected.as_ref(), data.as_slice());
    }

    #[test]
    fn test_file_response_headers() {
        let headers = FileHeaders {
            content_type: "text/plain; charset=utf-8",
            etag: "\"1-2\"",
            last_modified: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
        };
        let response = build_file_response(empty_body(), 2, &headers);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "2");
        assert_eq!(response.headers()[ETAG], "\"1-2\"");
        assert_eq!(response.headers()[ACCEPT_RANGES], "bytes");
        assert_eq!(
            response.headers()[LAST_MODIFIED],
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
    }
}
