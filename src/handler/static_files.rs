//! Static file serving module
//!
//! Turns a resolved file into a response: conditional requests, byte ranges
//! and streamed bodies.

use hyper::Response;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use super::resolve::{self, ResolvedFile};
use super::router::RequestContext;
use crate::config::ServerConfig;
use crate::error::FileError;
use crate::http::response::{
    build_file_response, build_partial_response, empty_body, stream_body, FileHeaders,
};
use crate::http::{self, cache, RangeOutcome, ResponseBody};
use crate::logger;

/// Serve the file named by the request path from the configured root
pub async fn serve(ctx: &RequestContext<'_>, config: &ServerConfig) -> Response<ResponseBody> {
    let file = match resolve::resolve(config.root(), ctx.path, config.index_files()).await {
        Ok(file) => file,
        Err(e) => return error_response(ctx, &e),
    };

    // Opened before anything is sent so unreadable files fail as a whole
    match File::open(&file.path).await {
        Ok(handle) => respond(ctx, &file, handle).await,
        Err(e) => error_response(ctx, &FileError::from_io(e)),
    }
}

/// Build the response for `file` from its opened `handle`
async fn respond<F>(
    ctx: &RequestContext<'_>,
    file: &ResolvedFile,
    handle: F,
) -> Response<ResponseBody>
where
    F: AsyncRead + AsyncSeek + Send + Unpin + 'static,
{
    file_response(ctx, file, handle)
        .await
        .unwrap_or_else(|e| error_response(ctx, &e))
}

async fn file_response<F>(
    ctx: &RequestContext<'_>,
    file: &ResolvedFile,
    mut handle: F,
) -> Result<Response<ResponseBody>, FileError>
where
    F: AsyncRead + AsyncSeek + Send + Unpin + 'static,
{
    let etag = cache::generate_etag(file.len, file.modified);
    let last_modified = file.modified.map(cache::http_date);

    if is_not_modified(ctx, &etag, file) {
        return Ok(http::build_304_response(&etag, last_modified.as_deref()));
    }

    let headers = FileHeaders {
        content_type: file.content_type,
        etag: &etag,
        last_modified: last_modified.as_deref(),
    };

    match http::parse_range(ctx.range, file.len) {
        RangeOutcome::Unsatisfiable => Ok(http::build_416_response(file.len, ctx.is_head)),
        RangeOutcome::Partial(range) => {
            let body = if ctx.is_head {
                empty_body()
            } else {
                handle
                    .seek(SeekFrom::Start(range.start))
                    .await
                    .map_err(FileError::Read)?;
                stream_body(handle.take(range.len()))
            };
            Ok(build_partial_response(
                body,
                range.len(),
                &range.content_range(file.len),
                &headers,
            ))
        }
        RangeOutcome::Full => {
            let body = if ctx.is_head {
                empty_body()
            } else {
                // Never send more than the advertised Content-Length
                stream_body(handle.take(file.len))
            };
            Ok(build_file_response(body, file.len, &headers))
        }
    }
}

/// `If-None-Match` wins over `If-Modified-Since` when both are present
fn is_not_modified(ctx: &RequestContext<'_>, etag: &str, file: &ResolvedFile) -> bool {
    match ctx.if_none_match {
        Some(_) => cache::check_etag_match(ctx.if_none_match, etag),
        None => cache::not_modified_since(ctx.if_modified_since, file.modified),
    }
}

fn error_response(ctx: &RequestContext<'_>, err: &FileError) -> Response<ResponseBody> {
    match err {
        FileError::NotFound | FileError::Forbidden => http::build_404_response(ctx.is_head),
        FileError::Read(e) => {
            logger::log_error(&format!("Failed to read file for '{}': {e}", ctx.path));
            http::build_500_response(ctx.is_head)
        }
    }
}
