//! Error types
//!
//! `BindError` covers everything that can stop the server from starting.
//! `FileError` covers per-request failures and maps each one to a status code;
//! it never escapes the request handler.

use hyper::StatusCode;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Startup failures, reported to the caller of `FileServer::start`.
#[derive(Debug, Error)]
pub enum BindError {
    /// The configured host/port pair does not resolve to a socket address.
    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Creating, binding or listening on the socket failed (e.g. port in use).
    #[error("failed to bind {addr}: {source}")]
    Socket {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The root directory does not exist or cannot be read.
    #[error("root directory '{}' is not accessible: {source}", path.display())]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The root path exists but is not a directory.
    #[error("root '{}' is not a directory", path.display())]
    RootNotDirectory { path: PathBuf },
}

/// Per-request failures while resolving or opening a file.
#[derive(Debug, Error)]
pub enum FileError {
    /// Missing, a directory without an index file, unreadable, or malformed path.
    #[error("file not found")]
    NotFound,

    /// The canonical path escapes the root directory.
    #[error("path escapes the root directory")]
    Forbidden,

    /// Unexpected I/O failure on a file that was resolved successfully.
    #[error("failed to read file: {0}")]
    Read(#[source] io::Error),
}

impl FileError {
    /// Classify an I/O error raised while touching a resolved file.
    ///
    /// Missing and permission-denied files are treated as absent; anything
    /// else is an unexpected read failure.
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Self::NotFound,
            _ => Self::Read(err),
        }
    }

    /// Status code sent to the client.
    ///
    /// Traversal attempts answer 404 so the response does not reveal whether
    /// the target exists outside the root.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::Forbidden => StatusCode::NOT_FOUND,
            Self::Read(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
