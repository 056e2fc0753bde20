//! A minimal static file server.
//!
//! Serves the contents of one root directory read-only over HTTP/1.1. Request
//! paths are resolved strictly inside the root: anything that would escape it,
//! through `..` segments, encoded separators or symbolic links, is answered
//! with 404.
//!
//! ```no_run
//! use simple_fileserver::{FileServer, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::new("./www", "127.0.0.1", 8080)?;
//! let server = FileServer::start(config).await?;
//! println!("listening on {}", server.local_addr());
//! server.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::ServerConfig;
pub use error::{BindError, FileError};
pub use server::FileServer;
