//! Request handler module
//!
//! Responsible for request dispatch, path resolution against the root
//! directory and static file responses.

pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use resolve::{resolve, ResolvedFile};
pub use router::handle_request;
