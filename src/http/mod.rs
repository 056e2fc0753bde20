//! HTTP protocol layer module
//!
//! Protocol helpers shared by the request handlers: content types, cache
//! validators, Range parsing and response builders.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range, ByteRange, RangeOutcome};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_416_response,
    build_500_response, build_options_response, ResponseBody,
};
