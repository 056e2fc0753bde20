//! HTTP Range request parsing module
//!
//! Single `bytes` range support (RFC 9110 section 14). Multi-range requests,
//! other units and malformed headers are ignored and the full file is served.

/// Inclusive byte range resolved against a file length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    /// Last byte position, inclusive
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value of the `Content-Range` header for a file of `total` bytes
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// What to send for a request given its Range header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No usable Range header, send the whole file
    Full,
    /// Send only this part (206)
    Partial(ByteRange),
    /// Range starts past the end of the file (416)
    Unsatisfiable,
}

/// Parse an HTTP Range header against a file of `file_len` bytes
///
/// Supported formats:
/// - `bytes=start-end` - Specific range, end clamped to the file
/// - `bytes=start-` - From start to end of file
/// - `bytes=-suffix` - Last suffix bytes
///
/// # Examples
/// ```
/// use simple_fileserver::http::range::{parse_range, ByteRange, RangeOutcome};
///
/// let outcome = parse_range(Some("bytes=0-99"), 1000);
/// assert_eq!(outcome, RangeOutcome::Partial(ByteRange { start: 0, end: 99 }));
///
/// assert_eq!(parse_range(None, 1000), RangeOutcome::Full);
/// assert_eq!(parse_range(Some("bytes=1000-"), 1000), RangeOutcome::Unsatisfiable);
/// ```
pub fn parse_range(range_header: Option<&str>, file_len: u64) -> RangeOutcome {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };

    if spec.contains(',') {
        return RangeOutcome::Full;
    }

    let Some((first, last)) = spec.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        suffix_range(last, file_len)
    } else {
        bounded_range(first, last, file_len)
    }
}

/// `-n`: the final `n` bytes, or the whole file when `n` exceeds its length
fn suffix_range(suffix: &str, file_len: u64) -> RangeOutcome {
    let Ok(suffix) = suffix.parse::<u64>() else {
        return RangeOutcome::Full;
    };

    if suffix == 0 || file_len == 0 {
        return RangeOutcome::Unsatisfiable;
    }

    RangeOutcome::Partial(ByteRange {
        start: file_len.saturating_sub(suffix),
        end: file_len - 1,
    })
}

/// `a-` or `a-b`
fn bounded_range(first: &str, last: &str, file_len: u64) -> RangeOutcome {
    let Ok(start) = first.parse::<u64>() else {
        return RangeOutcome::Full;
    };

    let end = if last.is_empty() {
        None
    } else {
        match last.parse::<u64>() {
            Ok(end) if end >= start => Some(end),
            // Reversed or non-numeric ranges are invalid, not unsatisfiable
            _ => return RangeOutcome::Full,
        }
    };

    if start >= file_len {
        return RangeOutcome::Unsatisfiable;
    }

    let last_byte = file_len - 1;
    RangeOutcome::Partial(ByteRange {
        start,
        end: end.map_or(last_byte, |e| e.min(last_byte)),
    })
}
