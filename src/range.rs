//! `Range: bytes=...` resolution for media playback.
//!
//! Policy:
//! - no header, a non-`bytes` unit, multiple ranges or an unparseable value: serve the
//!   whole object (200), as a server may ignore `Range`;
//! - `bytes=a-b`: `b` defaults to `size - 1` when omitted and is clamped to it when larger;
//! - `bytes=-n`: the last `n` bytes;
//! - `a >= size`, `a > b`, `bytes=-0` or any range on an empty object: unsatisfiable (416).

/// Inclusive byte span within an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub start: u64,
    pub end: u64,
}

impl ByteSpan {
    /// Number of bytes covered, `end - start + 1`.
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Range` header value for an upstream request.
    pub fn to_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }

    /// `Content-Range` response header value.
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    Full,
    Partial(ByteSpan),
    Unsatisfiable,
}

/// Resolves an optional `Range` header against an object of `size` bytes.
pub fn resolve(header: Option<&str>, size: u64) -> RangeRequest {
    let Some(raw) = header else {
        return RangeRequest::Full;
    };
    let Some(ranges) = raw.trim().strip_prefix("bytes=") else {
        return RangeRequest::Full;
    };
    if ranges.contains(',') {
        return RangeRequest::Full;
    }
    let Some((start, end)) = ranges.split_once('-') else {
        return RangeRequest::Full;
    };
    let (start, end) = (start.trim(), end.trim());

    if start.is_empty() {
        let Ok(suffix) = end.parse::<u64>() else {
            return RangeRequest::Full;
        };
        if suffix == 0 || size == 0 {
            return RangeRequest::Unsatisfiable;
        }
        return RangeRequest::Partial(ByteSpan {
            start: size.saturating_sub(suffix),
            end: size - 1,
        });
    }

    let Ok(start) = start.parse::<u64>() else {
        return RangeRequest::Full;
    };
    let end = if end.is_empty() {
        None
    } else {
        match end.parse::<u64>() {
            Ok(end) => Some(end),
            Err(_) => return RangeRequest::Full,
        }
    };

    if size == 0 || start >= size {
        return RangeRequest::Unsatisfiable;
    }
    let last = size - 1;
    let end = end.unwrap_or(last);
    if end < start {
        return RangeRequest::Unsatisfiable;
    }

    RangeRequest::Partial(ByteSpan {
        start,
        end: end.min(last),
    })
}
