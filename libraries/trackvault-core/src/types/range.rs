/// Byte ranges for partial blob reads
use serde::{Deserialize, Serialize};

/// Inclusive byte range `start..=end` resolved against a blob size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// `Content-Range` value for this range within a blob of `total` bytes
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total)
    }
}

/// Single range as requested by a client, before the blob size is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// `bytes=start-` or `bytes=start-end`
    From { start: u64, end: Option<u64> },
    /// `bytes=-n`: the final `n` bytes
    Suffix(u64),
}

impl RangeSpec {
    /// Parse an HTTP `Range` header value
    ///
    /// Format: "bytes=start-end". Multi-range requests and malformed
    /// values return `None`, meaning the whole blob is served.
    pub fn parse(header: &str) -> Option<Self> {
        let range = header.trim().strip_prefix("bytes=")?;
        if range.contains(',') {
            return None;
        }

        let (start_str, end_str) = range.split_once('-')?;
        let (start_str, end_str) = (start_str.trim(), end_str.trim());

        if start_str.is_empty() {
            return end_str.parse().ok().map(RangeSpec::Suffix);
        }

        let start: u64 = start_str.parse().ok()?;
        let end = if end_str.is_empty() {
            None
        } else {
            let end: u64 = end_str.parse().ok()?;
            if end < start {
                return None;
            }
            Some(end)
        };

        Some(RangeSpec::From { start, end })
    }

    /// Resolve against a blob of `size` bytes
    ///
    /// Returns `None` when the range is unsatisfiable. An end past the
    /// blob is clamped to the last byte.
    pub fn resolve(&self, size: u64) -> Option<ByteRange> {
        if size == 0 {
            return None;
        }

        match *self {
            RangeSpec::From { start, end } => {
                if start >= size {
                    return None;
                }
                let end = end.map_or(size - 1, |e| e.min(size - 1));
                Some(ByteRange { start, end })
            }
            RangeSpec::Suffix(0) => None,
            RangeSpec::Suffix(n) => Some(ByteRange {
                start: size.saturating_sub(n),
                end: size - 1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(
            RangeSpec::parse("bytes=0-999"),
            Some(RangeSpec::From {
                start: 0,
                end: Some(999)
            })
        );
        assert_eq!(
            RangeSpec::parse("bytes=1000-"),
            Some(RangeSpec::From {
                start: 1000,
                end: None
            })
        );
        assert_eq!(RangeSpec::parse("bytes=-500"), Some(RangeSpec::Suffix(500)));
        assert_eq!(RangeSpec::parse("bytes=5-1"), None);
        assert_eq!(RangeSpec::parse("bytes=0-1,4-5"), None);
        assert_eq!(RangeSpec::parse("invalid"), None);
    }

    #[test]
    fn test_resolve_range() {
        let size = 10000;
        let resolve = |h: &str| RangeSpec::parse(h).and_then(|r| r.resolve(size));

        assert_eq!(resolve("bytes=0-999"), Some(ByteRange { start: 0, end: 999 }));
        assert_eq!(
            resolve("bytes=1000-"),
            Some(ByteRange {
                start: 1000,
                end: 9999
            })
        );
        assert_eq!(
            resolve("bytes=9000-20000"),
            Some(ByteRange {
                start: 9000,
                end: 9999
            })
        );
        assert_eq!(
            resolve("bytes=-500"),
            Some(ByteRange {
                start: 9500,
                end: 9999
            })
        );
        assert_eq!(resolve("bytes=10000-"), None); // Out of bounds
        assert_eq!(resolve("bytes=-0"), None);
    }

    #[test]
    fn test_content_range() {
        let range = ByteRange { start: 0, end: 99 };
        assert_eq!(range.len(), 100);
        assert_eq!(range.content_range(1000), "bytes 0-99/1000");
    }
}
