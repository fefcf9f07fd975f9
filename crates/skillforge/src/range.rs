// HTTP byte-range planning for video delivery.
//
// Given an optional `Range` header and the file size, decide between a full
// 200 response and a 206 partial response with an exact start/end window.
// Malformed or unsatisfiable ranges degrade to the full-file response
// rather than erroring.

/// How a video request should be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePlan {
    /// 200 OK with the whole file.
    Full { size: u64 },
    /// 206 Partial Content with bytes `start..=end` of `size`.
    Partial { start: u64, end: u64, size: u64 },
}

impl RangePlan {
    /// Build a plan from the raw `Range` header value, if any.
    ///
    /// Accepted shape: `bytes=<start>-<end>?` where `end` defaults to
    /// `size - 1`. Anything else, and any window that does not fit the
    /// file, falls back to the full response.
    pub fn from_header(header: Option<&str>, size: u64) -> Self {
        let Some(header) = header else {
            return Self::Full { size };
        };

        match parse_range(header, size) {
            Some((start, end)) => Self::Partial { start, end, size },
            None => Self::Full { size },
        }
    }

    /// Number of body bytes this plan emits.
    pub fn len(&self) -> u64 {
        match self {
            Self::Full { size } => *size,
            Self::Partial { start, end, .. } => end - start + 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset the read should begin at.
    pub fn start(&self) -> u64 {
        match self {
            Self::Full { .. } => 0,
            Self::Partial { start, .. } => *start,
        }
    }

    /// HTTP status code for this plan.
    pub fn status(&self) -> u16 {
        match self {
            Self::Full { .. } => 200,
            Self::Partial { .. } => 206,
        }
    }

    /// `Content-Range` header value for partial responses.
    pub fn content_range(&self) -> Option<String> {
        match self {
            Self::Full { .. } => None,
            Self::Partial { start, end, size } => {
                Some(format!("bytes {}-{}/{}", start, end, size))
            }
        }
    }
}

/// Parse `bytes=<start>-<end>?` into a satisfiable (start, end) window.
fn parse_range(header: &str, size: u64) -> Option<(u64, u64)> {
    if size == 0 {
        return None;
    }

    let spec = header.strip_prefix("bytes=")?.trim();
    let (start_s, end_s) = spec.split_once('-')?;

    let start: u64 = start_s.trim().parse().ok()?;
    let end: u64 = match end_s.trim() {
        "" => size - 1,
        s => s.parse().ok()?,
    };

    // Clamp a too-large end to the last byte; reject inverted or
    // out-of-file windows.
    let end = end.min(size - 1);
    if start > end {
        return None;
    }

    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_header_full_response() {
        let plan = RangePlan::from_header(None, 1000);
        assert_eq!(plan, RangePlan::Full { size: 1000 });
        assert_eq!(plan.status(), 200);
        assert_eq!(plan.len(), 1000);
        assert_eq!(plan.content_range(), None);
    }

    #[test]
    fn test_explicit_range() {
        let plan = RangePlan::from_header(Some("bytes=0-99"), 1000);
        assert_eq!(
            plan,
            RangePlan::Partial {
                start: 0,
                end: 99,
                size: 1000
            }
        );
        assert_eq!(plan.status(), 206);
        assert_eq!(plan.len(), 100);
        assert_eq!(plan.content_range().unwrap(), "bytes 0-99/1000");
    }

    #[test]
    fn test_open_ended_range() {
        let plan = RangePlan::from_header(Some("bytes=500-"), 1000);
        assert_eq!(
            plan,
            RangePlan::Partial {
                start: 500,
                end: 999,
                size: 1000
            }
        );
        assert_eq!(plan.len(), 500);
        assert_eq!(plan.content_range().unwrap(), "bytes 500-999/1000");
    }

    #[test]
    fn test_end_clamped_to_file_size() {
        let plan = RangePlan::from_header(Some("bytes=900-2000"), 1000);
        assert_eq!(
            plan,
            RangePlan::Partial {
                start: 900,
                end: 999,
                size: 1000
            }
        );
    }

    #[test]
    fn test_single_byte_range() {
        let plan = RangePlan::from_header(Some("bytes=999-999"), 1000);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.start(), 999);
    }

    #[test]
    fn test_malformed_falls_back_to_full() {
        for header in [
            "bites=0-99",
            "bytes=",
            "bytes=-",
            "bytes=abc-def",
            "bytes=-500",
            "0-99",
        ] {
            let plan = RangePlan::from_header(Some(header), 1000);
            assert_eq!(plan, RangePlan::Full { size: 1000 }, "header: {header}");
        }
    }

    #[test]
    fn test_unsatisfiable_falls_back_to_full() {
        // Start beyond the end of the file
        let plan = RangePlan::from_header(Some("bytes=1000-"), 1000);
        assert_eq!(plan, RangePlan::Full { size: 1000 });

        // Inverted window
        let plan = RangePlan::from_header(Some("bytes=200-100"), 1000);
        assert_eq!(plan, RangePlan::Full { size: 1000 });
    }

    #[test]
    fn test_empty_file() {
        let plan = RangePlan::from_header(Some("bytes=0-10"), 0);
        assert_eq!(plan, RangePlan::Full { size: 0 });
        assert!(plan.is_empty());
    }
}
