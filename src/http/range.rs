//! `Range` header parsing and merging of overlapping/adjacent byte ranges.

use crate::errors::ErrorKind;
use memchr::memchr;

/// A half-open, already-clamped `[start, end)` byte range within a resource of
/// known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ByteRange {
    pub(crate) start: u64,
    pub(crate) end: u64,
}

impl ByteRange {
    #[inline(always)]
    pub(crate) fn len(&self) -> u64 {
        self.end - self.start
    }
}

/// Parses a `Range: bytes=...` header value against a resource of `total_len` bytes,
/// clamping each range to the resource, sorting by start offset, and merging
/// overlapping or touching ranges into the minimal covering set.
///
/// Returns [`ErrorKind::InvalidRange`] for a malformed header (wrong unit, empty
/// range set, non-numeric offsets) and [`ErrorKind::RangeNotSatisfiable`] when every
/// requested range falls entirely outside `[0, total_len)`.
pub(crate) fn parse(value: &[u8], total_len: u64) -> Result<Vec<ByteRange>, ErrorKind> {
    let rest = value
        .strip_prefix(b"bytes=")
        .ok_or(ErrorKind::InvalidRange)?;

    if total_len == 0 {
        return Err(ErrorKind::RangeNotSatisfiable);
    }

    let mut ranges = Vec::new();

    for spec in rest.split(|&b| b == b',') {
        let spec = trim(spec);
        if spec.is_empty() {
            return Err(ErrorKind::InvalidRange);
        }

        let dash = memchr(b'-', spec).ok_or(ErrorKind::InvalidRange)?;
        let (start_bytes, end_bytes) = (&spec[..dash], &spec[dash + 1..]);

        let range = if start_bytes.is_empty() {
            // suffix range: `-N` means the last N bytes.
            let suffix_len = parse_u64(end_bytes)?;
            if suffix_len == 0 {
                continue;
            }
            let start = total_len.saturating_sub(suffix_len);
            ByteRange { start, end: total_len }
        } else {
            let start = parse_u64(start_bytes)?;
            if start >= total_len {
                continue;
            }
            let end = if end_bytes.is_empty() {
                total_len
            } else {
                let end = parse_u64(end_bytes)?;
                if end < start {
                    return Err(ErrorKind::InvalidRange);
                }
                (end + 1).min(total_len)
            };
            ByteRange { start, end }
        };

        ranges.push(range);
    }

    if ranges.is_empty() {
        return Err(ErrorKind::RangeNotSatisfiable);
    }

    ranges.sort_unstable_by_key(|r| r.start);
    merge(ranges)
}

/// Merges a start-sorted list of ranges, combining pairs that exactly touch
/// (`range.start == last.end`). A pair that genuinely overlaps
/// (`range.start < last.end`) is rejected with [`ErrorKind::RangeNotSatisfiable`]
/// rather than silently merged.
fn merge(ranges: Vec<ByteRange>) -> Result<Vec<ByteRange>, ErrorKind> {
    let mut merged: Vec<ByteRange> = Vec::with_capacity(ranges.len());

    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start < last.end => return Err(ErrorKind::RangeNotSatisfiable),
            Some(last) if range.start == last.end => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }

    Ok(merged)
}

#[inline(always)]
fn parse_u64(bytes: &[u8]) -> Result<u64, ErrorKind> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(ErrorKind::InvalidRange);
    }
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(ErrorKind::InvalidRange)
}

#[inline(always)]
fn trim(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !first.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !last.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_range() {
        let ranges = parse(b"bytes=0-499", 1000).unwrap();
        assert_eq!(ranges, [ByteRange { start: 0, end: 500 }]);
    }

    #[test]
    fn open_ended_range() {
        let ranges = parse(b"bytes=500-", 1000).unwrap();
        assert_eq!(ranges, [ByteRange { start: 500, end: 1000 }]);
    }

    #[test]
    fn suffix_range() {
        let ranges = parse(b"bytes=-100", 1000).unwrap();
        assert_eq!(ranges, [ByteRange { start: 900, end: 1000 }]);
    }

    #[test]
    fn suffix_range_larger_than_resource_clamps_to_start() {
        let ranges = parse(b"bytes=-5000", 1000).unwrap();
        assert_eq!(ranges, [ByteRange { start: 0, end: 1000 }]);
    }

    #[test]
    fn end_clamped_to_resource_length() {
        let ranges = parse(b"bytes=0-5000", 1000).unwrap();
        assert_eq!(ranges, [ByteRange { start: 0, end: 1000 }]);
    }

    #[test]
    fn overlapping_ranges_are_not_satisfiable() {
        assert_eq!(
            parse(b"bytes=0-99, 50-149", 1000),
            Err(ErrorKind::RangeNotSatisfiable)
        );
    }

    #[test]
    fn overlapping_ranges_are_not_satisfiable_literal_scenario() {
        assert_eq!(
            parse(b"bytes=0-9,5-14", 1000),
            Err(ErrorKind::RangeNotSatisfiable)
        );
    }

    #[test]
    fn adjacent_ranges_merge() {
        let ranges = parse(b"bytes=0-99, 100-199", 1000).unwrap();
        assert_eq!(ranges, [ByteRange { start: 0, end: 200 }]);
    }

    #[test]
    fn disjoint_ranges_stay_separate_and_sorted() {
        let ranges = parse(b"bytes=500-599, 0-99", 1000).unwrap();
        assert_eq!(
            ranges,
            [ByteRange { start: 0, end: 100 }, ByteRange { start: 500, end: 600 }]
        );
    }

    #[test]
    fn wrong_unit_is_invalid() {
        assert_eq!(parse(b"items=0-1", 1000), Err(ErrorKind::InvalidRange));
    }

    #[test]
    fn start_after_end_is_invalid() {
        assert_eq!(parse(b"bytes=100-50", 1000), Err(ErrorKind::InvalidRange));
    }

    #[test]
    fn fully_out_of_bounds_is_not_satisfiable() {
        assert_eq!(parse(b"bytes=2000-3000", 1000), Err(ErrorKind::RangeNotSatisfiable));
    }

    #[test]
    fn zero_length_resource_is_not_satisfiable() {
        assert_eq!(parse(b"bytes=0-1", 0), Err(ErrorKind::RangeNotSatisfiable));
    }

    #[test]
    fn partially_out_of_bounds_keeps_the_valid_one() {
        let ranges = parse(b"bytes=900-1999, 0-10", 1000).unwrap();
        assert_eq!(
            ranges,
            [ByteRange { start: 0, end: 11 }, ByteRange { start: 900, end: 1000 }]
        );
    }
}
