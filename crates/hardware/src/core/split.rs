//! Cache-line splitting of single accesses.
//!
//! An access that fits in one cache line is issued as is. One that crosses a line
//! boundary is split into exactly two segments, one per line. An access longer than a
//! line falls outside this model and is dropped by the caller.

use crate::common::error::{SimError, SimResult};

/// One contiguous piece of an access, contained in a single cache line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// First virtual address of the segment.
    pub addr: u64,
    /// Length in bytes.
    pub len: u64,
}

/// How an access of a given address and length is issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitPlan {
    /// Zero-length access; nothing to issue.
    Empty,
    /// Longer than a cache line; dropped without a request.
    Oversized,
    /// Fits in one line.
    Single(Segment),
    /// Crosses one line boundary.
    Split(Segment, Segment),
}

impl SplitPlan {
    /// Number of requests this plan commits.
    pub const fn segment_count(&self) -> usize {
        match self {
            Self::Empty | Self::Oversized => 0,
            Self::Single(_) => 1,
            Self::Split(..) => 2,
        }
    }

    /// Returns `true` for a line-crossing access.
    pub const fn is_split(&self) -> bool {
        matches!(self, Self::Split(..))
    }

    /// Segments in address order.
    pub fn segments(&self) -> impl Iterator<Item = Segment> {
        let pair = match *self {
            Self::Empty | Self::Oversized => [None, None],
            Self::Single(seg) => [Some(seg), None],
            Self::Split(left, right) => [Some(left), Some(right)],
        };
        pair.into_iter().flatten()
    }
}

/// Plans the segments of an access of `len` bytes at `addr` on `line`-byte cache lines.
///
/// Arithmetic is modular like the hardware it models: an access in the topmost line wraps
/// its right segment to address zero.
///
/// # Arguments
///
/// * `addr` - Virtual address of the access.
/// * `len` - Length in bytes.
/// * `line` - Cache line size in bytes; must be non-zero.
pub const fn plan(addr: u64, len: u64, line: u64) -> SplitPlan {
    if len == 0 {
        return SplitPlan::Empty;
    }
    if len > line {
        return SplitPlan::Oversized;
    }

    let offset = addr % line;
    if offset + len <= line {
        return SplitPlan::Single(Segment { addr, len });
    }

    let left = Segment {
        addr,
        len: line - offset,
    };
    let right = Segment {
        addr: (addr - offset).wrapping_add(line),
        len: addr.wrapping_add(len) % line,
    };
    SplitPlan::Split(left, right)
}

/// Verifies that a split tiles the access and that each half sits in one line.
///
/// # Errors
///
/// [`SimError::SplitMismatch`] if the halves do not sum to `len`, if the left half does
/// not end on a line boundary, or if the right half does not start on one.
pub fn verify(addr: u64, len: u64, line: u64, left: Segment, right: Segment) -> SimResult<()> {
    let tiles = left.len + right.len == len;
    let left_ends_on_line = left.addr.wrapping_add(left.len) % line == 0;
    let right_in_one_line = right.addr % line == 0 && right.len <= line;

    if tiles && left_ends_on_line && right_in_one_line {
        Ok(())
    } else {
        Err(SimError::SplitMismatch {
            addr,
            len,
            line,
            left_addr: left.addr,
            left_size: left.len,
            right_addr: right.addr,
            right_size: right.len,
        })
    }
}
