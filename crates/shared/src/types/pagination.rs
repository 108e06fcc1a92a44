//! Row ranges for paginated store reads.

use serde::{Deserialize, Serialize};

/// Default number of rows requested per page.
///
/// Matches the row cap of the hosted ledger store; a larger page would be
/// silently truncated.
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// A half-open `[start, end)` window of rows in a stable ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    /// First row (0-indexed, inclusive).
    pub start: u64,
    /// One past the last row.
    pub end: u64,
}

impl RowRange {
    /// Creates the range for page `page` (0-indexed) of `page_size` rows.
    #[must_use]
    pub const fn page(page: u64, page_size: u64) -> Self {
        let start = page.saturating_mul(page_size);
        Self {
            start,
            end: start.saturating_add(page_size),
        }
    }

    /// Returns the offset for database queries.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.start
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns the range immediately following this one, with the same width.
    #[must_use]
    pub const fn next(&self) -> Self {
        let width = self.limit();
        Self {
            start: self.end,
            end: self.end.saturating_add(width),
        }
    }

    /// Slices `rows` to this range, clamping to the slice bounds.
    #[must_use]
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let len = rows.len();
        let start = usize::try_from(self.start).unwrap_or(usize::MAX).min(len);
        let end = usize::try_from(self.end).unwrap_or(usize::MAX).min(len);
        &rows[start..end.max(start)]
    }
}
