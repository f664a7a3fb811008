//! Offset/limit pagination over resolved record sequences.
//!
//! Windowing is bounds-clamped: an out-of-range offset yields an empty
//! page, never an error. The reported total is always the sequence length
//! before windowing, so a caller paginating a latest-version resolution
//! sees the count of distinct descriptors, not of stored records.

/// Page size when the caller does not specify a limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Hard cap on page size; larger requested limits are clamped down.
pub const MAX_LIMIT: usize = 100;

/// Window requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { offset: 0, limit: DEFAULT_LIMIT }
    }
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

/// One window of a result sequence plus the pre-window total.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Sequence length before windowing (the `Record-Count` value).
    pub total: usize,
    pub offset: usize,
    /// Effective limit after clamping to [`MAX_LIMIT`].
    pub limit: usize,
}

/// Apply offset/limit windowing to an already-ordered sequence.
pub fn paginate<T>(records: Vec<T>, request: &PageRequest) -> Page<T> {
    let total = records.len();
    let limit = request.limit.min(MAX_LIMIT);
    let start = request.offset.min(total);
    let end = request.offset.saturating_add(limit).min(total);
    let items = records.into_iter().skip(start).take(end - start).collect();
    Page { items, total, offset: request.offset, limit }
}
