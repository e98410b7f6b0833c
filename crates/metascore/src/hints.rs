//! Hint prioritization: the panel only has room for a few hints, so callers
//! show the first few in generation order.

/// Display budget shared by every panel variant.
pub const DEFAULT_HINT_LIMIT: usize = 3;

/// Returns the first `limit` hints, preserving generation order.
pub fn prioritize(hints: &[String], limit: usize) -> &[String] {
    &hints[..hints.len().min(limit)]
}
