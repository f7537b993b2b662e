//! Pure countdown derivation: remaining seconds from absolute deadlines and
//! the `minutes:seconds` clock rendering.
//!
//! Nothing here touches shared state. Views recompute these values on a
//! fixed one-second tick so the local display cadence stays separate from
//! authoritative state changes.

use time::OffsetDateTime;

/// Whole seconds left until `end`, clamped at zero once the deadline passes.
pub fn remaining_seconds(now: OffsetDateTime, end: OffsetDateTime) -> u64 {
    (end - now).whole_seconds().max(0) as u64
}

/// Remaining seconds as shown to viewers: pinned to zero whenever the
/// countdown is not running or has no deadline, regardless of how stale the
/// stored timestamp is.
pub fn display_remaining(running: bool, end: Option<OffsetDateTime>, now: OffsetDateTime) -> u64 {
    match end {
        Some(end) if running => remaining_seconds(now, end),
        _ => 0,
    }
}

/// Render seconds as `minutes:seconds`, seconds zero-padded to two digits,
/// minutes unpadded.
pub fn format_clock(total_seconds: u64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
