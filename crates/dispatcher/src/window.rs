//! Dispatch window normalization
//!
//! Windows are 1-based and inclusive, matching spreadsheet row numbers
//! below the header. The engine works on 0-based cursors
//! `[min_index - 1, max_index)`.

use serde::Serialize;
use tracing::warn;

/// Normalized recipient window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchWindow {
    /// First recipient (1-based, inclusive)
    pub min_index: usize,
    /// Last recipient (1-based, inclusive)
    pub max_index: usize,
    /// Whether the caller passed the bounds in reverse order
    pub swapped: bool,
}

impl DispatchWindow {
    /// Clamp and order requested bounds against a source of `len` rows
    ///
    /// `min` is floored at 1 and `max` capped at `len`; reversed bounds are
    /// swapped (a caller mistake, logged but not fatal) and clamped again.
    pub fn normalize(min: usize, max: usize, len: usize) -> Self {
        let mut min_index = min.max(1);
        let mut max_index = max.min(len);
        let mut swapped = false;

        if min_index > max_index {
            warn!(
                min_index,
                max_index, "Window lower bound exceeds upper bound, swapping"
            );
            std::mem::swap(&mut min_index, &mut max_index);
            min_index = min_index.max(1);
            max_index = max_index.min(len.max(1));
            swapped = true;
        }

        Self {
            min_index,
            max_index,
            swapped,
        }
    }

    /// Number of recipients in the window
    pub fn total_target(&self) -> u64 {
        (self.max_index + 1).saturating_sub(self.min_index) as u64
    }

    /// 0-based cursor of the first recipient
    pub fn start_cursor(&self) -> usize {
        self.min_index.saturating_sub(1)
    }

    /// 0-based exclusive upper bound
    pub fn end_cursor(&self) -> usize {
        self.max_index
    }
}
