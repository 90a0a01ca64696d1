//! RecipientSource trait - indexed access to recipient records
//!
//! The engine reads recipients by cursor position only; it never iterates a
//! source on its own. Sources are read-only for the duration of a job.

use crate::RecipientRecord;

/// Finite, ordered recipient sequence with stable 0-based indices
pub trait RecipientSource: Send + Sync {
    /// Number of records (fixed for the lifetime of a job)
    fn len(&self) -> usize;

    /// Record at `index`, `None` past the end
    fn get(&self, index: usize) -> Option<&RecipientRecord>;

    /// Whether the source has no records
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecipientSource for Vec<RecipientRecord> {
    fn len(&self) -> usize {
        <[RecipientRecord]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&RecipientRecord> {
        <[RecipientRecord]>::get(self, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_source() {
        let source = vec![RecipientRecord::new("a@x.io"), RecipientRecord::new("b@x.io")];
        assert_eq!(RecipientSource::len(&source), 2);
        assert!(!RecipientSource::is_empty(&source));
        assert_eq!(RecipientSource::get(&source, 1).unwrap().email, "b@x.io");
        assert!(RecipientSource::get(&source, 2).is_none());
    }
}
