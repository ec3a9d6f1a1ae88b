//! Consecutive-Repeat Suppression for Tag Reads
//!
//! A card held against the reader stays in range for many poll cycles, and
//! each cycle reads it again. Without suppression one physical lift of a
//! bin would produce dozens of observations.
//!
//! The deduplicator keeps exactly one slot: the last accepted tag. A read
//! equal to it is dropped, anything else is accepted and replaces it. It is
//! not a history, so `A, B, A` is three observations:
//!
//! ```text
//! read:     A  A  A  B  B  A
//! accepted: A  .  .  B  .  A
//! ```
//!
//! Re-accepting the same tag after a while (the truck returns to the same
//! bin) is the caller's decision: call [`Deduplicator::reset`] once the
//! cooldown has elapsed.

use crate::observation::TagId;

/// Single-slot debounce over tag identifiers
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    last: Option<TagId>,
}

impl Deduplicator {
    /// Empty deduplicator; the first read is always accepted
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Decide whether `tag` is a new observation
    ///
    /// Returns `false` for a repeat of the last accepted tag. Otherwise
    /// remembers `tag` and returns `true`.
    pub fn should_accept(&mut self, tag: &TagId) -> bool {
        if self.last.as_ref() == Some(tag) {
            return false;
        }

        self.last = Some(tag.clone());
        true
    }

    /// Forget the last accepted tag
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Last accepted tag, if any
    pub fn last(&self) -> Option<&TagId> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(raw: &str) -> TagId {
        TagId::new(raw).unwrap()
    }

    #[test]
    fn accepts_first_and_suppresses_repeats() {
        let mut dedup = Deduplicator::new();
        let a = tag("04A1B2C3");

        assert!(dedup.should_accept(&a));
        for _ in 0..5 {
            assert!(!dedup.should_accept(&a));
        }
    }

    #[test]
    fn only_immediate_predecessor_is_suppressed() {
        let mut dedup = Deduplicator::new();
        let (a, b) = (tag("AA"), tag("BB"));

        assert!(dedup.should_accept(&a));
        assert!(dedup.should_accept(&b));
        assert!(dedup.should_accept(&a));
        assert_eq!(dedup.last(), Some(&a));
    }

    #[test]
    fn reset_allows_same_tag_again() {
        let mut dedup = Deduplicator::new();
        let a = tag("04A1B2C3");

        assert!(dedup.should_accept(&a));
        assert!(!dedup.should_accept(&a));

        dedup.reset();
        assert!(dedup.last().is_none());
        assert!(dedup.should_accept(&a));
    }
}
