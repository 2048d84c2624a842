//! Cooperative cancellation shared by every build of one cache generation.
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A cloneable cancellation flag tagged with the generation it belongs to.
///
/// Every build scheduled by a [`crate::cache::FlowFieldCache`] holds a clone of the token that
/// was current when it was scheduled. Cancelling raises the flag for all of those clones; the
/// cache then swaps in a fresh token with the next generation number.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    generation: u64,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// Raises the flag for this token and all of its clones.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline(always)]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// An un-cancelled token for the following generation.
    pub(crate) fn next(&self) -> CancelToken {
        CancelToken {
            flag: Arc::new(AtomicBool::new(false)),
            generation: self.generation + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_reaches_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_next_is_fresh() {
        let token = CancelToken::new();
        token.cancel();

        let next = token.next();
        assert!(!next.is_cancelled());
        assert_eq!(next.generation(), token.generation() + 1);
    }
}
