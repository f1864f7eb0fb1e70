use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub(crate) const NO_OWNER: u64 = 0;

/// Control record for one word of the region.
///
/// `access` holds the id of the read-write transaction allowed to dirty the
/// word in the current epoch, or `NO_OWNER`. `read_version` selects which of
/// the two side-by-side data copies is committed; the other copy takes
/// speculative writes. `committed` marks a dirtied word whose writer reached
/// a successful end, and only those flips are published at epoch commit.
pub(crate) struct WordControl {
    access: AtomicU64,
    read_version: AtomicBool,
    committed: AtomicBool,
}

impl WordControl {
    pub fn new() -> WordControl {
        WordControl {
            access: AtomicU64::new(NO_OWNER),
            read_version: AtomicBool::new(false),
            committed: AtomicBool::new(false),
        }
    }

    pub fn owner(&self) -> u64 {
        self.access.load(Ordering::Acquire)
    }

    /// Claim the word for `tx_id`. Fails with the current owner's id when
    /// the word is already claimed this epoch.
    pub fn try_claim(&self, tx_id: u64) -> Result<(), u64> {
        match self
            .access
            .compare_exchange(NO_OWNER, tx_id, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(()),
            Err(owner) => Err(owner),
        }
    }

    pub fn read_version(&self) -> bool {
        self.read_version.load(Ordering::Acquire)
    }

    pub fn mark_committed(&self) {
        self.committed.store(true, Ordering::Release);
    }

    /// Epoch-commit side of the protocol: promote the speculative copy when
    /// the writer committed, and release the access claim either way.
    /// Returns whether a flip was published.
    pub fn publish(&self) -> bool {
        let committed = self.committed.swap(false, Ordering::AcqRel);
        if committed {
            self.read_version.fetch_xor(true, Ordering::AcqRel);
        }
        self.access.store(NO_OWNER, Ordering::Release);
        committed
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn claims_are_exclusive_until_published() {
        let control = WordControl::new();

        assert_eq!(control.try_claim(1), Ok(()));
        assert_eq!(control.try_claim(2), Err(1));
        assert_eq!(control.owner(), 1);

        // An abandoned claim publishes nothing but frees the word.
        assert!(!control.publish());
        assert_eq!(control.owner(), NO_OWNER);
        assert!(!control.read_version());

        assert_eq!(control.try_claim(2), Ok(()));
        control.mark_committed();
        assert!(control.publish());
        assert!(control.read_version());
        assert_eq!(control.owner(), NO_OWNER);
    }
}
