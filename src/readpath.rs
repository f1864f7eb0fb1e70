use crate::word::NO_OWNER;
use crate::{debug_delay, Region, Transaction};

impl Region {
    /// Read `dst.len()` bytes starting at `src` into `dst`, one word at a
    /// time. The length must be a positive multiple of the region's
    /// alignment and `src` must lie inside a live segment.
    ///
    /// Read-only transactions copy the committed copies and cannot fail.
    /// A read-write transaction sees its own speculative writes back, and
    /// aborts when it hits a word another writer dirtied this epoch:
    /// `false` means the handle is dead and the caller should retry with a
    /// fresh transaction.
    pub fn read(&self, tx: &mut Transaction, src: usize, dst: &mut [u8]) -> bool {
        if tx.finished {
            return false;
        }

        let align = self.align();
        assert!(
            !dst.is_empty() && dst.len() % align == 0,
            "read length must be a positive multiple of the alignment"
        );

        for i in (0..dst.len()).step_by(align) {
            debug_delay();
            let entry = match self.words.load((src + i) as u64) {
                Some(entry) => entry,
                None => {
                    // Not a live word address. The access contract is
                    // broken, tear the transaction down rather than touch
                    // unmapped memory.
                    self.abort(tx);
                    return false;
                }
            };

            let out = &mut dst[i..i + align];

            if tx.is_ro {
                entry.copy_committed(align, out);
                continue;
            }

            let owner = entry.control.owner();
            if owner == tx.id {
                entry.copy_speculative(align, out);
            } else if owner == NO_OWNER {
                // Reading without claiming: the committed copy stays
                // untouched for the rest of the epoch, so the bytes remain
                // a consistent snapshot even if a writer claims this word
                // right after us.
                entry.copy_committed(align, out);
            } else {
                self.abort(tx);
                return false;
            }
        }

        true
    }
}
