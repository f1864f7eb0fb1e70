use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::word::WordControl;
use crate::Region;

/// Scratch state for one in-flight transaction.
///
/// Handles are not `Clone` and belong to the thread that began them. A
/// handle that has aborted or ended is dead: every further operation on it
/// reports failure. A live handle must reach [`Region::end`] (or abort
/// through a failed operation) before it is dropped, because the epoch it
/// joined stays open until it leaves.
pub struct Transaction {
    pub(crate) id: u64,
    pub(crate) is_ro: bool,
    pub(crate) finished: bool,
    pub(crate) writes: Vec<Arc<WordControl>>,
    pub(crate) allocs: Vec<(u64, usize)>,
    pub(crate) frees: Vec<u64>,
}

impl Transaction {
    /// Identifier unique over the region's lifetime. Ids start at 1; 0 is
    /// reserved for "no owner" in the per-word access state.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_read_only(&self) -> bool {
        self.is_ro
    }
}

impl Region {
    /// Begin a transaction in the current epoch.
    ///
    /// Read-write admission can block while the batcher drains an epoch
    /// that saw an abort; read-only admission never waits on that gate.
    pub fn begin(&self, is_ro: bool) -> Transaction {
        let id = self.tx_counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.batcher.enter(is_ro);
        Transaction {
            id,
            is_ro,
            finished: false,
            writes: Vec::new(),
            allocs: Vec::new(),
            frees: Vec::new(),
        }
    }

    /// End a transaction. `true` means its writes and queued frees are part
    /// of the epoch's commit. A dead handle reports `false`.
    pub fn end(&self, tx: &mut Transaction) -> bool {
        if tx.finished {
            return false;
        }
        tx.finished = true;

        if !tx.is_ro {
            // Gate this transaction's dirtied words for publication, and
            // only now hand its frees to the epoch, so an abort earlier in
            // the transaction would have had no effect on either.
            for control in &tx.writes {
                control.mark_committed();
            }
            for &base in &tx.frees {
                self.free_list.push(base);
            }
        }

        self.committed_transactions.fetch_add(1, Ordering::Relaxed);
        self.leave(false);
        true
    }

    /// Tear down a transaction that hit a conflict. Segments it introduced
    /// this epoch are unmapped and released before anyone can have observed
    /// them; its access claims stay in place until the epoch commit resets
    /// them collectively.
    pub(crate) fn abort(&self, tx: &mut Transaction) {
        tx.finished = true;

        if !tx.allocs.is_empty() {
            let mut segments = self.segments.write().unwrap();
            for &(base, len) in &tx.allocs {
                for addr in (base..base + len as u64).step_by(self.align()) {
                    self.words.remove(addr);
                }
                if let Some(segment) = segments.remove(&(base as usize)) {
                    // Unmapped, but not released yet: transactions admitted
                    // alongside this one may still hold addresses into the
                    // segment, so its bytes survive until the epoch commit.
                    self.retired.push(segment);
                }
            }
        }

        self.aborted_transactions.fetch_add(1, Ordering::Relaxed);
        log::trace!("transaction {} aborted", tx.id);
        // Only a failed writer asks the batcher to drain the epoch before
        // admitting new read-write work.
        self.leave(!tx.is_ro);
    }

    pub(crate) fn leave(&self, failed: bool) {
        self.batcher.leave(failed, || self.end_epoch());
    }
}
