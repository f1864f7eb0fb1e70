use std::sync::atomic::Ordering;

use crate::Region;

impl Region {
    /// Epoch commit. Runs on the last transaction out of the epoch, under
    /// the epoch lock, so it is single-threaded by construction.
    ///
    /// Queued segments are released first, then the epoch's dirtied words
    /// are walked: every access claim is reset (including claims left
    /// behind by aborted writers) and the read version flips on exactly the
    /// words whose writer committed.
    pub(crate) fn end_epoch(&self) {
        let mut released = 0_u64;
        for base in self.free_list.take() {
            let segment_opt = self.segments.write().unwrap().remove(&(base as usize));
            let segment = match segment_opt {
                Some(segment) => segment,
                None => {
                    log::warn!(
                        "segment at {:#x} queued for release twice, or never allocated",
                        base
                    );
                    continue;
                }
            };
            for addr in (base..base + segment.len() as u64).step_by(self.align()) {
                self.words.remove(addr);
            }
            // The arena bytes go back to the allocator only now, with the
            // freeing transaction's whole epoch drained.
            drop(segment);
            released += 1;
        }

        let mut retired = 0_u64;
        for segment in self.retired.take() {
            drop(segment);
            retired += 1;
        }

        let mut published = 0_u64;
        let mut discarded = 0_u64;
        for control in self.written.take() {
            if control.publish() {
                published += 1;
            } else {
                discarded += 1;
            }
        }

        let epoch = self.epochs.fetch_add(1, Ordering::Relaxed) + 1;
        if released != 0 || retired != 0 || published != 0 || discarded != 0 {
            log::trace!(
                "epoch {} closed: {} words published, {} stale claims reset, {} segments freed, {} rolled back",
                epoch,
                published,
                discarded,
                released,
                retired
            );
        }
    }
}
