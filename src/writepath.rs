use std::sync::Arc;

use crate::segment::Segment;
use crate::word::WordControl;
use crate::word_table::WordEntry;
use crate::{debug_delay, Region, Transaction};

impl Region {
    /// Write `src` into the region starting at `dst`, one word at a time,
    /// claiming each word for this transaction. The length must be a
    /// positive multiple of the region's alignment and `dst` must lie
    /// inside a live segment.
    ///
    /// The bytes land in the speculative copies and become visible to other
    /// transactions only when this transaction commits and its epoch ends.
    /// `false` means a word was already claimed by another writer and the
    /// handle is dead.
    pub fn write(&self, tx: &mut Transaction, src: &[u8], dst: usize) -> bool {
        if tx.finished {
            return false;
        }
        if tx.is_ro {
            // Writing through a read-only handle is outside the access
            // contract; the handle dies like any other failed writer would.
            self.abort(tx);
            return false;
        }

        let align = self.align();
        assert!(
            !src.is_empty() && src.len() % align == 0,
            "write length must be a positive multiple of the alignment"
        );

        for i in (0..src.len()).step_by(align) {
            debug_delay();
            let entry = match self.words.load((dst + i) as u64) {
                Some(entry) => entry,
                None => {
                    self.abort(tx);
                    return false;
                }
            };

            match entry.control.try_claim(tx.id) {
                Ok(()) => {
                    entry.write_speculative(align, &src[i..i + align]);
                    // First claim of this word: log it for the epoch
                    // commit, and remember it so a successful end can mark
                    // it for publication.
                    tx.writes.push(entry.control.clone());
                    self.written.push(entry.control.clone());
                }
                Err(owner) if owner == tx.id => {
                    entry.write_speculative(align, &src[i..i + align]);
                }
                Err(_) => {
                    self.abort(tx);
                    return false;
                }
            }
        }

        true
    }

    /// Reserve a fresh zeroed segment of `size` bytes and map its words
    /// into the region. Returns the segment's base address, or `None` when
    /// the allocator refuses; the transaction stays live in that case.
    ///
    /// The segment is addressable right away, and is rolled back if this
    /// transaction aborts.
    pub fn alloc(&self, tx: &mut Transaction, size: usize) -> Option<usize> {
        if tx.finished {
            return None;
        }

        let align = self.align();
        assert!(
            size > 0 && size % align == 0,
            "allocation size must be a positive multiple of the alignment"
        );

        let segment = Segment::new(size, align)?;
        let base = segment.start();

        for index in 0..size / align {
            let entry = WordEntry {
                pair_base: segment.pair_base(index, align),
                control: Arc::new(WordControl::new()),
            };
            self.words.install((base + index * align) as u64, entry);
        }

        self.segments.write().unwrap().insert(base, segment);
        tx.allocs.push((base as u64, size));

        log::trace!(
            "transaction {} allocated a {} byte segment at {:#x}",
            tx.id,
            size,
            base
        );

        Some(base)
    }

    /// Queue the segment at `addr` for release. The physical release is
    /// deferred to the epoch commit after this transaction ends, so words
    /// in the segment stay addressable for the rest of the epoch. Freeing
    /// the initial segment is outside the access contract.
    pub fn free(&self, tx: &mut Transaction, addr: usize) -> bool {
        if tx.finished {
            return false;
        }
        tx.frees.push(addr as u64);
        true
    }
}
