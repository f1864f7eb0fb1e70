use std::sync::Arc;

use concurrent_map::ConcurrentMap;

use crate::word::WordControl;

const fn _test_impls() {
    const fn send<T: Send>() {}
    const fn clone<T: Clone>() {}
    send::<WordTable>();
    clone::<WordTable>();
}

/// A word's slot in the address map: the base of its two-copy storage pair
/// and its control record. The map holds the primary reference to the
/// control; epoch logs hold shared clones, so a record whose segment is
/// released in the same epoch still gets its claim reset safely.
#[derive(Clone)]
pub(crate) struct WordEntry {
    pub pair_base: u64,
    pub control: Arc<WordControl>,
}

impl WordEntry {
    fn committed_offset(&self, align: usize) -> usize {
        if self.control.read_version() {
            align
        } else {
            0
        }
    }

    pub fn copy_committed(&self, align: usize, dst: &mut [u8]) {
        let src = (self.pair_base as usize + self.committed_offset(align)) as *const u8;
        unsafe { std::ptr::copy_nonoverlapping(src, dst.as_mut_ptr(), align) }
    }

    pub fn copy_speculative(&self, align: usize, dst: &mut [u8]) {
        let src = (self.pair_base as usize + align - self.committed_offset(align)) as *const u8;
        unsafe { std::ptr::copy_nonoverlapping(src, dst.as_mut_ptr(), align) }
    }

    pub fn write_speculative(&self, align: usize, src: &[u8]) {
        let dst = (self.pair_base as usize + align - self.committed_offset(align)) as *mut u8;
        unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), dst, align) }
    }
}

/// Maps every user-visible word address to its [`WordEntry`]. Addresses are
/// real arena addresses, so the keys are identity-mapped and lookups on the
/// read and write paths take no region-wide lock.
#[derive(Default, Clone)]
pub(crate) struct WordTable {
    table: ConcurrentMap<u64, WordEntry>,
}

impl WordTable {
    pub fn load(&self, addr: u64) -> Option<WordEntry> {
        self.table.get(&addr)
    }

    pub fn install(&self, addr: u64, entry: WordEntry) {
        self.table.insert(addr, entry);
    }

    pub fn remove(&self, addr: u64) {
        self.table.remove(&addr);
    }
}
