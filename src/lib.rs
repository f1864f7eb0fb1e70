//! An in-memory software transactional memory engine over a word-granular
//! shared region.
//!
//! Every word of the region carries two data copies side by side, with a
//! single version bit selecting the committed one. Writers claim words with
//! a CAS and land their bytes in the other copy, and a batcher groups
//! concurrent transactions into epochs so that version bits flip and freed
//! segments are released only while no transaction is in flight. Readers
//! copy committed words without taking any lock.
//!
//! Commit and abort are all-or-nothing at transaction granularity: an
//! aborted transaction leaves nothing behind, and the writes of a committed
//! one become visible to everyone at its epoch's commit, never earlier.
//!
//! ```
//! let region = duplex::Region::create(64, 8).unwrap();
//!
//! let mut tx = region.begin(false);
//! assert!(region.write(&mut tx, &42_u64.to_le_bytes(), region.start()));
//! assert!(region.end(&mut tx));
//!
//! let mut tx = region.begin(true);
//! let mut buf = [0_u8; 8];
//! assert!(region.read(&mut tx, region.start(), &mut buf));
//! assert!(region.end(&mut tx));
//! assert_eq!(u64::from_le_bytes(buf), 42);
//! ```

mod append_list;
mod batcher;
mod config;
mod debug_delay;
mod gc;
mod readpath;
mod segment;
mod stats;
mod transaction;
mod word;
mod word_table;
mod writepath;

pub use config::Config;
pub use stats::RegionStats;
pub use transaction::Transaction;

pub(crate) use debug_delay::debug_delay;

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, RwLock};

use append_list::AppendList;
use batcher::Batcher;
use segment::Segment;
use word::WordControl;
use word_table::{WordEntry, WordTable};

/// A shared, word-addressable transactional memory region.
///
/// Threads share a region behind an `Arc` and run transactions against it
/// through [`Region::begin`] .. [`Region::end`]. Addresses handed out by
/// [`Region::start`] and [`Region::alloc`] are plain `usize` values inside
/// the region and are only meaningful to this region's read and write
/// operations.
///
/// Dropping the region releases every segment; by contract no transaction
/// is live at that point.
pub struct Region {
    pub(crate) words: WordTable,
    pub(crate) segments: RwLock<BTreeMap<usize, Segment>>,
    pub(crate) batcher: Batcher,
    /// Word controls dirtied this epoch, logged at first claim.
    pub(crate) written: AppendList<Arc<WordControl>>,
    /// Segment base addresses whose release committed this epoch.
    pub(crate) free_list: AppendList<u64>,
    /// Segments unmapped by aborts this epoch. Their bytes stay valid until
    /// the commit, because transactions admitted alongside the aborted one
    /// may still hold their addresses.
    pub(crate) retired: AppendList<Segment>,
    pub(crate) tx_counter: AtomicU64,
    pub(crate) committed_transactions: AtomicU64,
    pub(crate) aborted_transactions: AtomicU64,
    pub(crate) epochs: AtomicU64,
    start: usize,
    config: Config,
}

impl Region {
    /// Create a region with a zero-filled initial segment of `size` bytes
    /// and the given word alignment.
    pub fn create(size: usize, align: usize) -> io::Result<Region> {
        Config {
            initial_size: size,
            alignment: align,
        }
        .create()
    }

    pub(crate) fn create_with_config(config: Config) -> io::Result<Region> {
        config.validate()?;

        let segment = Segment::new(config.initial_size, config.alignment).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::OutOfMemory,
                "allocator refused the initial segment",
            )
        })?;

        let words = WordTable::default();
        let start = segment.start();
        for index in 0..config.initial_size / config.alignment {
            let entry = WordEntry {
                pair_base: segment.pair_base(index, config.alignment),
                control: Arc::new(WordControl::new()),
            };
            words.install((start + index * config.alignment) as u64, entry);
        }

        let mut segments = BTreeMap::new();
        segments.insert(start, segment);

        log::debug!(
            "created region at {:#x}: {} bytes in {} byte words",
            start,
            config.initial_size,
            config.alignment
        );

        Ok(Region {
            words,
            segments: RwLock::new(segments),
            batcher: Batcher::new(),
            written: AppendList::default(),
            free_list: AppendList::default(),
            retired: AppendList::default(),
            tx_counter: AtomicU64::new(0),
            committed_transactions: AtomicU64::new(0),
            aborted_transactions: AtomicU64::new(0),
            epochs: AtomicU64::new(0),
            start,
            config,
        })
    }

    /// Stable base address of the initial segment.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Size in bytes of the initial segment.
    pub fn size(&self) -> usize {
        self.config.initial_size
    }

    /// Word alignment in bytes.
    pub fn align(&self) -> usize {
        self.config.alignment
    }
}

fn _auto_trait_assertions() {
    fn f<T: Send + Sync>() {}

    f::<Region>();
    f::<Transaction>();
}
