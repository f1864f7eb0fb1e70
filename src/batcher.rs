use std::sync::{Condvar, Mutex};

/// Epoch coordinator.
///
/// Transactions are admitted into the current epoch and counted; the last
/// one out runs the epoch commit while still holding the epoch lock, so
/// nothing is admitted while version bits flip and queued segments are
/// released.
///
/// A read-write transaction that leaves failed sets `wait`, which holds new
/// read-write admissions on the condvar until the epoch drains. Letting the
/// in-flight cohort finish without fresh writers piling on keeps one abort
/// from cascading. Read-only admissions skip the gate: they only ever touch
/// committed copies, so there is nothing for them to collide with.
pub(crate) struct Batcher {
    state: Mutex<EpochState>,
    cond: Condvar,
}

struct EpochState {
    remaining: u64,
    wait: bool,
}

impl Batcher {
    pub fn new() -> Batcher {
        Batcher {
            state: Mutex::new(EpochState {
                remaining: 0,
                wait: false,
            }),
            cond: Condvar::new(),
        }
    }

    pub fn enter(&self, is_ro: bool) {
        let mut state = self.state.lock().unwrap();
        if !is_ro {
            while state.wait {
                state = self.cond.wait(state).unwrap();
            }
        }
        state.remaining += 1;
    }

    /// Leave the current epoch. When the caller is the last one out,
    /// `commit` runs under the epoch lock and the next epoch opens.
    pub fn leave<F: FnOnce()>(&self, failed: bool, commit: F) {
        let mut state = self.state.lock().unwrap();
        if failed {
            state.wait = true;
        }
        debug_assert!(state.remaining > 0);
        state.remaining -= 1;
        if state.remaining == 0 {
            commit();
            state.wait = false;
            drop(state);
            self.cond.notify_all();
        }
    }
}
