use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

/// Many-producer, single-consumer append list.
///
/// Producers link new nodes in with a CAS on the head pointer. There is no
/// concurrent pop: the only consumer is the epoch commit, which runs while
/// no transaction is in flight, so draining does not have to defend against
/// the ABA problem or reclaim nodes behind a guard.
pub(crate) struct AppendList<T> {
    head: AtomicPtr<Node<T>>,
}

struct Node<T> {
    item: T,
    next: *mut Node<T>,
}

unsafe impl<T: Send> Send for AppendList<T> {}
unsafe impl<T: Send> Sync for AppendList<T> {}

impl<T> Default for AppendList<T> {
    fn default() -> AppendList<T> {
        AppendList {
            head: AtomicPtr::new(ptr::null_mut()),
        }
    }
}

impl<T> AppendList<T> {
    pub fn push(&self, item: T) {
        let node = Box::into_raw(Box::new(Node {
            item,
            next: ptr::null_mut(),
        }));

        let mut head = self.head.load(Ordering::Relaxed);
        loop {
            unsafe { (*node).next = head };
            match self
                .head
                .compare_exchange_weak(head, node, Ordering::Release, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => head = actual,
            }
        }
    }

    /// Detach the whole chain and hand it to the caller. Entries come out
    /// newest first.
    pub fn take(&self) -> Drain<T> {
        Drain {
            node: self.head.swap(ptr::null_mut(), Ordering::Acquire),
        }
    }
}

impl<T> Drop for AppendList<T> {
    fn drop(&mut self) {
        drop(self.take());
    }
}

pub(crate) struct Drain<T> {
    node: *mut Node<T>,
}

unsafe impl<T: Send> Send for Drain<T> {}

impl<T> Iterator for Drain<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.node.is_null() {
            return None;
        }
        let node = unsafe { Box::from_raw(self.node) };
        self.node = node.next;
        Some(node.item)
    }
}

impl<T> Drop for Drain<T> {
    fn drop(&mut self) {
        while self.next().is_some() {}
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn take_returns_everything_pushed() {
        let list = AppendList::default();
        for i in 0..64_u64 {
            list.push(i);
        }

        let mut drained: Vec<u64> = list.take().collect();
        drained.sort_unstable();
        assert_eq!(drained, (0..64).collect::<Vec<u64>>());

        assert_eq!(list.take().count(), 0);
    }

    #[test]
    fn concurrent_pushes_are_not_lost() {
        let list = std::sync::Arc::new(AppendList::default());
        let threads: Vec<_> = (0..8_u64)
            .map(|t| {
                let list = list.clone();
                std::thread::spawn(move || {
                    for i in 0..1000 {
                        list.push(t * 1000 + i);
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(list.take().count(), 8000);
    }
}
