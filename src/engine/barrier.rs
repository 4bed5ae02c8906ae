// Fri Jan 16 2026 - Alex

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicI32, Ordering};

// Counts the threads taking part in one engine run and lets a single
// thread wait for all of them to leave. A negative count means a waiter
// is blocked and |count| participants are still inside.
#[derive(Debug, Default)]
pub struct Barrier {
    count: AtomicI32,
    semaphore: Semaphore,
}

impl Barrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) {
        loop {
            let local = self.count.load(Ordering::SeqCst);
            let next = if local < 0 { local - 1 } else { local + 1 };
            if self.cas(local, next) {
                return;
            }
        }
    }

    /// Returns the number of participants still inside.
    pub fn release(&self) -> i32 {
        loop {
            let local = self.count.load(Ordering::SeqCst);
            if local == -1 {
                if self.cas(-1, 0) {
                    self.semaphore.release();
                    return 0;
                }
            } else if local < 0 {
                if self.cas(local, local + 1) {
                    return (local + 1).abs();
                }
            } else if self.cas(local, local - 1) {
                return local - 1;
            }
        }
    }

    /// Releases a participant unless it is the last one inside.
    pub fn release_unless_last(&self) -> bool {
        loop {
            let local = self.count.load(Ordering::SeqCst);
            if local.abs() == 1 {
                return false;
            }
            let next = if local < 0 { local + 1 } else { local - 1 };
            if self.cas(local, next) {
                return true;
            }
        }
    }

    pub fn wait(&self) {
        loop {
            let local = self.count.load(Ordering::SeqCst);
            if local == 0 {
                return;
            }
            debug_assert!(local > 0, "only one thread may wait on a barrier");
            if self.cas(local, -local) {
                self.semaphore.acquire();
                return;
            }
        }
    }

    pub fn current_count(&self) -> i32 {
        self.count.load(Ordering::Relaxed)
    }

    fn cas(&self, current: i32, new: i32) -> bool {
        self.count
            .compare_exchange(current, new, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

#[derive(Debug, Default)]
struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    fn release(&self) {
        let mut permits = self.permits.lock();
        *permits += 1;
        self.available.notify_one();
    }
}
