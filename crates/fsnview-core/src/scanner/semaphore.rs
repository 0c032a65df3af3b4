/// Counting semaphore that bounds simultaneous directory listings.
///
/// Walk tasks are unbounded in number; only the raw `read_dir` calls go
/// through here. A permit is held for the listing alone and released before
/// the task recurses.
use parking_lot::{Condvar, Mutex};

pub(crate) struct Semaphore {
    available: Mutex<usize>,
    released: Condvar,
}

/// Returns its slot to the semaphore on drop.
pub(crate) struct Permit<'a> {
    semaphore: &'a Semaphore,
}

impl Semaphore {
    /// `capacity` is clamped to at least one slot.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            available: Mutex::new(capacity.max(1)),
            released: Condvar::new(),
        }
    }

    /// Block until a slot is free.
    pub(crate) fn acquire(&self) -> Permit<'_> {
        let mut available = self.available.lock();
        while *available == 0 {
            self.released.wait(&mut available);
        }
        *available -= 1;
        Permit { semaphore: self }
    }

    #[cfg(test)]
    fn available(&self) -> usize {
        *self.available.lock()
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        *self.semaphore.available.lock() += 1;
        self.semaphore.released.notify_one();
    }
}
