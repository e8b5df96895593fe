use std::sync::{Mutex, MutexGuard};

use crate::queue::{FetchStats, MruQueue};
use crate::{Error, Result};

/// Thread-safe handle that serializes whole fetches behind one mutex.
///
/// `MruQueue::fetch` mutates several sections in sequence, so the lock covers
/// the complete fetch rather than individual sections.
#[derive(Debug)]
pub struct SharedMruQueue {
    inner: Mutex<MruQueue>,
}

impl SharedMruQueue {
    pub fn new(upper_limit: u32) -> Result<Self> {
        Ok(Self::from_queue(MruQueue::new(upper_limit)?))
    }

    pub fn from_queue(queue: MruQueue) -> Self {
        Self {
            inner: Mutex::new(queue),
        }
    }

    pub fn fetch(&self, position: u32) -> Result<u32> {
        self.lock()?.fetch(position)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn stats(&self) -> Result<FetchStats> {
        Ok(self.lock()?.stats())
    }

    /// Current logical order, captured under the lock.
    pub fn snapshot(&self) -> Result<Vec<u32>> {
        Ok(self.lock()?.to_vec())
    }

    pub fn into_inner(self) -> Result<MruQueue> {
        self.inner.into_inner().map_err(|_| Error::LockPoisoned)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MruQueue>> {
        self.inner.lock().map_err(|_| Error::LockPoisoned)
    }
}

impl From<MruQueue> for SharedMruQueue {
    fn from(queue: MruQueue) -> Self {
        Self::from_queue(queue)
    }
}

#[cfg(test)]
mod tests {
    use super::SharedMruQueue;
    use crate::Error;

    #[test]
    fn poisoned_lock_is_reported() {
        let shared = SharedMruQueue::new(4).expect("queue");
        let result = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = shared.inner.lock().expect("lock");
                    panic!("poison the queue");
                })
                .join()
        });
        assert!(result.is_err());
        assert_eq!(shared.fetch(1), Err(Error::LockPoisoned));
        assert!(matches!(shared.into_inner(), Err(Error::LockPoisoned)));
    }
}
