//! Bounded line queue shared between the tailer and batch assembly.

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// A bounded FIFO of raw lines.
///
/// `push` waits for a free slot instead of dropping when the queue is full.
/// `drain` never waits. Once closed, pushes fail but queued lines can still
/// be drained.
#[derive(Debug)]
pub struct LineQueue {
    lines: Mutex<VecDeque<String>>,
    // One permit per free slot.
    slots: Semaphore,
    capacity: usize,
}

impl LineQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
            slots: Semaphore::new(capacity),
            capacity,
        }
    }

    /// Appends a line, waiting while the queue is full.
    pub async fn push(&self, line: String) -> Result<()> {
        let permit = self.slots.acquire().await.map_err(|_| Error::QueueClosed)?;
        let mut lines = self.lock();
        // close() takes the lock too, so nothing lands after it returns.
        if self.slots.is_closed() {
            return Err(Error::QueueClosed);
        }
        lines.push_back(line);
        permit.forget();
        Ok(())
    }

    /// Removes up to `max` lines from the front without waiting.
    pub fn drain(&self, max: usize) -> Vec<String> {
        let drained: Vec<String> = {
            let mut lines = self.lock();
            let count = max.min(lines.len());
            lines.drain(..count).collect()
        };
        if !drained.is_empty() {
            self.slots.add_permits(drained.len());
        }
        drained
    }

    /// Rejects all further pushes and wakes any producer waiting for space.
    pub fn close(&self) {
        let _lines = self.lock();
        self.slots.close();
    }

    pub fn is_closed(&self) -> bool {
        self.slots.is_closed()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
