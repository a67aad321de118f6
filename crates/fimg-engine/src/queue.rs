//! Write-combining register queue.
//!
//! State mutators never touch registers directly; they queue `(addr, value)`
//! pairs here and the draw path flushes them in one burst while the hardware
//! lock is held.
//!
//! Coalescing only looks at the most recently queued entry: a run of writes
//! to the same register collapses into the last value. Once
//! [`MAX_QUEUE_LEN`] distinct entries are queued the queue stops growing and
//! marks itself overflowed; at that point replaying the whole context is
//! cheaper than draining, and the replay supersedes every dropped write.

use crate::device::{RegisterWindow, Registers};

/// Queue capacity in entries.
pub const MAX_QUEUE_LEN: usize = 64;

/// One queued register write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub addr: u32,
    pub value: u32,
}

/// What a flush did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was queued.
    Idle,
    /// The given number of entries were written in queue order.
    Drained(usize),
    /// The queue had overflowed; the full context was replayed instead.
    Restored,
}

#[derive(Debug)]
pub struct RegisterQueue {
    entries: Vec<QueueEntry>,
    overflowed: bool,
}

impl RegisterQueue {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_QUEUE_LEN),
            overflowed: false,
        }
    }

    /// Queues a register write.
    pub fn write(&mut self, addr: u32, value: u32) {
        if let Some(last) = self.entries.last_mut() {
            if last.addr == addr {
                last.value = value;
                return;
            }
        }

        if self.entries.len() == MAX_QUEUE_LEN {
            if !self.overflowed {
                log::trace!("register queue overflowed at {addr:#07x}");
                self.overflowed = true;
            }
            return;
        }

        self.entries.push(QueueEntry { addr, value });
    }

    /// Queues a float register write.
    #[inline]
    pub fn write_f32(&mut self, addr: u32, value: f32) {
        self.write(addr, value.to_bits());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && !self.overflowed
    }

    #[inline]
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Returns queued entries in issue order.
    #[inline]
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Drops everything queued without writing it.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.overflowed = false;
    }

    /// Makes every queued write visible to the device exactly once.
    ///
    /// An overflowed queue is discarded and `restore` replays the complete
    /// context instead. The queue is empty afterwards on every path.
    pub fn flush<W, F>(&mut self, regs: &mut Registers<W>, restore: F) -> FlushOutcome
    where
        W: RegisterWindow,
        F: FnOnce(&mut Registers<W>),
    {
        if self.overflowed {
            self.clear();
            restore(regs);
            return FlushOutcome::Restored;
        }

        if self.entries.is_empty() {
            return FlushOutcome::Idle;
        }

        let count = self.entries.len();
        for entry in self.entries.drain(..) {
            regs.write(entry.addr, entry.value);
        }
        log::trace!("flushed {count} queued register writes");
        FlushOutcome::Drained(count)
    }
}

impl Default for RegisterQueue {
    fn default() -> Self {
        Self::new()
    }
}
