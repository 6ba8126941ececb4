//! Lock-Free Ring Buffer Implementation

use crate::error::RingBufferError;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Lock-free SPSC ring buffer of bytes
///
/// `head` and `tail` are free-running counters; the slot index is the
/// counter masked by `N - 1`, so `N` must be a power of two. The buffer is
/// empty when `head == tail` and full when `head - tail == N`.
///
/// Only the producer advances `head` and only the consumer advances `tail`.
/// Calling [`try_push`](Self::try_push) from two contexts at once (or
/// [`try_pop`](Self::try_pop) from two contexts at once) breaks that
/// contract.
pub struct RingBuffer<const N: usize> {
    /// Pre-allocated storage
    slots: UnsafeCell<[u8; N]>,
    /// Write counter, owned by the producer
    head: AtomicUsize,
    /// Read counter, owned by the consumer
    tail: AtomicUsize,
}

impl<const N: usize> RingBuffer<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "ring buffer capacity must be a power of two");
        N - 1
    };

    /// Create an empty buffer
    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            slots: UnsafeCell::new([0; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Producer side: append a byte, returning `false` (and changing
    /// nothing) when the buffer is full.
    pub fn try_push(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head.wrapping_sub(tail) >= N {
            return false;
        }

        // SAFETY: the slot at `head` is outside the readable window
        // [tail, head), so the consumer cannot be reading it, and we are the
        // only producer.
        unsafe {
            self.slots
                .get()
                .cast::<u8>()
                .add(head & Self::MASK)
                .write(byte);
        }

        // Publishing the index is the last visible effect of a push.
        self.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    /// Consumer side: remove the oldest byte, or `None` when empty.
    pub fn try_pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if head == tail {
            return None;
        }

        // SAFETY: the acquire load of `head` orders the producer's write of
        // this slot before our read, and the producer will not reuse the slot
        // until `tail` moves past it.
        let byte = unsafe { self.slots.get().cast::<u8>().add(tail & Self::MASK).read() };

        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Producer side: like [`try_push`](Self::try_push) with an error value
    pub fn push(&self, byte: u8) -> Result<(), RingBufferError> {
        if self.try_push(byte) {
            Ok(())
        } else {
            Err(RingBufferError::Full)
        }
    }

    /// Consumer side: like [`try_pop`](Self::try_pop) with an error value
    pub fn pop(&self) -> Result<u8, RingBufferError> {
        self.try_pop().ok_or(RingBufferError::Empty)
    }

    /// Get the number of unread bytes
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    /// Get the buffer capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Consumer side: drop every unread byte
    pub fn clear(&self) {
        self.tail
            .store(self.head.load(Ordering::Acquire), Ordering::Release);
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: slot access is partitioned by the head/tail protocol above; the
// buffer is meant to be shared between exactly one producer and one consumer.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_pop_in_order() {
        let buffer: RingBuffer<4> = RingBuffer::new();

        assert!(buffer.try_push(b'a'));
        assert!(buffer.try_push(b'b'));
        assert!(buffer.try_push(b'c'));
        assert_eq!(buffer.len(), 3);

        assert_eq!(buffer.try_pop(), Some(b'a'));
        assert_eq!(buffer.try_pop(), Some(b'b'));
        assert_eq!(buffer.try_pop(), Some(b'c'));
        assert_eq!(buffer.try_pop(), None);
    }

    #[test]
    fn test_full_rejects_push_without_change() {
        let buffer: RingBuffer<4> = RingBuffer::new();
        for byte in 1..=4 {
            assert!(buffer.try_push(byte));
        }

        assert!(buffer.is_full());
        assert!(!buffer.try_push(99));
        assert_eq!(buffer.push(99), Err(RingBufferError::Full));
        assert_eq!(buffer.len(), 4);

        // Rejected pushes must not clobber stored data
        for byte in 1..=4 {
            assert_eq!(buffer.try_pop(), Some(byte));
        }
    }

    #[test]
    fn test_empty_pop_without_change() {
        let buffer: RingBuffer<4> = RingBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.try_pop(), None);
        assert_eq!(buffer.pop(), Err(RingBufferError::Empty));
        assert!(buffer.is_empty());

        assert!(buffer.try_push(7));
        assert_eq!(buffer.try_pop(), Some(7));
        assert!(buffer.is_empty());
        assert_eq!(buffer.try_pop(), None);
    }

    #[test]
    fn test_wraps_many_times() {
        let buffer: RingBuffer<4> = RingBuffer::new();

        // Index counters run far past the capacity
        for round in 0..1000u32 {
            let a = (round % 251) as u8;
            let b = a.wrapping_add(1);
            assert!(buffer.try_push(a));
            assert!(buffer.try_push(b));
            assert_eq!(buffer.try_pop(), Some(a));
            assert_eq!(buffer.try_pop(), Some(b));
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear() {
        let buffer: RingBuffer<8> = RingBuffer::new();
        for byte in 0..5 {
            buffer.push(byte).unwrap();
        }

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 8);

        // Still usable at full capacity after clearing
        for byte in 0..8 {
            assert!(buffer.try_push(byte));
        }
        assert!(buffer.is_full());
    }
}
