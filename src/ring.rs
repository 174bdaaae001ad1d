//! Lock-free single-producer / single-consumer ring buffer.
//!
//! [`channel`] returns an owning [`Producer`]/[`Consumer`] pair over shared
//! fixed storage; each half may move to its own thread. Capacity is a power
//! of two so index arithmetic is a mask, and one slot is kept free to
//! disambiguate full from empty. Head and tail live on separate cache
//! lines.
//!
//! Publication discipline: the producer writes the slot, then stores `head`
//! with release; the consumer acquires `head` before reading the slot, and
//! releases `tail` after moving the value out, which the producer acquires
//! before reusing the slot. Pushing and popping never allocate.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Pads an atomic cursor out to its own cache line so the producer's head
/// and the consumer's tail never false-share.
#[repr(align(64))]
struct Cursor(AtomicUsize);

struct Shared<T> {
    /// Producer cursor: monotone count of pushes, masked on slot access.
    head: Cursor,
    /// Consumer cursor: monotone count of pops, masked on slot access.
    tail: Cursor,
    mask: usize,
    capacity: usize,
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// SAFETY: slots between tail and head are owned by the consumer, the rest
// by the producer; the acquire/release handoff on the cursors transfers
// that ownership. Only values of T ever cross threads.
unsafe impl<T: Send> Send for Shared<T> {}
unsafe impl<T: Send> Sync for Shared<T> {}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        // Both halves are gone; drop whatever was pushed but never popped.
        let head = *self.head.0.get_mut();
        let mut tail = *self.tail.0.get_mut();
        while tail != head {
            unsafe { (*self.slots[tail & self.mask].get()).assume_init_drop() };
            tail = tail.wrapping_add(1);
        }
    }
}

/// Write half of an SPSC ring. Not cloneable; at most one producer exists.
pub struct Producer<T> {
    shared: Arc<Shared<T>>,
}

/// Read half of an SPSC ring. Not cloneable; at most one consumer exists.
pub struct Consumer<T> {
    shared: Arc<Shared<T>>,
}

/// Creates a ring with `capacity` slots (usable capacity `capacity - 1`).
///
/// # Panics
///
/// Panics if `capacity` is not a power of two or is less than 2.
#[must_use]
pub fn channel<T>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    assert!(
        capacity.is_power_of_two() && capacity >= 2,
        "ring capacity must be a power of two >= 2"
    );

    let slots = (0..capacity)
        .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
        .collect();

    let shared = Arc::new(Shared {
        head: Cursor(AtomicUsize::new(0)),
        tail: Cursor(AtomicUsize::new(0)),
        mask: capacity - 1,
        capacity,
        slots,
    });

    (
        Producer {
            shared: Arc::clone(&shared),
        },
        Consumer { shared },
    )
}

impl<T> Producer<T> {
    /// Enqueues `value`, or hands it back if the ring is full. Full is an
    /// ordinary outcome, not an error.
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        let shared = &*self.shared;
        let head = shared.head.0.load(Ordering::Relaxed);
        let tail = shared.tail.0.load(Ordering::Acquire);

        if head.wrapping_sub(tail) == shared.capacity - 1 {
            return Err(value);
        }

        // SAFETY: the slot at head is unoccupied: the consumer has released
        // every slot below tail + capacity - 1, and we are the only writer.
        unsafe { (*shared.slots[head & shared.mask].get()).write(value) };
        shared.head.0.store(head.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Number of queued messages, as seen from the producer side.
    #[must_use]
    pub fn len(&self) -> usize {
        let shared = &*self.shared;
        shared
            .head
            .0
            .load(Ordering::Relaxed)
            .wrapping_sub(shared.tail.0.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Consumer<T> {
    /// Dequeues the front message, or `None` if the ring is empty.
    pub fn try_pop(&mut self) -> Option<T> {
        let shared = &*self.shared;
        let tail = shared.tail.0.load(Ordering::Relaxed);
        let head = shared.head.0.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        // SAFETY: the acquire on head guarantees the slot at tail holds a
        // fully constructed value; moving it out leaves the slot free for
        // the producer once tail is released.
        let value = unsafe { (*shared.slots[tail & shared.mask].get()).assume_init_read() };
        shared.tail.0.store(tail.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    /// Number of queued messages, as seen from the consumer side.
    #[must_use]
    pub fn len(&self) -> usize {
        let shared = &*self.shared;
        shared
            .head
            .0
            .load(Ordering::Acquire)
            .wrapping_sub(shared.tail.0.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
