//! Bounded hand-off of parameter changes from game logic to the render thread.
//!
//! The queue is a fixed-capacity single-producer/single-consumer ring buffer
//! with atomic head and tail (`ringbuf::HeapRb`). The consumer half belongs to
//! the voice and is only touched from the render callback, so peeking and
//! dequeuing are wait-free. Senders are cloneable; concurrent producers
//! serialize on a producer-side mutex that the consumer never takes.
//!
//! Ordering is enqueue order, not `scheduled_time` order. Producers are
//! expected to schedule in non-decreasing time; nothing here checks it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chirp_core::{ParameterMask, VoiceSettings};
use parking_lot::Mutex;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::debug;

/// A pending change, keyed to the owning voice's clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledChange {
    /// Voice-local clock, in seconds.
    pub scheduled_time: f64,
    pub settings: VoiceSettings,
    pub mask: ParameterMask,
}

/// Create a queue holding at most `capacity` pending changes.
pub fn parameter_queue(capacity: usize) -> (ChangeSender, ChangeReceiver) {
    let ring = HeapRb::<ScheduledChange>::new(capacity.max(1));
    let (producer, consumer) = ring.split();
    (
        ChangeSender {
            producer: Arc::new(Mutex::new(producer)),
            dropped: Arc::new(AtomicU64::new(0)),
        },
        ChangeReceiver { consumer },
    )
}

/// Producer half. Cheap to clone and safe to share between threads.
#[derive(Clone)]
pub struct ChangeSender {
    producer: Arc<Mutex<HeapProd<ScheduledChange>>>,
    dropped: Arc<AtomicU64>,
}

impl ChangeSender {
    /// Push a change. Returns `false` and drops it when the queue is full.
    pub fn enqueue(&self, change: ScheduledChange) -> bool {
        let accepted = self.producer.lock().try_push(change).is_ok();
        if !accepted {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(
                scheduled_time = change.scheduled_time,
                dropped_total = total,
                "parameter queue full, dropping scheduled change"
            );
        }
        accepted
    }

    /// Changes rejected because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.producer.lock().capacity().get()
    }

    pub fn is_full(&self) -> bool {
        self.producer.lock().is_full()
    }
}

/// Consumer half, owned by the voice on the render thread.
pub struct ChangeReceiver {
    consumer: HeapCons<ScheduledChange>,
}

impl ChangeReceiver {
    /// Oldest pending change, if any, without removing it.
    #[inline]
    pub fn peek(&self) -> Option<&ScheduledChange> {
        self.consumer.try_peek()
    }

    #[inline]
    pub fn dequeue(&mut self) -> Option<ScheduledChange> {
        self.consumer.try_pop()
    }

    pub fn len(&self) -> usize {
        self.consumer.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.consumer.capacity().get()
    }
}
