use crate::domain::PendingRecord;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

/// Unbounded multi-producer / single-consumer queue of pending records,
/// paired with the dispatcher's wake signal.
///
/// The wake signal is a [`Notify`]: raising it while nobody waits stores a
/// single permit, so raising it repeatedly is a no-op and a raise that lands
/// between the consumer's last dequeue and its next wait is never lost.
///
/// Once closed the queue refuses new records. The empty check and the close
/// happen under one lock, so a record is either seen by the consumer or
/// refused, never stranded.
pub struct DeliveryQueue {
    state: Mutex<QueueState>,
    wake: Notify,
}

struct QueueState {
    records: VecDeque<PendingRecord>,
    closed: bool,
}

impl DeliveryQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                records: VecDeque::new(),
                closed: false,
            }),
            wake: Notify::new(),
        }
    }

    /// Appends a record and raises the wake signal. Returns `false`, dropping
    /// the record, if the queue is closed.
    ///
    /// The record is visible to the consumer before the signal is raised.
    pub fn enqueue(&self, record: PendingRecord) -> bool {
        {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            state.records.push_back(record);
        }
        self.wake.notify_one();
        true
    }

    /// Appends a record without raising the wake signal.
    ///
    /// Used by the consumer itself when a failed record goes back to the end
    /// of the line; it is already draining and will see the record.
    pub fn requeue(&self, record: PendingRecord) {
        self.state.lock().records.push_back(record);
    }

    pub fn dequeue_if_any(&self) -> Option<PendingRecord> {
        self.state.lock().records.pop_front()
    }

    /// Suspends until the wake signal is raised, consuming it.
    pub async fn wait_for_wake(&self) {
        self.wake.notified().await;
    }

    /// Raises the wake signal without adding work.
    pub fn raise(&self) {
        self.wake.notify_one();
    }

    /// Closes the queue if it holds no records.
    pub fn close_if_empty(&self) -> bool {
        let mut state = self.state.lock();
        if state.records.is_empty() {
            state.closed = true;
        }
        state.closed
    }

    /// Closes the queue and hands back whatever was still in it.
    pub fn close(&self) -> Vec<PendingRecord> {
        let mut state = self.state.lock();
        state.closed = true;
        state.records.drain(..).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().records.is_empty()
    }
}

impl Default for DeliveryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DeliveryQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryQueue")
            .field("len", &self.len())
            .finish()
    }
}
