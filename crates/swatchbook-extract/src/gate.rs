//! Request gate serializing calls to the extraction API.
//!
//! At most one operation runs at a time, operations start in FIFO order, and
//! consecutive starts are spaced by at least `min_interval`. Waiting callers
//! sit in an explicit queue; the running slot is handed directly from the
//! finishing operation to the next waiter.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Default spacing between two outbound requests.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Default)]
struct GateState {
    /// Whether some caller currently owns the slot.
    running: bool,
    /// Callers waiting for the slot, oldest first.
    waiters: VecDeque<oneshot::Sender<()>>,
    /// When the last operation actually started.
    last_start: Option<Instant>,
}

/// FIFO gate with minimum spacing between operation starts.
#[derive(Debug)]
pub struct RequestGate {
    min_interval: Duration,
    state: Mutex<GateState>,
}

impl RequestGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            state: Mutex::new(GateState::default()),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Number of callers queued behind the running operation.
    pub fn pending(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Run `operation` once every previously enqueued operation has settled
    /// and the spacing interval has elapsed.
    ///
    /// The operation's output, success or failure, is returned to this caller
    /// only; it has no effect on operations queued behind it.
    pub async fn enqueue<F, T>(&self, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        let _permit = self.acquire().await;
        self.wait_for_spacing().await;
        operation.await
    }

    async fn acquire(&self) -> GatePermit<'_> {
        let rx = {
            let mut state = self.lock();
            if state.running {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                debug!(queued = state.waiters.len(), "Request queued behind running request");
                Some(rx)
            } else {
                state.running = true;
                None
            }
        };

        if let Some(rx) = rx {
            let mut pending = PendingSlot {
                gate: self,
                rx: Some(rx),
            };
            if let Some(rx) = pending.rx.as_mut() {
                // The sender lives in our own queue, so it is only dropped
                // after a handoff.
                let _ = rx.await;
            }
            pending.rx = None;
        }

        GatePermit { gate: self }
    }

    async fn wait_for_spacing(&self) {
        let last_start = self.lock().last_start;
        if let Some(last) = last_start {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let delay = self.min_interval - elapsed;
                debug!(
                    delay_ms = delay.as_millis() as u64,
                    "Waiting to respect minimum request interval"
                );
                sleep(delay).await;
            }
        }
        self.lock().last_start = Some(Instant::now());
    }

    /// Hand the slot to the next live waiter, or mark the gate idle.
    fn release(&self) {
        let mut state = self.lock();
        while let Some(next) = state.waiters.pop_front() {
            if next.send(()).is_ok() {
                return;
            }
        }
        state.running = false;
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        // The state is plain data; a panic elsewhere cannot leave it torn.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

/// Ownership of the running slot. Released on drop, including when the
/// owning future is cancelled mid-operation.
struct GatePermit<'a> {
    gate: &'a RequestGate,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

/// A queued caller. If it is dropped after the slot was handed to it but
/// before it turned into a permit, the slot is passed on.
struct PendingSlot<'a> {
    gate: &'a RequestGate,
    rx: Option<oneshot::Receiver<()>>,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            rx.close();
            if rx.try_recv().is_ok() {
                self.gate.release();
            }
        }
    }
}
