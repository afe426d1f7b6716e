//! Serialized execution lane.
//!
//! A [`Lane`] owns a piece of state and runs closures against it one at a
//! time, in the order they were dispatched. It is the strand every sensor
//! service operation runs on: request handlers, poll ticks and send
//! completions never overlap because they are all queued here.
//!
//! # Ownership
//!
//! ```text
//! SensorService ──(strong)──► Lane<S> ──► mpsc queue ──► lane task (owns S)
//!                                           ▲
//!        receive task / send writer / poll job ──(weak)──┘
//! ```
//!
//! Only the owner holds a strong [`Lane`]. Deferred work holds a
//! [`WeakLane`] and checks liveness on every dispatch; once the owner is
//! dropped the queue drains, the state is dropped, and later dispatches are
//! refused instead of touching freed state.

mod periodic;

pub use periodic::{PeriodicJob, StopFlag};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A unit of work queued on a lane.
type LaneTask<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// Strong handle to a serialized execution lane.
///
/// Dropping the last `Lane` closes the queue. Tasks already queued still
/// run; the state is dropped after the final one.
pub struct Lane<S> {
    tx: mpsc::UnboundedSender<LaneTask<S>>,
}

impl<S: Send + 'static> Lane<S> {
    /// Spawn a lane task owning the state produced by `build`.
    ///
    /// `build` receives a weak handle to the lane being created so the state
    /// can schedule work onto itself later. Must be called from inside a
    /// tokio runtime.
    pub fn spawn_with<F>(build: F) -> (Self, JoinHandle<()>)
    where
        F: FnOnce(WeakLane<S>) -> S,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<LaneTask<S>>();
        let mut state = build(WeakLane {
            tx: tx.downgrade(),
        });

        let handle = tokio::spawn(async move {
            while let Some(task) = rx.recv().await {
                task(&mut state);
            }
            tracing::trace!("Lane queue closed, releasing state");
        });

        (Self { tx }, handle)
    }

    /// Queue `task` to run on the lane.
    ///
    /// Returns `false` if the lane task has already exited.
    pub fn dispatch<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.tx.send(Box::new(task)).is_ok()
    }

    /// Create a weak handle that does not keep the lane alive.
    pub fn downgrade(&self) -> WeakLane<S> {
        WeakLane {
            tx: self.tx.downgrade(),
        }
    }
}

/// Weak handle to a lane.
///
/// Used by everything that outlives a single dispatch: spawned receive
/// tasks, the send writer, the poll job.
pub struct WeakLane<S> {
    tx: mpsc::WeakUnboundedSender<LaneTask<S>>,
}

impl<S> Clone for WeakLane<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S: Send + 'static> WeakLane<S> {
    /// Queue `task` if the lane's owner is still alive.
    ///
    /// Returns `false` (and drops the task) when the owner is gone.
    pub fn dispatch<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        match self.tx.upgrade() {
            Some(tx) => tx.send(Box::new(task)).is_ok(),
            None => false,
        }
    }

    /// Whether the lane's owner still exists.
    #[cfg(test)]
    pub(crate) fn is_alive(&self) -> bool {
        self.tx.upgrade().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_tasks_run_in_dispatch_order() {
        let (lane, _handle) = Lane::spawn_with(|_| Vec::<u32>::new());

        for i in 0..10 {
            assert!(lane.dispatch(move |log: &mut Vec<u32>| log.push(i)));
        }

        let (tx, rx) = oneshot::channel();
        lane.dispatch(move |log: &mut Vec<u32>| {
            let _ = tx.send(log.clone());
        });

        assert_eq!(rx.await.unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_tasks_never_overlap() {
        struct Probe {
            in_flight: Arc<AtomicUsize>,
            max_seen: Arc<AtomicUsize>,
        }

        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let (lane, _handle) = Lane::spawn_with(|_| Probe {
            in_flight: Arc::clone(&in_flight),
            max_seen: Arc::clone(&max_seen),
        });
        let weak = lane.downgrade();

        let mut producers = Vec::new();
        for _ in 0..8 {
            let weak = weak.clone();
            producers.push(tokio::spawn(async move {
                for _ in 0..50 {
                    weak.dispatch(|probe: &mut Probe| {
                        let now = probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        probe.max_seen.fetch_max(now, Ordering::SeqCst);
                        probe.in_flight.fetch_sub(1, Ordering::SeqCst);
                    });
                    tokio::task::yield_now().await;
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }

        let (tx, rx) = oneshot::channel();
        lane.dispatch(move |_: &mut Probe| {
            let _ = tx.send(());
        });
        rx.await.unwrap();

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_weak_dispatch_refused_after_owner_dropped() {
        let (lane, handle) = Lane::spawn_with(|_| 0u32);
        let weak = lane.downgrade();
        assert!(weak.is_alive());

        drop(lane);
        handle.await.unwrap();

        assert!(!weak.is_alive());
        assert!(!weak.dispatch(|count: &mut u32| *count += 1));
    }

    #[tokio::test]
    async fn test_state_can_schedule_onto_itself() {
        struct SelfScheduling {
            lane: WeakLane<SelfScheduling>,
            hops: u32,
            done: Option<oneshot::Sender<u32>>,
        }

        fn hop(state: &mut SelfScheduling) {
            state.hops += 1;
            if state.hops < 3 {
                state.lane.dispatch(hop);
            } else if let Some(done) = state.done.take() {
                let _ = done.send(state.hops);
            }
        }

        let (tx, rx) = oneshot::channel();
        let (lane, _handle) = Lane::spawn_with(|weak| SelfScheduling {
            lane: weak,
            hops: 0,
            done: Some(tx),
        });
        lane.dispatch(hop);

        assert_eq!(rx.await.unwrap(), 3);
    }
}
