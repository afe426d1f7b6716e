//! Repeating jobs on a lane.
//!
//! A [`PeriodicJob`] runs a function on a lane, waits for that run to
//! finish, sleeps for the period, and repeats. The period is measured from
//! the end of one run to the start of the next, so drift accumulates under
//! load instead of runs bunching up.
//!
//! Two things end the chain:
//! - the job's own cancellation token (the job was replaced or dropped)
//! - the shared [`StopFlag`], raised cooperatively from any thread
//!
//! Both are checked before every run. Neither interrupts a sleep already in
//! progress.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::WeakLane;

/// Cooperative stop signal shared between a service handle and its lane.
///
/// Raising the flag is a plain atomic store; the lane observes it the next
/// time it decides whether to reschedule. It is not a barrier.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A cancellable repeating job registered with a lane.
pub struct PeriodicJob {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicJob {
    /// Start a chain of runs of `run` on `lane`, the first one `period`
    /// from now.
    pub fn spawn<S>(lane: WeakLane<S>, period: Duration, stop: StopFlag, run: fn(&mut S)) -> Self
    where
        S: Send + 'static,
    {
        let token = CancellationToken::new();
        let job_token = token.clone();

        let handle = tokio::spawn(async move {
            tracing::debug!(period_ms = period.as_millis() as u64, "Poll job started");

            loop {
                tokio::time::sleep(period).await;

                if job_token.is_cancelled() || stop.is_raised() {
                    break;
                }

                let (done_tx, done_rx) = oneshot::channel::<()>();
                let queued = lane.dispatch(move |state: &mut S| {
                    run(state);
                    let _ = done_tx.send(());
                });
                if !queued || done_rx.await.is_err() {
                    break;
                }

                if stop.is_raised() {
                    break;
                }
            }

            tracing::debug!("Poll job stopped");
        });

        Self { token, handle }
    }

    /// Mark the job cancelled; the chain ends before its next run.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[cfg(test)]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the job's task has exited.
    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PeriodicJob {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lane::Lane;

    #[derive(Default)]
    struct Counter {
        runs: u32,
    }

    fn bump(counter: &mut Counter) {
        counter.runs += 1;
    }

    async fn read_runs(lane: &Lane<Counter>) -> u32 {
        let (tx, rx) = oneshot::channel();
        lane.dispatch(move |counter: &mut Counter| {
            let _ = tx.send(counter.runs);
        });
        rx.await.unwrap()
    }

    #[test]
    fn test_stop_flag_round_trip() {
        let flag = StopFlag::new();
        assert!(!flag.is_raised());

        let shared = flag.clone();
        shared.raise();
        assert!(flag.is_raised());

        flag.clear();
        assert!(!shared.is_raised());
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_once_per_period() {
        let (lane, _handle) = Lane::spawn_with(|_| Counter::default());
        let _job = PeriodicJob::spawn(
            lane.downgrade(),
            Duration::from_millis(250),
            StopFlag::new(),
            bump,
        );

        tokio::time::sleep(Duration::from_millis(1010)).await;
        assert_eq!(read_runs(&lane).await, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_flag_ends_chain() {
        let (lane, _handle) = Lane::spawn_with(|_| Counter::default());
        let stop = StopFlag::new();
        let job = PeriodicJob::spawn(
            lane.downgrade(),
            Duration::from_millis(250),
            stop.clone(),
            bump,
        );

        tokio::time::sleep(Duration::from_millis(600)).await;
        stop.raise();
        let runs_at_stop = read_runs(&lane).await;

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(read_runs(&lane).await <= runs_at_stop + 1);
        assert!(job.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_ends_chain_without_stop_flag() {
        let (lane, _handle) = Lane::spawn_with(|_| Counter::default());
        let job = PeriodicJob::spawn(
            lane.downgrade(),
            Duration::from_millis(100),
            StopFlag::new(),
            bump,
        );

        tokio::time::sleep(Duration::from_millis(250)).await;
        job.cancel();
        assert!(job.is_cancelled());
        let runs_at_cancel = read_runs(&lane).await;

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(read_runs(&lane).await, runs_at_cancel);
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_exits_when_lane_owner_dropped() {
        let (lane, lane_handle) = Lane::spawn_with(|_| Counter::default());
        let job = PeriodicJob::spawn(
            lane.downgrade(),
            Duration::from_millis(50),
            StopFlag::new(),
            bump,
        );

        drop(lane);
        lane_handle.await.unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(job.is_finished());
    }
}
