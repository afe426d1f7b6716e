//! Outbound send pipeline.
//!
//! [`SendPipeline::send`] queues a message together with one continuation.
//! A single writer task hands messages to the channel in queue order and
//! delivers each outcome back onto the lane as a [`SendResult`]. The
//! continuation is an `FnOnce` that is moved exactly once, so it observes
//! exactly one outcome.
//!
//! If the lane's owner is gone by the time a send resolves, the outcome is
//! dropped together with its continuation.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{ChannelError, OutboundMessage, SensorChannel};
use crate::lane::WeakLane;

/// Outcome of one send.
pub type SendResult = Result<(), ChannelError>;

type Continuation<S> = Box<dyn FnOnce(&mut S, SendResult) + Send + 'static>;

struct PendingSend<S> {
    message: OutboundMessage,
    continuation: Continuation<S>,
}

/// FIFO outbound queue whose completions run on a lane.
pub struct SendPipeline<S> {
    tx: mpsc::UnboundedSender<PendingSend<S>>,
}

impl<S: Send + 'static> SendPipeline<S> {
    /// Spawn the writer task for `channel`, completing onto `lane`.
    pub fn spawn<C: SensorChannel>(channel: Arc<C>, lane: WeakLane<S>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PendingSend<S>>();

        tokio::spawn(async move {
            while let Some(pending) = rx.recv().await {
                let kind = pending.message.kind();
                let result = channel.send(pending.message).await;
                let continuation = pending.continuation;

                if !lane.dispatch(move |state: &mut S| continuation(state, result)) {
                    tracing::trace!(kind, "Lane gone, dropping send completion");
                }
            }
        });

        Self { tx }
    }

    /// Queue `message`; `continuation` runs on the lane with the outcome.
    pub fn send<M, F>(&self, message: M, continuation: F)
    where
        M: Into<OutboundMessage>,
        F: FnOnce(&mut S, SendResult) + Send + 'static,
    {
        let pending = PendingSend {
            message: message.into(),
            continuation: Box::new(continuation),
        };

        if let Err(mpsc::error::SendError(pending)) = self.tx.send(pending) {
            tracing::debug!(
                kind = pending.message.kind(),
                "Send pipeline writer gone, message dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::messages::{SensorEventIndication, SensorStartResponse, Status};
    use crate::channel::{ChannelId, InboundMessage};
    use crate::lane::Lane;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<OutboundMessage>>,
        fail: AtomicBool,
    }

    impl SensorChannel for RecordingChannel {
        fn id(&self) -> ChannelId {
            ChannelId::SENSOR
        }

        async fn receive(&self) -> Result<InboundMessage, ChannelError> {
            std::future::pending().await
        }

        async fn send(&self, message: OutboundMessage) -> SendResult {
            tokio::task::yield_now().await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(ChannelError::Transport("link down".to_string()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Outcomes {
        results: Vec<(u32, SendResult)>,
    }

    async fn snapshot(lane: &Lane<Outcomes>) -> Vec<(u32, SendResult)> {
        let (tx, rx) = oneshot::channel();
        lane.dispatch(move |o: &mut Outcomes| {
            let _ = tx.send(o.results.clone());
        });
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn test_success_delivered_once_per_send_in_order() {
        let channel = Arc::new(RecordingChannel::default());
        let (lane, _handle) = Lane::spawn_with(|_| Outcomes::default());
        let pipeline = SendPipeline::spawn(Arc::clone(&channel), lane.downgrade());

        for tag in 0..5u32 {
            pipeline.send(
                SensorEventIndication::night_mode(tag % 2 == 0),
                move |o: &mut Outcomes, result| o.results.push((tag, result)),
            );
        }

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let results = snapshot(&lane).await;

        assert_eq!(
            results,
            (0..5).map(|tag| (tag, Ok(()))).collect::<Vec<_>>()
        );
        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 5);
        assert_eq!(
            sent[0],
            OutboundMessage::from(SensorEventIndication::night_mode(true))
        );
    }

    #[tokio::test]
    async fn test_failure_reaches_continuation() {
        let channel = Arc::new(RecordingChannel::default());
        channel.fail.store(true, Ordering::SeqCst);
        let (lane, _handle) = Lane::spawn_with(|_| Outcomes::default());
        let pipeline = SendPipeline::spawn(Arc::clone(&channel), lane.downgrade());

        pipeline.send(
            SensorStartResponse { status: Status::Ok },
            |o: &mut Outcomes, result| o.results.push((7, result)),
        );

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let results = snapshot(&lane).await;

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            (7, Err(ChannelError::Transport(ref reason))) if reason == "link down"
        ));
        assert!(channel.sent.lock().unwrap().is_empty());
    }
}
