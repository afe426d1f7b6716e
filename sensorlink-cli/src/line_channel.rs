//! Line-delimited JSON sensor channel.
//!
//! Each inbound line is one [`InboundMessage`]; each outbound message is
//! written as one line of JSON and flushed. The `run` command binds this to
//! stdin/stdout so the service can be driven from a pipe:
//!
//! ```text
//! {"type":"channel_open_request","priority":0,"channel_id":2}
//! {"type":"sensor_start_request","sensor_type":13}
//! ```

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use sensorlink::channel::{
    ChannelError, ChannelId, InboundMessage, OutboundMessage, SendResult, SensorChannel,
};

/// Sensor channel over a line-oriented reader/writer pair.
pub struct LineChannel<R, W> {
    id: ChannelId,
    reader: Mutex<R>,
    writer: Mutex<W>,
    closed: CancellationToken,
}

/// Channel bound to the process's stdin and stdout.
pub type StdioChannel = LineChannel<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioChannel {
    pub fn stdio(id: ChannelId) -> Self {
        Self::new(id, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineChannel<R, W> {
    pub fn new(id: ChannelId, reader: R, writer: W) -> Self {
        Self {
            id,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            closed: CancellationToken::new(),
        }
    }

    /// Resolves once the reader hit end of input.
    pub async fn closed(&self) {
        self.closed.cancelled().await
    }
}

impl<R, W> SensorChannel for LineChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn id(&self) -> ChannelId {
        self.id
    }

    async fn receive(&self) -> Result<InboundMessage, ChannelError> {
        let mut reader = self.reader.lock().await;
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                self.closed.cancel();
                return Err(ChannelError::Closed);
            }

            let text = line.trim();
            if text.is_empty() {
                continue;
            }

            match serde_json::from_str::<InboundMessage>(text) {
                Ok(message) => {
                    trace!(?message, "Inbound message");
                    return Ok(message);
                }
                Err(e) => warn!(error = %e, line = text, "Skipping malformed input line"),
            }
        }
    }

    async fn send(&self, message: OutboundMessage) -> SendResult {
        let mut line =
            serde_json::to_vec(&message).map_err(|e| ChannelError::Transport(e.to_string()))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorlink::channel::messages::{
        ChannelOpenRequest, SensorEventIndication, SensorStartRequest, SensorType,
    };

    fn channel(input: &'static str) -> LineChannel<BufReader<&'static [u8]>, Vec<u8>> {
        LineChannel::new(
            ChannelId::SENSOR,
            BufReader::new(input.as_bytes()),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_receive_skips_blank_and_malformed_lines() {
        let channel = channel(
            "\n\
             not json\n\
             {\"type\":\"channel_open_request\",\"priority\":3,\"channel_id\":2}\n\
             {\"type\":\"sensor_start_request\",\"sensor_type\":10}\n",
        );

        assert_eq!(
            channel.receive().await,
            Ok(InboundMessage::ChannelOpenRequest(ChannelOpenRequest {
                priority: 3,
                channel_id: 2,
            }))
        );
        assert_eq!(
            channel.receive().await,
            Ok(InboundMessage::SensorStartRequest(SensorStartRequest::new(
                SensorType::NightData
            )))
        );
    }

    #[tokio::test]
    async fn test_end_of_input_closes_channel() {
        let channel = channel("");

        assert_eq!(channel.receive().await, Err(ChannelError::Closed));
        // Already closed: resolves immediately
        channel.closed().await;
    }

    #[tokio::test]
    async fn test_send_writes_one_line_per_message() {
        let channel = channel("");

        channel
            .send(SensorEventIndication::night_mode(true).into())
            .await
            .unwrap();
        channel
            .send(SensorEventIndication::night_mode(false).into())
            .await
            .unwrap();

        let written = String::from_utf8(channel.writer.lock().await.clone()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: OutboundMessage = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, SensorEventIndication::night_mode(true).into());
        assert!(lines[0].contains("\"type\":\"sensor_event_indication\""));
    }
}
