//! Trait abstraction for telemetry publishing to enable testing

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::message::TelemetryMessage;

/// Trait for telemetry sink operations
#[async_trait]
pub trait Publisher: Send {
    /// Publish one message
    async fn publish(&mut self, message: &TelemetryMessage) -> io::Result<()>;

    /// Flush anything buffered
    async fn flush(&mut self) -> io::Result<()>;
}

/// JSON-lines record written for each message
#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    topic: &'a str,
    payload: &'a str,
}

/// Writes one JSON object per message to any async writer.
///
/// Writes are awaited, so a stalled pipe parks the task instead of blocking
/// the runtime thread.
///
/// ```text
/// {"timestamp":"2024-05-01T12:00:00.000Z","topic":"pylontech/sensor/grid_battery/soc","payload":"76"}
/// ```
pub struct JsonLinesPublisher<W: AsyncWrite + Unpin + Send> {
    writer: W,
    published: u64,
}

impl<W: AsyncWrite + Unpin + Send> std::fmt::Debug for JsonLinesPublisher<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesPublisher")
            .field("published", &self.published)
            .finish_non_exhaustive()
    }
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesPublisher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            published: 0,
        }
    }

    /// Total number of messages written so far
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Publisher for JsonLinesPublisher<W> {
    async fn publish(&mut self, message: &TelemetryMessage) -> io::Result<()> {
        let line = JsonLine {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            topic: &message.topic,
            payload: &message.payload,
        };

        let mut bytes = serde_json::to_vec(&line)?;
        bytes.push(b'\n');

        self.writer.write_all(&bytes).await?;
        self.published += 1;
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.writer.flush().await
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock publisher for testing
    #[derive(Clone)]
    pub struct MockPublisher {
        pub messages: Arc<Mutex<Vec<TelemetryMessage>>>,
        pub publish_error: Arc<Mutex<Option<io::ErrorKind>>>,
        pub flush_count: Arc<Mutex<usize>>,
    }

    impl MockPublisher {
        pub fn new() -> Self {
            Self {
                messages: Arc::new(Mutex::new(Vec::new())),
                publish_error: Arc::new(Mutex::new(None)),
                flush_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn get_messages(&self) -> Vec<TelemetryMessage> {
            self.messages.lock().unwrap().clone()
        }

        pub fn set_publish_error(&self, error: io::ErrorKind) {
            *self.publish_error.lock().unwrap() = Some(error);
        }

        pub fn flush_count(&self) -> usize {
            *self.flush_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl Publisher for MockPublisher {
        async fn publish(&mut self, message: &TelemetryMessage) -> io::Result<()> {
            if let Some(error) = *self.publish_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock publish error"));
            }
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn flush(&mut self) -> io::Result<()> {
            *self.flush_count.lock().unwrap() += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_one_json_object_per_line() {
        let mut publisher = JsonLinesPublisher::new(Vec::new());

        publisher.publish(&TelemetryMessage::new("bms/soc", "76")).await.unwrap();
        publisher.publish(&TelemetryMessage::new("bms/baseState", "Alarm!")).await.unwrap();
        publisher.flush().await.unwrap();
        assert_eq!(publisher.published(), 2);

        let output = String::from_utf8(publisher.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["topic"], "bms/soc");
        assert_eq!(first["payload"], "76");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["payload"], "Alarm!");
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let mut publisher = JsonLinesPublisher::new(Vec::new());
        tokio_test::block_on(publisher.publish(&TelemetryMessage::new("bms/soc", "50"))).unwrap();

        let output = String::from_utf8(publisher.into_inner()).unwrap();
        let line: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
        let timestamp = line["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_publishes_through_async_pipe() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut publisher = JsonLinesPublisher::new(client);

        // Pipe buffer is smaller than one line, the reader drains it concurrently
        let reader = tokio::spawn(async move {
            let mut output = Vec::new();
            tokio::io::AsyncReadExt::read_to_end(&mut server, &mut output).await.unwrap();
            output
        });

        publisher
            .publish(&TelemetryMessage::new("pylontech/sensor/grid_battery/powerOUT", "57.60"))
            .await
            .unwrap();
        publisher.flush().await.unwrap();
        drop(publisher.into_inner());

        let output = String::from_utf8(reader.await.unwrap()).unwrap();
        let line: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
        assert_eq!(line["topic"], "pylontech/sensor/grid_battery/powerOUT");
        assert_eq!(line["payload"], "57.60");
    }

    #[tokio::test]
    async fn test_mock_publisher_records_messages() {
        let mock = mocks::MockPublisher::new();
        let mut publisher = mock.clone();

        publisher.publish(&TelemetryMessage::new("a", "1")).await.unwrap();
        publisher.flush().await.unwrap();

        assert_eq!(mock.get_messages(), vec![TelemetryMessage::new("a", "1")]);
        assert_eq!(mock.flush_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_publisher_error() {
        let mut mock = mocks::MockPublisher::new();
        mock.set_publish_error(io::ErrorKind::BrokenPipe);

        let result = mock.publish(&TelemetryMessage::new("a", "1")).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }
}
