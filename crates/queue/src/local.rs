use {
    async_trait::async_trait,
    tokio::sync::{Mutex, mpsc},
};

use crate::{Error, QueueEnvelope, QueuePublisher, Result};

/// In-process queue backed by an unbounded channel. Stands in for an
/// external broker in single-node deployments and in tests; envelopes still
/// make the full push-encoding round trip so the consumer exercises the
/// same wire shape either way.
pub struct LocalQueue {
    tx: mpsc::UnboundedSender<QueueEnvelope>,
}

pub struct LocalConsumer {
    rx: Mutex<mpsc::UnboundedReceiver<QueueEnvelope>>,
}

impl LocalQueue {
    #[must_use]
    pub fn new() -> (Self, LocalConsumer) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, LocalConsumer { rx: Mutex::new(rx) })
    }
}

impl LocalConsumer {
    /// Next envelope, or `None` once all publishers are dropped.
    pub async fn recv(&self) -> Option<QueueEnvelope> {
        self.rx.lock().await.recv().await
    }
}

#[async_trait]
impl QueuePublisher for LocalQueue {
    async fn publish(&self, envelope: QueueEnvelope) -> Result<()> {
        // Round-trip through the push encoding so local and brokered
        // deployments see identical payloads.
        let push = envelope.encode_push()?;
        let envelope = QueueEnvelope::decode_push(&push)?;
        self.tx.send(envelope).map_err(|_| Error::Closed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::QueueMessage;

    use super::*;

    fn envelope(id: &str) -> QueueEnvelope {
        QueueEnvelope {
            message: QueueMessage {
                id: id.into(),
                from: "5215550001".into(),
                kind: "text".into(),
                caption: "hola".into(),
                media_id: None,
            },
            value: json!({}),
            phone_business_id: "BIZ1".into(),
            media: None,
        }
    }

    #[tokio::test]
    async fn publish_preserves_order() {
        let (queue, consumer) = LocalQueue::new();
        queue.publish(envelope("wamid.1")).await.unwrap();
        queue.publish(envelope("wamid.2")).await.unwrap();

        assert_eq!(consumer.recv().await.unwrap().message.id, "wamid.1");
        assert_eq!(consumer.recv().await.unwrap().message.id, "wamid.2");
    }

    #[tokio::test]
    async fn recv_ends_when_publisher_drops() {
        let (queue, consumer) = LocalQueue::new();
        drop(queue);
        assert!(consumer.recv().await.is_none());
    }

    #[tokio::test]
    async fn publish_after_consumer_drop_is_closed() {
        let (queue, consumer) = LocalQueue::new();
        drop(consumer);
        let err = queue.publish(envelope("wamid.1")).await.unwrap_err();
        assert!(matches!(err, Error::Closed));
    }
}
