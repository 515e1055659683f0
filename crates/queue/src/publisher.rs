use async_trait::async_trait;

use crate::{QueueEnvelope, Result};

/// Producer side of the work queue. Publishing must not block on the
/// consumer; delivery is at-least-once and the processor tolerates
/// duplicates.
#[async_trait]
pub trait QueuePublisher: Send + Sync {
    async fn publish(&self, envelope: QueueEnvelope) -> Result<()>;
}
