use std::sync::Arc;

use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::{Result, store::{DocumentStore, collections}};

/// One inbound platform message, stored under the platform's message id.
/// Written once per event and read back only by the back-reference resolver;
/// the message id is the sole join key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Full platform envelope (`value`) for the event that carried this
    /// message.
    pub value: Value,
}

impl MessageRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, user_id: Option<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            user_id,
            value,
        }
    }

    /// Persist the record, overwriting any previous document under the same
    /// message id.
    pub async fn create(&self, store: &Arc<dyn DocumentStore>) -> Result<()> {
        store
            .set(collections::MESSAGES, &self.id, serde_json::to_value(self)?)
            .await
    }

    /// Merge this record into an existing document. Fails when the record was
    /// never created; update never silently becomes create.
    pub async fn update(&self, store: &Arc<dyn DocumentStore>) -> Result<()> {
        store
            .update(collections::MESSAGES, &self.id, serde_json::to_value(self)?)
            .await?;
        Ok(())
    }

    pub async fn fetch(store: &Arc<dyn DocumentStore>, id: &str) -> Result<Option<Self>> {
        let Some(doc) = store.get(collections::MESSAGES, id).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(doc)?))
    }
}
