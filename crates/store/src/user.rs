use std::sync::Arc;

use {
    charla_common::now_epoch,
    serde::{Deserialize, Serialize},
};

use crate::{Result, store::{DocumentStore, collections}};

/// A registered user. Created once when the registration dialogue reaches its
/// terminal confirmation step; immutable afterwards except for re-save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Shared secret used as a weak credential during registration.
    pub pin: String,
    pub created_at: i64,
}

impl User {
    /// Create and persist a new user under a generated id.
    pub async fn create(
        store: &Arc<dyn DocumentStore>,
        name: impl Into<String>,
        email: impl Into<String>,
        pin: impl Into<String>,
    ) -> Result<Self> {
        let user = Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            pin: pin.into(),
            created_at: now_epoch(),
        };
        store
            .set(collections::USERS, &user.id, serde_json::to_value(&user)?)
            .await?;
        Ok(user)
    }

    pub async fn fetch(store: &Arc<dyn DocumentStore>, id: &str) -> Result<Option<Self>> {
        let Some(doc) = store.get(collections::USERS, id).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(doc)?))
    }

    #[must_use]
    pub fn verify_pin(&self, pin: &str) -> bool {
        self.pin == pin
    }
}
