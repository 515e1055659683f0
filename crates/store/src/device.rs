use std::sync::Arc;

use {
    charla_common::now_epoch,
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

use crate::{Result, store::{DocumentStore, collections}};

/// Steps of the registration dialogue. `GeneralInteraction` is reserved for
/// future non-registration flows and is never reached by the registration
/// path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowState {
    #[default]
    Initial,
    AwaitingEmail,
    AwaitingName,
    AwaitingPin,
    Authenticated,
    GeneralInteraction,
}

/// Per-phone-number conversational session record. Created on the first
/// inbound event from an unseen number, mutated on every event, never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub phone_number: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub last_active: i64,
    #[serde(default)]
    pub flow_state: FlowState,
    /// Scratch storage across flow steps. Only the narrow accessors below
    /// read or write it; each key belongs to exactly one state transition.
    #[serde(default)]
    pub context: Map<String, Value>,
}

const CTX_EMAIL: &str = "email";
const CTX_NAME: &str = "name";
const CTX_PIN: &str = "pin";

impl Device {
    #[must_use]
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            user_id: None,
            last_active: now_epoch(),
            flow_state: FlowState::Initial,
            context: Map::new(),
        }
    }

    pub async fn fetch(store: &Arc<dyn DocumentStore>, phone_number: &str) -> Result<Option<Self>> {
        let Some(doc) = store.get(collections::DEVICES, phone_number).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(doc)?))
    }

    /// Fetch the device for `phone_number`, creating and persisting a fresh
    /// `Initial` record when the number has never been seen.
    pub async fn fetch_or_create(
        store: &Arc<dyn DocumentStore>,
        phone_number: &str,
    ) -> Result<Self> {
        if let Some(device) = Self::fetch(store, phone_number).await? {
            return Ok(device);
        }
        let device = Self::new(phone_number);
        device.save(store).await?;
        Ok(device)
    }

    pub async fn save(&self, store: &Arc<dyn DocumentStore>) -> Result<()> {
        store
            .set(
                collections::DEVICES,
                &self.phone_number,
                serde_json::to_value(self)?,
            )
            .await
    }

    /// Refresh the last-active timestamp.
    pub fn touch(&mut self) {
        self.last_active = now_epoch();
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some() && self.flow_state == FlowState::Authenticated
    }

    fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.context_str(CTX_EMAIL)
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.context.insert(CTX_EMAIL.into(), Value::String(email.into()));
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.context_str(CTX_NAME)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.context.insert(CTX_NAME.into(), Value::String(name.into()));
    }

    #[must_use]
    pub fn pin(&self) -> Option<&str> {
        self.context_str(CTX_PIN)
    }

    pub fn set_pin(&mut self, pin: impl Into<String>) {
        self.context.insert(CTX_PIN.into(), Value::String(pin.into()));
    }
}
