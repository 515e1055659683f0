use std::sync::Arc;

use {
    charla_queue::{QueueEnvelope, QueuePublisher},
    charla_store::{Device, DocumentStore, FlowState, User},
    charla_whatsapp::ChannelClient,
    tracing::{debug, info},
};

use crate::{Result, pin::generate_pin, prompts};

/// Result of feeding one input into the registration dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Send this text back to the sender.
    Reply(String),
    /// The PIN matched: create the account, link it to the device, then
    /// confirm. The device is already in the authenticated state.
    Register {
        name:  String,
        email: String,
        pin:   String,
    },
    /// The device is past registration; the message belongs to the work
    /// queue, not the dialogue.
    Forward,
}

/// Advance the registration dialogue by one input. Pure over the device
/// record: every transition and context write happens here, every side
/// effect (persistence, sends, account creation) is the caller's.
pub fn advance(device: &mut Device, input: &str) -> FlowOutcome {
    match device.flow_state {
        FlowState::Initial => {
            if prompts::AFFIRMATIVES.contains(&input.trim().to_lowercase().as_str()) {
                device.flow_state = FlowState::AwaitingEmail;
                FlowOutcome::Reply(prompts::ASK_EMAIL.into())
            } else {
                FlowOutcome::Reply(prompts::ASK_REGISTER.into())
            }
        },
        FlowState::AwaitingEmail => {
            if input.contains('@') && input.contains('.') {
                device.set_email(input.trim().to_lowercase());
                device.flow_state = FlowState::AwaitingName;
                FlowOutcome::Reply(prompts::ASK_NAME.into())
            } else {
                FlowOutcome::Reply(prompts::INVALID_EMAIL.into())
            }
        },
        FlowState::AwaitingName => {
            let name = input.trim();
            if name.chars().count() > 2 {
                let email = device.email().unwrap_or("unknown_email").to_owned();
                let pin = generate_pin();
                info!(email, pin, "verification pin generated");
                device.set_name(name);
                device.set_pin(&pin);
                device.flow_state = FlowState::AwaitingPin;
                FlowOutcome::Reply(prompts::ask_pin(name, &email))
            } else {
                FlowOutcome::Reply(prompts::INVALID_NAME.into())
            }
        },
        FlowState::AwaitingPin => {
            if device.pin().is_some_and(|pin| pin == input.trim()) {
                let name = device.name().unwrap_or_default().to_owned();
                let email = device.email().unwrap_or_default().to_owned();
                let pin = device.pin().unwrap_or_default().to_owned();
                device.flow_state = FlowState::Authenticated;
                FlowOutcome::Register { name, email, pin }
            } else {
                FlowOutcome::Reply(prompts::PIN_MISMATCH.into())
            }
        },
        FlowState::Authenticated | FlowState::GeneralInteraction => FlowOutcome::Forward,
    }
}

/// Drives the dialogue against real storage, the outbound channel and the
/// work queue. One instance is shared by the webhook handler.
pub struct FlowEngine {
    store:   Arc<dyn DocumentStore>,
    channel: Arc<dyn ChannelClient>,
    queue:   Arc<dyn QueuePublisher>,
}

impl FlowEngine {
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        channel: Arc<dyn ChannelClient>,
        queue: Arc<dyn QueuePublisher>,
    ) -> Self {
        Self {
            store,
            channel,
            queue,
        }
    }

    /// Route one inbound message through the dialogue. Authenticated devices
    /// bypass the dialogue and forward to the work queue; the device record
    /// is always persisted before any reply goes out, so a send failure
    /// never loses a transition.
    pub async fn dispatch(&self, device: &mut Device, envelope: &QueueEnvelope) -> Result<()> {
        if device.flow_state == FlowState::Authenticated {
            return self.dispatch_authenticated(device, envelope).await;
        }
        if device.flow_state == FlowState::GeneralInteraction {
            debug!(phone_number = %device.phone_number, "general interaction state, no dialogue");
            return Ok(());
        }

        let to = device.phone_number.clone();
        match advance(device, &envelope.message.caption) {
            FlowOutcome::Reply(text) => {
                device.save(&self.store).await?;
                self.channel
                    .send_text(&to, &text, &envelope.phone_business_id)
                    .await?;
            },
            FlowOutcome::Register { name, email, pin } => {
                let user = User::create(&self.store, &name, &email, &pin).await?;
                device.user_id = Some(user.id.clone());
                device.save(&self.store).await?;
                self.channel
                    .send_text(
                        &to,
                        &prompts::registration_success(&user.name),
                        &envelope.phone_business_id,
                    )
                    .await?;
            },
            FlowOutcome::Forward => {},
        }
        Ok(())
    }

    /// An authenticated device whose user record has disappeared is reset to
    /// the start of the dialogue; otherwise the message goes to the queue.
    async fn dispatch_authenticated(
        &self,
        device: &mut Device,
        envelope: &QueueEnvelope,
    ) -> Result<()> {
        let user = match &device.user_id {
            Some(user_id) => User::fetch(&self.store, user_id).await?,
            None => None,
        };
        if user.is_none() {
            device.flow_state = FlowState::Initial;
            device.user_id = None;
            device.save(&self.store).await?;
            self.channel
                .send_text(
                    &device.phone_number,
                    prompts::ACCOUNT_GONE,
                    &envelope.phone_business_id,
                )
                .await?;
            return Ok(());
        }
        self.queue.publish(envelope.clone()).await?;
        Ok(())
    }
}
