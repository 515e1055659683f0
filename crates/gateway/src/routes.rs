use {
    axum::{
        Json,
        extract::{Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    charla_queue::{PushEnvelope, QueueEnvelope, QueueMessage},
    charla_store::{Device, MessageRecord},
    charla_whatsapp::{envelope::EventValue, extract_value, verify_subscription},
    serde::Deserialize,
    serde_json::{Value, json},
    tracing::{error, info},
};

use crate::server::{AppState, Gateway};

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Subscription handshake query, as sent by the platform.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode:         Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge:    Option<String>,
}

/// `GET /webhook`: echo the challenge when the verify token matches.
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    if params.mode.is_none() || params.verify_token.is_none() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "success": false }))).into_response();
    }
    match verify_subscription(
        params.mode.as_deref(),
        params.verify_token.as_deref(),
        params.challenge.as_deref(),
        &state.gateway.verify_token,
    ) {
        Some(challenge) => {
            info!("webhook subscription verified");
            (StatusCode::OK, challenge).into_response()
        },
        None => (StatusCode::FORBIDDEN, Json(json!({ "success": false }))).into_response(),
    }
}

/// `POST /webhook`: ingest one inbound event and run it through the
/// registration dialogue or hand it to the work queue.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Response {
    let Some(value) = extract_value(&payload) else {
        return webhook_bad_request("no messages in payload");
    };
    let event: EventValue = match serde_json::from_value(value.clone()) {
        Ok(event) => event,
        Err(e) => return webhook_bad_request(&format!("malformed event: {e}")),
    };
    if event.messages.is_empty() {
        return webhook_bad_request("no messages in payload");
    }

    match handle_event(&state.gateway, value, &event).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => {
            error!(error = %e, "webhook processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        },
    }
}

fn webhook_bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}

async fn handle_event(gateway: &Gateway, raw_value: &Value, event: &EventValue) -> anyhow::Result<()> {
    let message = &event.messages[0];
    let phone_number = message.from.as_str();
    let business_id = event.metadata.phone_number_id.as_str();
    let caption = message.caption();
    info!(
        phone_number,
        kind = %message.kind,
        message_id = %message.id,
        "inbound message"
    );

    let mut device = Device::fetch_or_create(&gateway.store, phone_number).await?;
    device.touch();
    device.save(&gateway.store).await?;

    let mut envelope = QueueEnvelope {
        message: QueueMessage {
            id: message.id.clone(),
            from: phone_number.to_owned(),
            kind: message.kind.clone(),
            caption,
            media_id: message.media().map(|(_, body)| body.id.clone()),
        },
        value: raw_value.clone(),
        phone_business_id: business_id.to_owned(),
        media: None,
    };

    if let Some((kind, body)) = message.media() {
        envelope.media = gateway
            .ingestor
            .ingest(phone_number, device.user_id.clone(), kind, body)
            .await?;
    }

    MessageRecord::new(&message.id, device.user_id.clone(), raw_value.clone())
        .create(&gateway.store)
        .await?;

    gateway.flow.dispatch(&mut device, &envelope).await?;
    Ok(())
}

/// `POST /queue`: push delivery from the work queue broker.
pub async fn receive_queue_push(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Response {
    if payload.is_null() {
        return queue_error(StatusCode::BAD_REQUEST, "No Pub/Sub message received");
    }
    let Some(message) = payload.get("message") else {
        return queue_error(StatusCode::BAD_REQUEST, "Invalid Pub/Sub message format");
    };
    if message.get("data").is_none() {
        return queue_error(StatusCode::BAD_REQUEST, "No data in message");
    }

    let push: PushEnvelope = match serde_json::from_value(payload.clone()) {
        Ok(push) => push,
        Err(e) => return queue_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    };
    let envelope = match QueueEnvelope::decode_push(&push) {
        Ok(envelope) => envelope,
        Err(e) => return queue_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    };

    match state.gateway.processor.process(&envelope).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(charla_media::Error::InvalidEnvelope { message }) => {
            queue_error(StatusCode::BAD_REQUEST, &message)
        },
        Err(e) => {
            error!(error = %e, "queue envelope processing failed");
            queue_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        },
    }
}

fn queue_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "status": "error", "message": message })),
    )
        .into_response()
}
