use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        routing::{get, post},
    },
    charla_flow::FlowEngine,
    charla_media::{MediaIngestor, MediaProcessor, ObjectStore, VisionClient},
    charla_queue::QueuePublisher,
    charla_store::DocumentStore,
    charla_whatsapp::ChannelClient,
    tracing::info,
};

use crate::routes;

/// Shared service wiring behind the HTTP handlers. Every external hand is an
/// injected trait object; tests swap them for in-memory doubles.
pub struct Gateway {
    pub store:        Arc<dyn DocumentStore>,
    pub channel:      Arc<dyn ChannelClient>,
    pub queue:        Arc<dyn QueuePublisher>,
    pub ingestor:     MediaIngestor,
    pub processor:    MediaProcessor,
    pub flow:         FlowEngine,
    pub verify_token: String,
}

impl Gateway {
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        channel: Arc<dyn ChannelClient>,
        objects: Arc<dyn ObjectStore>,
        vision: Arc<dyn VisionClient>,
        queue: Arc<dyn QueuePublisher>,
        verify_token: impl Into<String>,
    ) -> Self {
        let ingestor = MediaIngestor::new(channel.clone(), objects.clone(), store.clone());
        let processor =
            MediaProcessor::new(store.clone(), objects, vision, channel.clone());
        let flow = FlowEngine::new(store.clone(), channel.clone(), queue.clone());
        Self {
            store,
            channel,
            queue,
            ingestor,
            processor,
            flow,
            verify_token: verify_token.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/webhook",
            get(routes::verify_webhook).post(routes::receive_webhook),
        )
        .route("/queue", post(routes::receive_queue_push))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "gateway listening");
    axum::serve(listener, router(state)).await
}
