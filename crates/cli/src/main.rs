use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use {
    charla_gateway::{AppState, Gateway},
    charla_media::{FsObjectStore, MediaProcessor, ObjectStore, UnconfiguredVision, VisionClient},
    charla_queue::LocalQueue,
    charla_store::{DocumentStore, MemoryStore},
    charla_whatsapp::{ChannelClient, GraphClient, client::DEFAULT_API_BASE},
    clap::Parser,
    secrecy::Secret,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "charla", about = "Charla — conversational WhatsApp gateway")]
struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "CHARLA_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Webhook subscription verify token.
    #[arg(long, env = "VERIFY_TOKEN")]
    verify_token: String,

    /// Access token for the messaging platform API.
    #[arg(long, env = "WHATSAPP_ACCESS_TOKEN")]
    access_token: String,

    /// Base URL of the messaging platform API.
    #[arg(long, env = "GRAPH_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Root directory for stored attachments.
    #[arg(long, env = "CHARLA_MEDIA_ROOT", default_value = "./data/media")]
    media_root: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "charla starting");

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let objects: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(&cli.media_root));
    let vision: Arc<dyn VisionClient> = Arc::new(UnconfiguredVision);
    let channel: Arc<dyn ChannelClient> = Arc::new(GraphClient::with_api_base(
        Secret::new(cli.access_token.clone()),
        &cli.api_base,
    ));

    // In-process queue: the consumer below plays the role of the push
    // subscription hitting POST /queue in brokered deployments.
    let (queue, consumer) = LocalQueue::new();
    let processor = MediaProcessor::new(
        store.clone(),
        objects.clone(),
        vision.clone(),
        channel.clone(),
    );
    tokio::spawn(async move {
        while let Some(envelope) = consumer.recv().await {
            if let Err(e) = processor.process(&envelope).await {
                warn!(message_id = %envelope.message.id, error = %e, "queue envelope failed");
            }
        }
    });

    let gateway = Gateway::new(
        store,
        channel,
        objects,
        vision,
        Arc::new(queue),
        cli.verify_token.clone(),
    );
    let state = AppState {
        gateway: Arc::new(gateway),
    };

    charla_gateway::serve(cli.bind, state).await?;
    Ok(())
}
