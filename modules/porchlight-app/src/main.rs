use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use porchlight_events::EventWriter;
use porchlight_web::SessionStore;

use porchlight_app::config::Config;
use porchlight_app::state::AppState;
use porchlight_app::stores::{MemoryUserStore, UserStore};
use porchlight_app::writer::{JsonlEventWriter, MemoryEventWriter};
use porchlight_app::{routes, serve, stores};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("porchlight=info".parse()?))
        .init();

    let config = Config::from_env();

    let writer: Arc<dyn EventWriter> = match &config.events_path {
        Some(path) => {
            info!(path = %path.display(), "writing events to JSONL log");
            Arc::new(JsonlEventWriter::new(path))
        }
        None => {
            info!("no EVENTS_PATH configured, keeping events in memory");
            Arc::new(MemoryEventWriter::default())
        }
    };

    let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::default());
    let sessions: Arc<dyn SessionStore> = Arc::new(stores::MemorySessionStore::default());
    let state = AppState::new(users, sessions, writer);

    let router = routes::build_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.web_host, config.web_port).parse()?;
    serve::serve(router, addr).await
}
