use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::{Context, Result};
use bot::{
    Data,
    config::{Config, QuoteBackend},
    server::routes,
};
use stock::{AlpacaClient, Desk, IexClient, KeyValueStore, MemoryStore, QuoteSource, RedisStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    let store: Arc<dyn KeyValueStore> = match &config.redis_url {
        Some(url) => Arc::new(
            RedisStore::new(url, config.redis_key_prefix.clone())
                .await
                .context("init redis store failed")?,
        ),
        None => {
            warn!("REDIS_URL not set; watch lists and accounts are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let timeout = config.quote_timeout();
    let quotes: Arc<dyn QuoteSource> = match config.quote_backend {
        QuoteBackend::Iex => {
            Arc::new(IexClient::from_env(timeout).context("init iex client failed")?)
        }
        QuoteBackend::Alpaca => {
            Arc::new(AlpacaClient::from_env(timeout).context("init alpaca client failed")?)
        }
    };

    let data = web::Data::new(Data {
        desk: Desk::new(store, quotes),
        support_email: config.support_email.clone(),
    });

    info!(
        host = %config.host,
        port = config.port,
        backend = ?config.quote_backend,
        "listening"
    );

    let allowed_host = config.allowed_host.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(routes(allowed_host.clone()))
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server
        .bind((config.host.as_str(), config.port))?
        .run()
        .await?;

    info!("Shutdown complete.");
    Ok(())
}
