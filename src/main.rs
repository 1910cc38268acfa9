use std::sync::Arc;

use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;

use appeal_bot::{bootstrap, config::AppConfig, routes, state::AppState, vk::VkClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "callback-server",
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        vk_group_id = config.vk_group_id,
        secret_enabled = config.vk_secret.is_some(),
        managers = config.managers.len(),
        "loaded bot configuration"
    );

    let store = bootstrap::prepare_store(&config).await?;
    let messenger = Arc::new(VkClient::from_config(&config));
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let state = AppState::new(config, store, messenger);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "callback server listening");
    axum::serve(listener, routes::create_router(state))
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            tracing::info!("callback server received shutdown signal");
        })
        .await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
