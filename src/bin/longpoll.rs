use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use appeal_bot::{
    bootstrap,
    config::AppConfig,
    vk::{longpoll::LongPoll, VkClient},
    MessageDispatcher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "longpoll",
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        vk_group_id = config.vk_group_id,
        wait_secs = config.vk_longpoll_wait,
        managers = config.managers.len(),
        "loaded bot configuration"
    );

    let store = bootstrap::prepare_store(&config).await?;
    let client = Arc::new(VkClient::from_config(&config));
    let dispatcher = Arc::new(MessageDispatcher::new(store, client.clone()));
    let longpoll = LongPoll::new(client, config.vk_group_id, config.vk_longpoll_wait);

    tokio::select! {
        result = longpoll.run(dispatcher) => result?,
        _ = signal::ctrl_c() => {
            tracing::info!("long poll received shutdown signal");
        }
    }

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
