//! Startup: schema creation and manager reconciliation.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::{AppConfig, ManagerConfig};
use crate::db;
use crate::error::GatewayResult;
use crate::models::NewManager;
use crate::store::{AppealStore, PgStore};

/// Inserts every configured manager whose `vk_id` is not stored yet. Existing
/// rows are left untouched. Returns the number of inserted managers.
pub async fn sync_managers(
    store: &dyn AppealStore,
    managers: &[ManagerConfig],
) -> GatewayResult<usize> {
    let mut inserted = 0;
    for entry in managers {
        if store.find_manager_by_vk_id(entry.vk_id).await?.is_some() {
            continue;
        }
        let manager = store
            .create_manager(NewManager {
                vk_id: entry.vk_id,
                name: entry
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Manager {}", entry.vk_id)),
                topic: entry.topic,
            })
            .await?;
        info!(manager_id = manager.id, vk_id = manager.vk_id, topic = %manager.topic, "registered manager");
        inserted += 1;
    }
    Ok(inserted)
}

/// Connects to PostgreSQL and applies pending migrations.
pub async fn connect(config: &AppConfig) -> anyhow::Result<Arc<PgStore>> {
    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    let applied = db::run_migrations(&pool).await?;
    info!(applied, "database schema ready");
    Ok(Arc::new(PgStore::new(pool)))
}

/// [`connect`] followed by [`sync_managers`] for the configured mapping.
pub async fn prepare_store(config: &AppConfig) -> anyhow::Result<Arc<PgStore>> {
    let store = connect(config).await?;
    let inserted = sync_managers(store.as_ref(), &config.managers)
        .await
        .context("failed to sync managers")?;
    info!(
        configured = config.managers.len(),
        inserted, "managers reconciled"
    );
    Ok(store)
}
