//! In-memory gateway. All data is lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AppealFilter, AppealStore};
use crate::error::{GatewayError, GatewayResult};
use crate::models::{Appeal, AppealChanges, Manager, NewAppeal, NewManager, Status, Topic};

#[derive(Default)]
struct Tables {
    appeals: Vec<Appeal>,
    managers: Vec<Manager>,
}

/// Ids start at 1 and grow by one per insert, like a `SERIAL` column.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppealStore for MemoryStore {
    async fn create_appeal(&self, appeal: NewAppeal) -> GatewayResult<Appeal> {
        let mut tables = self.tables.write().await;
        let is_draft = appeal.status == Status::New && appeal.text.is_empty();
        let draft_of = AppealFilter::draft_of(appeal.student_id);
        if is_draft && tables.appeals.iter().any(|existing| draft_of.matches(existing)) {
            return Err(GatewayError::DraftConflict);
        }
        let now = Utc::now().naive_utc();
        let created = Appeal {
            id: tables.appeals.len() as i32 + 1,
            student_id: appeal.student_id,
            topic: appeal.topic,
            text: appeal.text,
            status: appeal.status,
            response: None,
            manager_id: None,
            created_at: now,
            updated_at: now,
        };
        tables.appeals.push(created.clone());
        Ok(created)
    }

    async fn get_appeal(&self, id: i32) -> GatewayResult<Option<Appeal>> {
        let tables = self.tables.read().await;
        Ok(tables.appeals.iter().find(|appeal| appeal.id == id).cloned())
    }

    async fn find_appeal(&self, filter: AppealFilter) -> GatewayResult<Option<Appeal>> {
        let tables = self.tables.read().await;
        Ok(tables
            .appeals
            .iter()
            .rev()
            .find(|appeal| filter.matches(appeal))
            .cloned())
    }

    async fn list_appeals(&self, filter: AppealFilter) -> GatewayResult<Vec<Appeal>> {
        let tables = self.tables.read().await;
        Ok(tables
            .appeals
            .iter()
            .rev()
            .filter(|appeal| filter.matches(appeal))
            .cloned()
            .collect())
    }

    async fn update_appeal(
        &self,
        id: i32,
        changes: AppealChanges,
    ) -> GatewayResult<Option<Appeal>> {
        let mut tables = self.tables.write().await;
        let Some(appeal) = tables.appeals.iter_mut().find(|appeal| appeal.id == id) else {
            return Ok(None);
        };
        if let Some(text) = changes.text {
            appeal.text = text;
        }
        if let Some(status) = changes.status {
            appeal.status = status;
        }
        if let Some(response) = changes.response {
            appeal.response = Some(response);
        }
        if let Some(manager_id) = changes.manager_id {
            appeal.manager_id = Some(manager_id);
        }
        appeal.updated_at = Utc::now().naive_utc();
        Ok(Some(appeal.clone()))
    }

    async fn create_manager(&self, manager: NewManager) -> GatewayResult<Manager> {
        let mut tables = self.tables.write().await;
        let created = Manager {
            id: tables.managers.len() as i32 + 1,
            vk_id: manager.vk_id,
            name: manager.name,
            topic: manager.topic,
            created_at: Utc::now().naive_utc(),
        };
        tables.managers.push(created.clone());
        Ok(created)
    }

    async fn find_manager_by_topic(&self, topic: Topic) -> GatewayResult<Option<Manager>> {
        let tables = self.tables.read().await;
        Ok(tables
            .managers
            .iter()
            .find(|manager| manager.topic == topic)
            .cloned())
    }

    async fn find_manager_by_vk_id(&self, vk_id: i64) -> GatewayResult<Option<Manager>> {
        let tables = self.tables.read().await;
        Ok(tables
            .managers
            .iter()
            .find(|manager| manager.vk_id == vk_id)
            .cloned())
    }

    async fn list_managers(&self) -> GatewayResult<Vec<Manager>> {
        let tables = self.tables.read().await;
        Ok(tables.managers.clone())
    }
}
