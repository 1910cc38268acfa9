//! Persistence gateway for appeals and managers.
//!
//! Every operation is atomic: a failed call leaves no partial writes behind and
//! surfaces as [`GatewayError`](crate::error::GatewayError).

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::models::{Appeal, AppealChanges, Manager, NewAppeal, NewManager, Status, Topic};

/// Predicate over appeals. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppealFilter {
    pub student_id: Option<i64>,
    pub statuses: Vec<Status>,
    pub drafts_only: bool,
}

impl AppealFilter {
    /// The student's appeal that is still waiting for its body text.
    pub fn draft_of(student_id: i64) -> Self {
        Self {
            student_id: Some(student_id),
            statuses: vec![Status::New],
            drafts_only: true,
        }
    }

    pub fn unresolved() -> Self {
        Self {
            statuses: vec![Status::New, Status::InProgress],
            ..Self::default()
        }
    }

    pub fn matches(&self, appeal: &Appeal) -> bool {
        self.student_id.map_or(true, |id| appeal.student_id == id)
            && (self.statuses.is_empty() || self.statuses.contains(&appeal.status))
            && (!self.drafts_only || appeal.is_draft())
    }
}

/// Lookups return the most recently created match first.
#[async_trait]
pub trait AppealStore: Send + Sync + 'static {
    /// Fails with [`GatewayError::DraftConflict`](crate::error::GatewayError::DraftConflict)
    /// when inserting a draft for a student who already holds one.
    async fn create_appeal(&self, appeal: NewAppeal) -> GatewayResult<Appeal>;

    async fn get_appeal(&self, id: i32) -> GatewayResult<Option<Appeal>>;

    async fn find_appeal(&self, filter: AppealFilter) -> GatewayResult<Option<Appeal>>;

    async fn list_appeals(&self, filter: AppealFilter) -> GatewayResult<Vec<Appeal>>;

    /// Applies `changes` and returns the updated row, or `None` if `id` does not exist.
    async fn update_appeal(&self, id: i32, changes: AppealChanges)
        -> GatewayResult<Option<Appeal>>;

    async fn create_manager(&self, manager: NewManager) -> GatewayResult<Manager>;

    /// With several managers on one topic the earliest registered one wins.
    async fn find_manager_by_topic(&self, topic: Topic) -> GatewayResult<Option<Manager>>;

    async fn find_manager_by_vk_id(&self, vk_id: i64) -> GatewayResult<Option<Manager>>;

    async fn list_managers(&self) -> GatewayResult<Vec<Manager>>;
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::AppealFilter;
    use crate::models::{Appeal, Status, Topic};

    fn appeal(student_id: i64, text: &str, status: Status) -> Appeal {
        let now = Utc::now().naive_utc();
        Appeal {
            id: 1,
            student_id,
            topic: Topic::Sport,
            text: text.to_string(),
            status,
            response: None,
            manager_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn draft_filter_requires_empty_new_appeal_of_student() {
        let filter = AppealFilter::draft_of(7);
        assert!(filter.matches(&appeal(7, "", Status::New)));
        assert!(!filter.matches(&appeal(7, "broken shower", Status::New)));
        assert!(!filter.matches(&appeal(7, "", Status::InProgress)));
        assert!(!filter.matches(&appeal(8, "", Status::New)));
    }

    #[test]
    fn unresolved_filter_skips_resolved() {
        let filter = AppealFilter::unresolved();
        assert!(filter.matches(&appeal(1, "a", Status::New)));
        assert!(filter.matches(&appeal(2, "b", Status::InProgress)));
        assert!(!filter.matches(&appeal(3, "c", Status::Resolved)));
    }
}
