use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tokio::task;

use super::{AppealFilter, AppealStore};
use crate::db::PgPool;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{Appeal, AppealChanges, Manager, NewAppeal, NewManager, Status, Topic};
use crate::schema::{appeals, managers};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs `f` inside a transaction on the blocking pool.
    async fn run<F, T>(&self, f: F) -> GatewayResult<T>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || -> GatewayResult<T> {
            let mut pooled = pool
                .get()
                .map_err(|err| GatewayError::Pool(err.to_string()))?;
            let conn: &mut PgConnection = &mut pooled;
            conn.transaction(f).map_err(GatewayError::from)
        })
        .await
        .map_err(|err| GatewayError::Task(err.to_string()))?
    }
}

const ONE_DRAFT_INDEX: &str = "appeals_one_draft_idx";

fn is_draft_conflict(err: &GatewayError) -> bool {
    matches!(
        err,
        GatewayError::Database(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info))
            if info.constraint_name() == Some(ONE_DRAFT_INDEX)
    )
}

fn filtered(filter: AppealFilter) -> appeals::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = appeals::table.into_boxed();
    if let Some(student_id) = filter.student_id {
        query = query.filter(appeals::student_id.eq(student_id));
    }
    if !filter.statuses.is_empty() {
        query = query.filter(appeals::status.eq_any(filter.statuses));
    }
    if filter.drafts_only {
        query = query
            .filter(appeals::status.eq(Status::New))
            .filter(appeals::text.eq(""));
    }
    query.order(appeals::id.desc())
}

#[async_trait]
impl AppealStore for PgStore {
    async fn create_appeal(&self, appeal: NewAppeal) -> GatewayResult<Appeal> {
        self.run(move |conn| {
            diesel::insert_into(appeals::table)
                .values(&appeal)
                .get_result::<Appeal>(conn)
        })
        .await
        .map_err(|err| {
            if is_draft_conflict(&err) {
                GatewayError::DraftConflict
            } else {
                err
            }
        })
    }

    async fn get_appeal(&self, id: i32) -> GatewayResult<Option<Appeal>> {
        self.run(move |conn| appeals::table.find(id).first::<Appeal>(conn).optional())
            .await
    }

    async fn find_appeal(&self, filter: AppealFilter) -> GatewayResult<Option<Appeal>> {
        self.run(move |conn| filtered(filter).first::<Appeal>(conn).optional())
            .await
    }

    async fn list_appeals(&self, filter: AppealFilter) -> GatewayResult<Vec<Appeal>> {
        self.run(move |conn| filtered(filter).load::<Appeal>(conn)).await
    }

    async fn update_appeal(
        &self,
        id: i32,
        changes: AppealChanges,
    ) -> GatewayResult<Option<Appeal>> {
        let changes = AppealChanges {
            updated_at: Some(Utc::now().naive_utc()),
            ..changes
        };
        self.run(move |conn| {
            diesel::update(appeals::table.find(id))
                .set(&changes)
                .get_result::<Appeal>(conn)
                .optional()
        })
        .await
    }

    async fn create_manager(&self, manager: NewManager) -> GatewayResult<Manager> {
        self.run(move |conn| {
            diesel::insert_into(managers::table)
                .values(&manager)
                .get_result::<Manager>(conn)
        })
        .await
    }

    async fn find_manager_by_topic(&self, topic: Topic) -> GatewayResult<Option<Manager>> {
        self.run(move |conn| {
            managers::table
                .filter(managers::topic.eq(topic))
                .order(managers::id.asc())
                .first::<Manager>(conn)
                .optional()
        })
        .await
    }

    async fn find_manager_by_vk_id(&self, vk_id: i64) -> GatewayResult<Option<Manager>> {
        self.run(move |conn| {
            managers::table
                .filter(managers::vk_id.eq(vk_id))
                .first::<Manager>(conn)
                .optional()
        })
        .await
    }

    async fn list_managers(&self) -> GatewayResult<Vec<Manager>> {
        self.run(|conn| managers::table.order(managers::id.asc()).load::<Manager>(conn))
            .await
    }
}
