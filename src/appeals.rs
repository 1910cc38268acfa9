//! Appeal lifecycle: `New -> InProgress -> Resolved`.
//!
//! Database mutations are committed before any third party is notified, and a
//! failed notification never undoes them.

use std::sync::Arc;

use tracing::info;

use crate::error::{AppealError, AppealResult, GatewayError, TransportError};
use crate::models::{Appeal, AppealChanges, Manager, NewAppeal, Status, Topic, MAX_TEXT_LEN};
use crate::replies;
use crate::store::{AppealFilter, AppealStore};
use crate::vk::Messenger;

/// Result of attaching body text to a draft.
#[derive(Debug)]
pub struct Submission {
    pub appeal: Appeal,
    pub manager: Option<Manager>,
    /// `None` when no manager handles the topic.
    pub notification: Option<Result<(), TransportError>>,
}

/// Result of a manager answering an appeal.
#[derive(Debug)]
pub struct Resolution {
    pub appeal: Appeal,
    pub delivery: Result<(), TransportError>,
}

#[derive(Clone)]
pub struct AppealService {
    store: Arc<dyn AppealStore>,
    messenger: Arc<dyn Messenger>,
}

impl AppealService {
    pub fn new(store: Arc<dyn AppealStore>, messenger: Arc<dyn Messenger>) -> Self {
        Self { store, messenger }
    }

    /// Opens a draft. A student holds at most one draft at a time; the store
    /// enforces this, so concurrent topic choices yield a single draft.
    pub async fn start_appeal(&self, student_id: i64, topic: Topic) -> AppealResult<Appeal> {
        if let Some(draft) = self.pending_draft(student_id).await? {
            return Err(AppealError::DraftPending(draft.id));
        }

        let appeal = match self
            .store
            .create_appeal(NewAppeal::draft(student_id, topic))
            .await
        {
            Ok(appeal) => appeal,
            Err(GatewayError::DraftConflict) => {
                let draft = self
                    .pending_draft(student_id)
                    .await?
                    .ok_or(GatewayError::DraftConflict)?;
                return Err(AppealError::DraftPending(draft.id));
            }
            Err(err) => return Err(err.into()),
        };
        info!(appeal_id = appeal.id, student_id, %topic, "appeal started");
        Ok(appeal)
    }

    /// Fills in the student's draft and hands it to the topic's manager.
    ///
    /// Returns `Ok(None)` when the student has no draft.
    pub async fn continue_appeal(
        &self,
        student_id: i64,
        text: &str,
    ) -> AppealResult<Option<Submission>> {
        let Some(draft) = self.pending_draft(student_id).await? else {
            return Ok(None);
        };

        let text = validate_text(text)?;
        let manager = self.store.find_manager_by_topic(draft.topic).await?;
        let changes = AppealChanges {
            text: Some(text),
            manager_id: manager.as_ref().map(|manager| manager.id),
            ..AppealChanges::default()
        };
        let appeal = self
            .store
            .update_appeal(draft.id, changes)
            .await?
            .ok_or(AppealError::NotFound(draft.id))?;
        info!(
            appeal_id = appeal.id,
            student_id,
            manager_id = ?appeal.manager_id,
            "appeal submitted"
        );

        let notification = match &manager {
            Some(manager) => Some(
                self.messenger
                    .send_message(manager.vk_id, &replies::manager_notification(&appeal))
                    .await,
            ),
            None => None,
        };

        Ok(Some(Submission {
            appeal,
            manager,
            notification,
        }))
    }

    async fn pending_draft(&self, student_id: i64) -> AppealResult<Option<Appeal>> {
        Ok(self
            .store
            .find_appeal(AppealFilter::draft_of(student_id))
            .await?)
    }

    /// Stores the manager's answer and forwards it to the student.
    pub async fn record_response(&self, appeal_id: i32, text: &str) -> AppealResult<Resolution> {
        let appeal = self
            .store
            .get_appeal(appeal_id)
            .await?
            .ok_or(AppealError::NotFound(appeal_id))?;

        // Check and write are separate statements: two concurrent answers to the
        // same appeal can both observe `New`.
        if appeal.status != Status::New {
            return Err(AppealError::AlreadyAnswered(appeal_id));
        }
        let response = validate_text(text)?;

        let changes = AppealChanges {
            status: Some(Status::Resolved),
            response: Some(response),
            ..AppealChanges::default()
        };
        let appeal = self
            .store
            .update_appeal(appeal_id, changes)
            .await?
            .ok_or(AppealError::NotFound(appeal_id))?;
        info!(appeal_id, student_id = appeal.student_id, "appeal resolved");

        let delivery = self
            .messenger
            .send_message(appeal.student_id, &replies::student_answer(&appeal))
            .await;

        Ok(Resolution { appeal, delivery })
    }

    pub async fn change_status(&self, appeal_id: i32, status: Status) -> AppealResult<Appeal> {
        let appeal = self
            .store
            .get_appeal(appeal_id)
            .await?
            .ok_or(AppealError::NotFound(appeal_id))?;

        if !appeal.status.can_transition_to(status) {
            return Err(AppealError::InvalidTransition {
                id: appeal_id,
                from: appeal.status,
                to: status,
            });
        }
        if appeal.status == status {
            return Ok(appeal);
        }

        let changes = AppealChanges {
            status: Some(status),
            ..AppealChanges::default()
        };
        let updated = self
            .store
            .update_appeal(appeal_id, changes)
            .await?
            .ok_or(AppealError::NotFound(appeal_id))?;
        info!(appeal_id, from = %appeal.status, to = %status, "appeal status changed");
        Ok(updated)
    }
}

fn validate_text(text: &str) -> AppealResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppealError::Validation(
            "Текст не может быть пустым".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(AppealError::Validation(format!(
            "Текст слишком длинный: не больше {MAX_TEXT_LEN} символов"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::validate_text;
    use crate::error::AppealError;

    #[test]
    fn text_is_trimmed() {
        assert_eq!(validate_text("  сломан душ \n").unwrap(), "сломан душ");
    }

    #[test]
    fn rejects_blank_and_oversized_text() {
        assert!(matches!(validate_text(" \n"), Err(AppealError::Validation(_))));
        let long = "ы".repeat(1001);
        assert!(matches!(validate_text(&long), Err(AppealError::Validation(_))));
        assert!(validate_text(&"ы".repeat(1000)).is_ok());
    }
}
