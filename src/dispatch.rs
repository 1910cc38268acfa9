use std::sync::Arc;

use tracing::{error, warn};

use crate::appeals::AppealService;
use crate::command::{parse_message, Command};
use crate::error::{AppealError, AppealResult};
use crate::replies;
use crate::store::AppealStore;
use crate::vk::Messenger;

/// A chat message from a user. Replies go to `peer_id`, appeals belong to `sender_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: i64,
    pub peer_id: i64,
    pub text: String,
}

impl InboundMessage {
    /// A message in a private chat, where the peer is the sender.
    pub fn direct(sender_id: i64, text: impl Into<String>) -> Self {
        Self {
            sender_id,
            peer_id: sender_id,
            text: text.into(),
        }
    }
}

/// Routes each inbound message to the appeal lifecycle and answers the sender
/// exactly once.
pub struct MessageDispatcher {
    appeals: AppealService,
    messenger: Arc<dyn Messenger>,
}

impl MessageDispatcher {
    pub fn new(store: Arc<dyn AppealStore>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            appeals: AppealService::new(store, messenger.clone()),
            messenger,
        }
    }

    pub async fn handle(&self, message: InboundMessage) {
        let reply = self.respond(&message).await;
        if let Err(err) = self.messenger.send_message(message.peer_id, &reply).await {
            error!(peer_id = message.peer_id, error = %err, "failed to send reply");
        }
    }

    /// Runs the message through the lifecycle and returns the text for the sender.
    pub async fn respond(&self, message: &InboundMessage) -> String {
        match self.route(message).await {
            Ok(reply) => reply,
            Err(err) => error_reply(err),
        }
    }

    async fn route(&self, message: &InboundMessage) -> AppealResult<String> {
        let command = match parse_message(&message.text) {
            Ok(command) => command,
            Err(err) => return Ok(replies::command_error(&err)),
        };

        match command {
            Command::Greeting => Ok(replies::topic_menu()),
            Command::SelectTopic(topic) => {
                let appeal = self.appeals.start_appeal(message.sender_id, topic).await?;
                Ok(replies::appeal_started(&appeal))
            }
            Command::Reply { appeal_id, text } => {
                let resolution = self.appeals.record_response(appeal_id, &text).await?;
                match resolution.delivery {
                    Ok(()) => Ok(replies::response_sent()),
                    Err(err) => {
                        warn!(
                            appeal_id,
                            student_id = resolution.appeal.student_id,
                            error = %err,
                            "failed to deliver answer to student"
                        );
                        Ok(replies::response_undelivered(appeal_id))
                    }
                }
            }
            Command::SetStatus { appeal_id, status } => {
                let appeal = self.appeals.change_status(appeal_id, status).await?;
                Ok(replies::status_changed(&appeal))
            }
            Command::FreeText(text) => {
                let Some(submission) = self
                    .appeals
                    .continue_appeal(message.sender_id, &text)
                    .await?
                else {
                    return Ok(replies::appeal_not_started());
                };
                if let (Some(manager), Some(Err(err))) =
                    (&submission.manager, &submission.notification)
                {
                    warn!(
                        appeal_id = submission.appeal.id,
                        manager_vk_id = manager.vk_id,
                        error = %err,
                        "failed to notify manager"
                    );
                }
                Ok(replies::appeal_accepted(&submission.appeal))
            }
        }
    }
}

fn error_reply(err: AppealError) -> String {
    match err {
        AppealError::Validation(message) => message,
        AppealError::NotFound(_) => replies::not_found(),
        AppealError::AlreadyAnswered(_) => replies::already_answered(),
        AppealError::InvalidTransition { id, from, to } => {
            replies::invalid_transition(id, from, to)
        }
        AppealError::DraftPending(id) => replies::draft_pending(id),
        AppealError::Gateway(err) => {
            error!(error = %err, "appeal storage failure");
            replies::internal_failure()
        }
    }
}
