use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::types::Event;
use super::VkClient;
use crate::dispatch::MessageDispatcher;
use crate::error::TransportError;

const ERROR_BACKOFF: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct Session {
    key: String,
    server: String,
    #[serde(deserialize_with = "ts_as_string")]
    ts: String,
}

#[derive(Debug, Deserialize)]
struct PollResponse {
    #[serde(default)]
    ts: Option<Value>,
    #[serde(default)]
    updates: Vec<Event>,
    failed: Option<i64>,
}

/// VK sends `ts` as a string in most replies but as a number in `failed` ones.
fn ts_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(ts_value_to_string(&value))
}

fn ts_value_to_string(value: &Value) -> String {
    match value {
        Value::String(ts) => ts.clone(),
        other => other.to_string(),
    }
}

/// What to do with an `a_check` reply, keyed by its `failed` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollStep {
    /// Deliver the updates and continue from the returned `ts`.
    Deliver,
    /// Events were lost; continue from the returned `ts`.
    SkipToTs,
    /// The key expired or the session was lost.
    Reopen,
    Fatal(i64),
}

fn classify(failed: Option<i64>) -> PollStep {
    match failed {
        None => PollStep::Deliver,
        Some(1) => PollStep::SkipToTs,
        Some(2 | 3) => PollStep::Reopen,
        Some(code) => PollStep::Fatal(code),
    }
}

/// Bots Long Poll loop feeding a [`MessageDispatcher`].
pub struct LongPoll {
    client: Arc<VkClient>,
    group_id: i64,
    wait: u64,
}

impl LongPoll {
    pub fn new(client: Arc<VkClient>, group_id: i64, wait: u64) -> Self {
        Self {
            client,
            group_id,
            wait,
        }
    }

    async fn open_session(&self) -> Result<Session, TransportError> {
        self.client
            .call(
                "groups.getLongPollServer",
                &[("group_id", self.group_id.to_string())],
            )
            .await
    }

    async fn poll(&self, session: &Session) -> Result<PollResponse, TransportError> {
        let wait = self.wait.to_string();
        let response = self
            .client
            .http()
            .get(&session.server)
            .query(&[
                ("act", "a_check"),
                ("key", session.key.as_str()),
                ("ts", session.ts.as_str()),
                ("wait", wait.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }

    /// Reopens the session, retrying transient failures until it succeeds.
    async fn reopen_session(&self) -> Session {
        loop {
            match self.open_session().await {
                Ok(session) => return session,
                Err(err) => {
                    warn!(error = %err, "failed to reopen long poll session");
                    sleep(ERROR_BACKOFF).await;
                }
            }
        }
    }

    /// Runs until VK reports an unrecoverable `failed` code. Only the first
    /// session open is allowed to fail outright.
    pub async fn run(&self, dispatcher: Arc<MessageDispatcher>) -> Result<(), TransportError> {
        let mut session = self.open_session().await?;
        info!(group_id = self.group_id, "long poll session opened");

        loop {
            let response = match self.poll(&session).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(error = %err, "long poll request failed");
                    sleep(ERROR_BACKOFF).await;
                    continue;
                }
            };

            match classify(response.failed) {
                PollStep::Deliver => {}
                PollStep::SkipToTs => {
                    if let Some(ts) = response.ts.as_ref() {
                        session.ts = ts_value_to_string(ts);
                    }
                    debug!("long poll history outdated, continuing from new ts");
                    continue;
                }
                PollStep::Reopen => {
                    info!(code = ?response.failed, "long poll key expired, reopening session");
                    session = self.reopen_session().await;
                    continue;
                }
                PollStep::Fatal(code) => {
                    error!(code, "long poll failed with an unrecoverable code");
                    return Err(TransportError::UnexpectedResponse(format!(
                        "long poll failed with code {code}"
                    )));
                }
            }

            if let Some(ts) = response.ts.as_ref() {
                session.ts = ts_value_to_string(ts);
            }

            for event in response.updates {
                let Some(message) = event.inbound_message() else {
                    continue;
                };
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    dispatcher.handle(message).await;
                });
            }
        }
    }
}
