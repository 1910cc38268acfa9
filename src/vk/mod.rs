//! VK Bots API transport.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::TransportError;

pub mod longpoll;
pub mod types;

/// Outbound side of the messaging platform.
#[async_trait]
pub trait Messenger: Send + Sync + 'static {
    async fn send_message(&self, peer_id: i64, text: &str) -> Result<(), TransportError>;
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    response: Option<T>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error_code: i64,
    error_msg: String,
}

#[derive(Clone)]
pub struct VkClient {
    http: Client,
    api_url: String,
    token: String,
    version: String,
}

impl VkClient {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
            token: token.into(),
            version: version.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.vk_api_url.clone(),
            config.vk_token.clone(),
            config.vk_api_version.clone(),
        )
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Calls `method` and unwraps the `response` field of the reply.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let url = format!("{}/method/{}", self.api_url.trim_end_matches('/'), method);
        let mut form = params.to_vec();
        form.push(("access_token", self.token.clone()));
        form.push(("v", self.version.clone()));

        let envelope: ApiEnvelope<T> = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match envelope {
            ApiEnvelope {
                error: Some(error), ..
            } => Err(TransportError::Api {
                code: error.error_code,
                message: error.error_msg,
            }),
            ApiEnvelope {
                response: Some(response),
                ..
            } => Ok(response),
            _ => Err(TransportError::UnexpectedResponse(format!(
                "{method} returned neither response nor error"
            ))),
        }
    }
}

#[async_trait]
impl Messenger for VkClient {
    async fn send_message(&self, peer_id: i64, text: &str) -> Result<(), TransportError> {
        let random_id: i32 = rand::random();
        let _message_id: serde_json::Value = self
            .call(
                "messages.send",
                &[
                    ("peer_id", peer_id.to_string()),
                    ("message", text.to_string()),
                    ("random_id", random_id.to_string()),
                ],
            )
            .await?;
        Ok(())
    }
}
