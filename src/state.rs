use std::sync::Arc;

use crate::{config::AppConfig, dispatch::MessageDispatcher, store::AppealStore, vk::Messenger};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dispatcher: Arc<MessageDispatcher>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn AppealStore>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(MessageDispatcher::new(store, messenger)),
        }
    }
}
