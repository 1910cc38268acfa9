pub mod appeals;
pub mod bootstrap;
pub mod command;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod replies;
pub mod routes;
pub mod schema;
pub mod state;
pub mod store;
pub mod vk;

pub use dispatch::{InboundMessage, MessageDispatcher};
