//! HTTP API handlers

pub mod admin;
pub mod health;
pub mod root;
pub mod users;
pub mod webhook;

pub use admin::{send_message, test_lesson};
pub use health::health_routes;
pub use root::{not_found, service_info};
pub use users::{list_users, user_progress};
pub use webhook::whatsapp_webhook;
