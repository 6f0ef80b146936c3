//! tutor-bot library - WhatsApp AI tutor
//!
//! Webhook-driven chat bot: inbound WhatsApp messages are routed through
//! onboarding or command handling and answered with TwiML.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tutor_common::config::BotConfig;

pub mod api;
pub mod commands;
pub mod db;
pub mod error;
pub mod format;
pub mod handler;
pub mod lesson;
pub mod onboarding;
pub mod replies;
pub mod twilio;
pub mod twiml;

use handler::MessageHandler;
use lesson::LessonGenerator;
use twilio::TwilioClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub generator: Arc<dyn LessonGenerator>,
    /// `None` when Twilio credentials are not configured
    pub twilio: Option<Arc<TwilioClient>>,
    pub handler: MessageHandler,
    pub config: Arc<BotConfig>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        generator: Arc<dyn LessonGenerator>,
        twilio: Option<TwilioClient>,
        config: BotConfig,
    ) -> Self {
        let handler = MessageHandler::new(db.clone(), Arc::clone(&generator));
        Self {
            db,
            generator,
            twilio: twilio.map(Arc::new),
            handler,
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    // Twilio-facing webhook
    let webhook = Router::new().route("/whatsapp", post(api::whatsapp_webhook));

    // Operator endpoints
    let admin = Router::new()
        .route("/users", get(api::list_users))
        .route("/users/:phone/progress", get(api::user_progress))
        .route("/send-message", post(api::send_message))
        .route("/test-lesson", post(api::test_lesson));

    let public = Router::new()
        .route("/", get(api::service_info))
        .merge(api::health_routes());

    Router::new()
        .merge(webhook)
        .merge(admin)
        .merge(public)
        .fallback(api::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
