//! Shared fixtures for tutor-bot integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::SqlitePool;
use tutor_bot::handler::MessageHandler;
use tutor_bot::lesson::{LessonError, LessonGenerator, LessonRequest};
use tutor_common::config::{BotConfig, LlmConfig};
use tutor_common::db::init_memory_database;

pub const PHONE: &str = "+15550001234";

/// Lesson generator returning canned text and recording every request
pub struct StubGenerator {
    reply: Result<String, ()>,
    pub requests: Mutex<Vec<LessonRequest>>,
}

impl StubGenerator {
    pub fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<LessonRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LessonGenerator for StubGenerator {
    fn provider_id(&self) -> &'static str {
        "stub"
    }

    async fn generate_lesson(&self, request: &LessonRequest) -> Result<String, LessonError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(()) => Err(LessonError::Timeout(30)),
        }
    }
}

pub async fn setup_db() -> SqlitePool {
    init_memory_database().await.expect("Should create in-memory database")
}

pub fn test_config() -> BotConfig {
    BotConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_path: PathBuf::from(":memory:"),
        llm: LlmConfig::default(),
        twilio: None,
    }
}

/// Walk `phone` through every onboarding step
pub async fn onboard(handler: &MessageHandler, phone: &str, age: &str) {
    for answer in ["hi", "Ada", age, "kenya", "math, science", "text", "english"] {
        handler.process_message(phone, answer).await;
    }
}

pub async fn progress_count(db: &SqlitePool, phone: &str) -> i64 {
    tutor_bot::db::count_progress(db, phone)
        .await
        .expect("Should count progress")
}
