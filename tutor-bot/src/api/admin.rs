//! Operator endpoints for outbound sends and lesson previews

use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use tutor_common::db::DEFAULT_LEARNER_AGE;

use crate::error::{ApiError, ApiResult};
use crate::format::format_for_whatsapp;
use crate::handler::mask_phone;
use crate::lesson::LessonRequest;
use crate::AppState;

const TEST_LESSON_NAME: &str = "Test User";

#[derive(Debug, Deserialize)]
pub struct SendMessageForm {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub status: &'static str,
    pub to: String,
    pub parts: usize,
    pub message_sids: Vec<String>,
}

/// POST /send-message
pub async fn send_message(
    State(state): State<AppState>,
    Form(form): Form<SendMessageForm>,
) -> ApiResult<Json<SendMessageResponse>> {
    let twilio = state
        .twilio
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Twilio is not configured".to_string()))?;

    let phone = form.phone_number.trim();
    if phone.is_empty() {
        return Err(ApiError::BadRequest("phone_number is required".to_string()));
    }
    if form.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }

    let sent = twilio.send_message(phone, &form.message).await?;

    Ok(Json(SendMessageResponse {
        status: "sent",
        to: mask_phone(phone),
        parts: sent.sids.len(),
        message_sids: sent.sids,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TestLessonForm {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestLessonResponse {
    pub topic: String,
    pub age: i64,
    pub name: String,
    pub provider: &'static str,
    pub raw_content: String,
    pub formatted_content: String,
    pub formatted_chars: usize,
}

/// POST /test-lesson
///
/// Generates a lesson outside of any conversation. Nothing is stored.
pub async fn test_lesson(
    State(state): State<AppState>,
    Form(form): Form<TestLessonForm>,
) -> ApiResult<Json<TestLessonResponse>> {
    let topic = form.topic.split_whitespace().collect::<Vec<_>>().join(" ");
    if topic.is_empty() {
        return Err(ApiError::BadRequest("topic is required".to_string()));
    }

    let age = form.age.unwrap_or(DEFAULT_LEARNER_AGE);
    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| TEST_LESSON_NAME.to_string());

    let request = LessonRequest::new(topic.clone(), age, name.clone());
    let raw_content = state.generator.generate_lesson(&request).await?;
    let formatted_content = format_for_whatsapp(&raw_content);

    info!(topic = %topic, age, chars = raw_content.chars().count(), "Test lesson generated");

    Ok(Json(TestLessonResponse {
        formatted_chars: formatted_content.chars().count(),
        topic,
        age,
        name,
        provider: state.generator.provider_id(),
        raw_content,
        formatted_content,
    }))
}
