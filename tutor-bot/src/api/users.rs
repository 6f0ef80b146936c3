//! User listing and progress inspection

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tutor_common::db::{Progress, User};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::handler::mask_phone;
use crate::twilio::strip_whatsapp_prefix;
use crate::AppState;

/// Progress rows returned per user
const RECENT_PROGRESS_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub phone_number: String,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub country: Option<String>,
    pub onboarded: bool,
    pub onboarding_step: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            phone_number: mask_phone(&user.phone_number),
            name: user.name,
            age: user.age,
            country: user.country,
            onboarded: user.onboarded,
            onboarding_step: user.onboarding_step,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
    pub total: usize,
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UserListResponse>> {
    let users: Vec<UserSummary> = db::list_users(&state.db)
        .await?
        .into_iter()
        .map(UserSummary::from)
        .collect();

    Ok(Json(UserListResponse {
        total: users.len(),
        users,
    }))
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub phone_number: String,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub country: Option<String>,
    pub preferred_subjects: Vec<String>,
    pub learning_mode: Option<String>,
    pub language: String,
    pub onboarding_step: String,
    pub onboarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            preferred_subjects: user.subjects(),
            phone_number: user.phone_number,
            name: user.name,
            age: user.age,
            country: user.country,
            learning_mode: user.learning_mode,
            language: user.language,
            onboarding_step: user.onboarding_step,
            onboarded: user.onboarded,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub user: UserProfile,
    pub recent_progress: Vec<Progress>,
    pub total_lessons: i64,
}

/// GET /users/:phone/progress
pub async fn user_progress(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    let phone = strip_whatsapp_prefix(&phone);

    let user = db::get_user_by_phone(&state.db, phone)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {}", mask_phone(phone))))?;

    let recent_progress = db::list_progress(&state.db, phone, RECENT_PROGRESS_LIMIT).await?;
    let total_lessons = db::count_progress(&state.db, phone).await?;

    Ok(Json(ProgressResponse {
        user: UserProfile::from(user),
        recent_progress,
        total_lessons,
    }))
}
