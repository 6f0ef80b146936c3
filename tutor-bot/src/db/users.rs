//! `users` table operations

use chrono::Utc;
use sqlx::SqlitePool;
use tutor_common::db::{OnboardingStep, User};
use tutor_common::Result;

/// Look up a user by phone number
pub async fn get_user_by_phone(db: &SqlitePool, phone_number: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone_number = ?")
        .bind(phone_number)
        .fetch_optional(db)
        .await?;

    Ok(user)
}

/// Insert a fresh, un-onboarded user
///
/// Returns the stored row and whether this call created it. A concurrent
/// first message from the same number loses the insert race and gets the
/// existing row back with `false`.
pub async fn create_user(db: &SqlitePool, phone_number: &str) -> Result<(User, bool)> {
    let now = Utc::now();

    let inserted = sqlx::query(
        r#"
        INSERT INTO users (phone_number, language, onboarding_step, onboarded, created_at, updated_at)
        VALUES (?, 'en', ?, 0, ?, ?)
        ON CONFLICT(phone_number) DO NOTHING
        "#,
    )
    .bind(phone_number)
    .bind(OnboardingStep::Name.as_str())
    .bind(now)
    .bind(now)
    .execute(db)
    .await?
    .rows_affected()
        == 1;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone_number = ?")
        .bind(phone_number)
        .fetch_one(db)
        .await?;

    Ok((user, inserted))
}

/// Profile value collected by one onboarding step
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileField {
    Name(String),
    Age(i64),
    Country(String),
    Subjects(Vec<String>),
    LearningMode(String),
    Language(String),
}

impl ProfileField {
    fn column(&self) -> &'static str {
        match self {
            ProfileField::Name(_) => "name",
            ProfileField::Age(_) => "age",
            ProfileField::Country(_) => "country",
            ProfileField::Subjects(_) => "preferred_subjects",
            ProfileField::LearningMode(_) => "learning_mode",
            ProfileField::Language(_) => "language",
        }
    }
}

/// Store one collected field and move the user to `next_step`
///
/// Reaching [`OnboardingStep::Completed`] also flips the onboarded flag.
/// Single UPDATE statement; last write wins on concurrent messages.
pub async fn advance_onboarding(
    db: &SqlitePool,
    phone_number: &str,
    field: ProfileField,
    next_step: OnboardingStep,
) -> Result<()> {
    // Column name comes from a closed enum, never from input
    let sql = format!(
        "UPDATE users SET {} = ?, onboarding_step = ?, onboarded = ?, updated_at = ? \
         WHERE phone_number = ?",
        field.column()
    );

    let query = sqlx::query(&sql);
    let query = match field {
        ProfileField::Age(age) => query.bind(age),
        ProfileField::Subjects(subjects) => query.bind(serde_json::to_string(&subjects)?),
        ProfileField::Name(value)
        | ProfileField::Country(value)
        | ProfileField::LearningMode(value)
        | ProfileField::Language(value) => query.bind(value),
    };

    query
        .bind(next_step.as_str())
        .bind(next_step == OnboardingStep::Completed)
        .bind(Utc::now())
        .bind(phone_number)
        .execute(db)
        .await?;

    Ok(())
}

/// Overwrite the onboarding step without touching profile fields
pub async fn set_onboarding_step(
    db: &SqlitePool,
    phone_number: &str,
    step: OnboardingStep,
) -> Result<()> {
    sqlx::query(
        "UPDATE users SET onboarding_step = ?, onboarded = ?, updated_at = ? WHERE phone_number = ?",
    )
    .bind(step.as_str())
    .bind(step == OnboardingStep::Completed)
    .bind(Utc::now())
    .bind(phone_number)
    .execute(db)
    .await?;

    Ok(())
}

/// All users, oldest first
pub async fn list_users(db: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at ASC")
        .fetch_all(db)
        .await?;

    Ok(users)
}
