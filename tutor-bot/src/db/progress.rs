//! `progress` table operations
//!
//! Rows are append-only. The "current lesson" is the newest row for a phone
//! number (optionally within one topic), served from the
//! `(phone_number, topic, created_at DESC)` indexes.

use chrono::Utc;
use sqlx::SqlitePool;
use tutor_common::db::Progress;
use tutor_common::Result;

/// Append a progress row for a generated lesson part
pub async fn create_progress(
    db: &SqlitePool,
    phone_number: &str,
    topic: &str,
    stage: i64,
    content: &str,
) -> Result<Progress> {
    let progress = sqlx::query_as::<_, Progress>(
        r#"
        INSERT INTO progress (phone_number, topic, stage, content, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(phone_number)
    .bind(topic)
    .bind(stage)
    .bind(content)
    .bind(Utc::now())
    .fetch_one(db)
    .await?;

    Ok(progress)
}

/// Most recent progress row for a user, optionally restricted to one topic
pub async fn get_current_lesson(
    db: &SqlitePool,
    phone_number: &str,
    topic: Option<&str>,
) -> Result<Option<Progress>> {
    let progress = match topic {
        Some(topic) => {
            sqlx::query_as::<_, Progress>(
                r#"
                SELECT * FROM progress
                WHERE phone_number = ? AND topic = ?
                ORDER BY created_at DESC, id DESC
                LIMIT 1
                "#,
            )
            .bind(phone_number)
            .bind(topic)
            .fetch_optional(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Progress>(
                r#"
                SELECT * FROM progress
                WHERE phone_number = ?
                ORDER BY created_at DESC, id DESC
                LIMIT 1
                "#,
            )
            .bind(phone_number)
            .fetch_optional(db)
            .await?
        }
    };

    Ok(progress)
}

/// Latest `limit` rows for a user, newest first
pub async fn list_progress(db: &SqlitePool, phone_number: &str, limit: i64) -> Result<Vec<Progress>> {
    let rows = sqlx::query_as::<_, Progress>(
        r#"
        SELECT * FROM progress
        WHERE phone_number = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(phone_number)
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// Number of progress rows for one user
pub async fn count_progress(db: &SqlitePool, phone_number: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM progress WHERE phone_number = ?")
        .bind(phone_number)
        .fetch_one(db)
        .await?;

    Ok(count)
}
