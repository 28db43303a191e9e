//! # 이메일/전화 인증 코드 저장소
//!
//! 코드는 SHA-256 해시만 저장합니다. 같은 채널로 다시 요청하면 이전 코드를 덮어쓰고
//! 틀린 시도 횟수(`attempts`)도 0으로 돌아갑니다.

use crate::error::AppError;
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredCode {
    pub target: String,
    pub code_hash: String,
    pub expires_at: String,
}

pub async fn store_code(
    pool: &SqlitePool,
    user_id: &str,
    channel: &str,
    target: &str,
    code_hash: &str,
    expires_at: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO verification_codes (user_id, channel, target, code_hash, expires_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (user_id, channel) DO UPDATE SET
            target = excluded.target,
            code_hash = excluded.code_hash,
            expires_at = excluded.expires_at,
            attempts = 0
        "#,
    )
    .bind(user_id)
    .bind(channel)
    .bind(target)
    .bind(code_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_code(
    pool: &SqlitePool,
    user_id: &str,
    channel: &str,
) -> Result<Option<StoredCode>, AppError> {
    let code = sqlx::query_as::<_, StoredCode>(
        r#"
        SELECT target, code_hash, expires_at
        FROM verification_codes
        WHERE user_id = ? AND channel = ?
        "#,
    )
    .bind(user_id)
    .bind(channel)
    .fetch_optional(pool)
    .await?;

    Ok(code)
}

/// 틀린 시도를 1 늘리고 누적 횟수를 반환합니다. 코드가 없으면 `None`.
pub async fn record_failed_attempt(
    pool: &SqlitePool,
    user_id: &str,
    channel: &str,
) -> Result<Option<i64>, AppError> {
    let attempts = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE verification_codes
        SET attempts = attempts + 1
        WHERE user_id = ? AND channel = ?
        RETURNING attempts
        "#,
    )
    .bind(user_id)
    .bind(channel)
    .fetch_optional(pool)
    .await?;

    Ok(attempts)
}

pub async fn delete_code(pool: &SqlitePool, user_id: &str, channel: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM verification_codes WHERE user_id = ? AND channel = ?")
        .bind(user_id)
        .bind(channel)
        .execute(pool)
        .await?;

    Ok(())
}
