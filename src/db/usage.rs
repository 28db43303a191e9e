//! # 일일 사용량 카운터 쿼리
//!
//! `(subject, day)` 한 쌍마다 하루 동안의 변환 횟수를 셉니다.
//! - subject: `"user:<id>"` 또는 `"client:<client_id>"`
//! - day: UTC 날짜 (예: "2026-03-01")

use crate::error::AppError;
use sqlx::SqlitePool;

/// 오늘 사용한 횟수를 조회합니다. 기록이 없으면 0입니다.
pub async fn usage_count(pool: &SqlitePool, subject: &str, day: &str) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT count FROM usage_counters WHERE subject = ? AND day = ?",
    )
    .bind(subject)
    .bind(day)
    .fetch_optional(pool)
    .await?;

    Ok(count.unwrap_or(0))
}

/// 사용 횟수를 1 늘리고, 늘어난 값을 반환합니다.
///
/// UPSERT(`ON CONFLICT ... DO UPDATE`)로 행이 없으면 1로 생성합니다.
pub async fn increment_usage(pool: &SqlitePool, subject: &str, day: &str) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO usage_counters (subject, day, count)
        VALUES (?, ?, 1)
        ON CONFLICT (subject, day) DO UPDATE SET count = count + 1
        RETURNING count
        "#,
    )
    .bind(subject)
    .bind(day)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// 지난 날짜의 카운터를 정리합니다. 서버 시작 시 한 번 호출됩니다.
pub async fn prune_before(pool: &SqlitePool, day: &str) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM usage_counters WHERE day < ?")
        .bind(day)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
