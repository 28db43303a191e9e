//! # 이메일/전화 소유 확인
//!
//! 6자리 일회용 코드를 발급하고 확인합니다. 유효 시간은 15분이고,
//! 틀린 코드를 5번 입력하면 그 코드는 폐기되어 새로 요청해야 합니다.
//!
//! 전송은 [`CodeNotifier`]를 거칩니다. 기본 구현(`LogNotifier`)은 코드를 로그에 남깁니다.

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::db::verification as db_codes;
use crate::error::AppError;

const CODE_TTL_MINUTES: i64 = 15;
/// 코드 하나에 허용하는 틀린 시도 횟수
pub const MAX_ATTEMPTS: i64 = 5;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Phone,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Phone => "phone",
        }
    }
}

#[async_trait]
pub trait CodeNotifier: Send + Sync {
    async fn send(&self, channel: Channel, target: &str, code: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl CodeNotifier for LogNotifier {
    async fn send(&self, channel: Channel, target: &str, code: &str) -> Result<(), AppError> {
        tracing::info!(channel = channel.as_str(), to = target, code, "verification code issued");
        Ok(())
    }
}

pub fn generate_code() -> String {
    format!("{:06}", OsRng.next_u32() % 1_000_000)
}

pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `+`, 숫자, 흔한 구분자(공백 - ( ) .)만 허용하고 `+`와 숫자만 남깁니다.
pub fn normalize_phone(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let mut normalized = String::with_capacity(trimmed.len());
    for (i, c) in trimmed.chars().enumerate() {
        match c {
            '+' if i == 0 => normalized.push(c),
            '0'..='9' => normalized.push(c),
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => return Err(AppError::BadRequest("Invalid phone number".to_string())),
        }
    }

    let digits = normalized.trim_start_matches('+').len();
    if !(7..=15).contains(&digits) {
        return Err(AppError::BadRequest("Invalid phone number".to_string()));
    }
    Ok(normalized)
}

/// `channel`의 코드를 새로 만들어(기존 코드는 교체) 전송합니다.
pub async fn issue(
    pool: &SqlitePool,
    notifier: &dyn CodeNotifier,
    user_id: &str,
    channel: Channel,
    target: &str,
) -> Result<(), AppError> {
    let code = generate_code();
    let expires_at = (Utc::now() + Duration::minutes(CODE_TTL_MINUTES))
        .format(TIMESTAMP_FORMAT)
        .to_string();

    db_codes::store_code(
        pool,
        user_id,
        channel.as_str(),
        target,
        &hash_code(&code),
        &expires_at,
    )
    .await?;

    notifier.send(channel, target, &code).await
}

/// 일치하고 만료되지 않은 코드를 소비하고, 코드를 보냈던 주소/번호를 반환합니다.
pub async fn confirm(
    pool: &SqlitePool,
    user_id: &str,
    channel: Channel,
    code: &str,
) -> Result<String, AppError> {
    let invalid = || AppError::BadRequest("Invalid or expired code".to_string());

    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::BadRequest("Code is required".to_string()));
    }

    let stored = db_codes::find_code(pool, user_id, channel.as_str())
        .await?
        .ok_or_else(invalid)?;

    let expires = NaiveDateTime::parse_from_str(&stored.expires_at, TIMESTAMP_FORMAT)
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires.and_utc() < Utc::now() {
        db_codes::delete_code(pool, user_id, channel.as_str()).await?;
        return Err(invalid());
    }

    if stored.code_hash != hash_code(code) {
        let attempts = db_codes::record_failed_attempt(pool, user_id, channel.as_str()).await?;
        if attempts.is_some_and(|n| n >= MAX_ATTEMPTS) {
            tracing::warn!(user_id, channel = channel.as_str(), "verification code locked out");
            db_codes::delete_code(pool, user_id, channel.as_str()).await?;
        }
        return Err(invalid());
    }

    db_codes::delete_code(pool, user_id, channel.as_str()).await?;
    Ok(stored.target)
}
