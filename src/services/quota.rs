//! # 무료 사용량 한도 (Quota)
//!
//! 변환 요청마다 "누구의" 사용량인지(subject)를 정하고, 하루 한도를 검사합니다.
//!
//! | 호출자 | subject 키 | 한도 | 초과 시 `X-Rate-Limit-Reached` |
//! |--------|-----------|------|------------------------------|
//! | 비로그인 방문자 | `client:<client_id>` | `GUEST_DAILY_LIMIT` | `free` |
//! | 무료 계정 | `user:<id>` | `MEMBER_DAILY_LIMIT` | `member` |
//! | 유료 플랜 계정 | 없음 | 무제한 | - |
//!
//! 카운트는 최선 노력(best-effort) 방식입니다. 동시에 들어온 요청 몇 개가
//! 한도를 약간 넘길 수 있습니다.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::{Plan, Quota, User, FREE_PLAN};

/// `client_id`가 없거나 비어 있는 방문자가 함께 쓰는 키
const ANONYMOUS_CLIENT: &str = "anonymous";
const MAX_CLIENT_ID_LEN: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct QuotaLimits {
    pub guest_daily: i64,
    pub member_daily: i64,
}

/// 사용량을 누구에게 귀속시킬지
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Guest { client_id: String },
    Member { user_id: String },
    Subscriber { user_id: String, plan: String },
}

impl Subject {
    pub fn resolve(user: Option<&User>, client_id: Option<&str>) -> Subject {
        match user {
            Some(user) if Plan::is_paid(&user.plan) => Subject::Subscriber {
                user_id: user.id.clone(),
                plan: user.plan.clone(),
            },
            Some(user) => Subject::Member {
                user_id: user.id.clone(),
            },
            None => {
                let client_id = client_id
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(|id| id.chars().take(MAX_CLIENT_ID_LEN).collect())
                    .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string());
                Subject::Guest { client_id }
            }
        }
    }

    pub fn key(&self) -> String {
        match self {
            Subject::Guest { client_id } => format!("client:{}", client_id),
            Subject::Member { user_id } | Subject::Subscriber { user_id, .. } => {
                format!("user:{}", user_id)
            }
        }
    }

    /// `X-Subscription-Plan`에 실리는 플랜 이름
    pub fn plan(&self) -> &str {
        match self {
            Subject::Guest { .. } | Subject::Member { .. } => FREE_PLAN,
            Subject::Subscriber { plan, .. } => plan,
        }
    }

    /// 하루 한도. `None`이면 무제한.
    pub fn daily_limit(&self, limits: QuotaLimits) -> Option<i64> {
        match self {
            Subject::Guest { .. } => Some(limits.guest_daily),
            Subject::Member { .. } => Some(limits.member_daily),
            Subject::Subscriber { .. } => None,
        }
    }

    /// 한도 초과 시 `X-Rate-Limit-Reached` 헤더 값.
    /// 클라이언트는 `free`일 때만 가입 유도 창을 띄웁니다.
    pub fn exhausted_tier(&self) -> &'static str {
        match self {
            Subject::Guest { .. } => "free",
            Subject::Member { .. } | Subject::Subscriber { .. } => "member",
        }
    }
}

pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// 지금 상태의 남은 횟수. 한도가 없는 subject는 `Quota::UNLIMITED`.
pub async fn current(
    pool: &SqlitePool,
    subject: &Subject,
    limits: QuotaLimits,
) -> Result<Quota, AppError> {
    let remaining = match subject.daily_limit(limits) {
        Some(limit) => {
            let used = db::usage_count(pool, &subject.key(), &today()).await?;
            (limit - used).max(0)
        }
        None => Quota::UNLIMITED,
    };

    Ok(Quota {
        plan: subject.plan().to_string(),
        remaining,
    })
}

/// 변환 성공 후 한 번 호출하여 사용량을 기록하고 남은 횟수를 돌려줍니다.
pub async fn record(
    pool: &SqlitePool,
    subject: &Subject,
    limits: QuotaLimits,
) -> Result<Quota, AppError> {
    let remaining = match subject.daily_limit(limits) {
        Some(limit) => {
            let used = db::increment_usage(pool, &subject.key(), &today()).await?;
            (limit - used).max(0)
        }
        None => Quota::UNLIMITED,
    };

    Ok(Quota {
        plan: subject.plan().to_string(),
        remaining,
    })
}
