//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수(또는 `.env` 파일)에서 서버 설정값을 읽어옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로
//! - `HOST`, `PORT`: 서버 바인딩 주소
//! - `SITE_URL`: 결제 완료/취소 후 돌아올 사이트 주소
//! - `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`: 언어 모델 API
//! - `STRIPE_SECRET_KEY`, `STRIPE_API_BASE`: 결제 API
//! - `GUEST_DAILY_LIMIT`, `MEMBER_DAILY_LIMIT`: 무료 사용량 한도
//! - `PUBLIC_DIR`: 정적 파일 디렉토리
//! - `SECURE_COOKIES`: 세션 쿠키에 Secure 속성 사용 여부
//! - `TOTP_ISSUER`: 2단계 인증 앱에 표시될 발급자 이름
//!
//! 필수 항목은 없습니다. API 키가 없으면 해당 기능만 "설정되지 않음" 에러로 응답합니다.

use std::env;
use std::str::FromStr;

/// 애플리케이션 전체 설정
///
/// 서버 시작 시 한 번 읽어온 후 AppState를 통해 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// 끝에 `/`가 없는 사이트 origin (예: "https://write.example.com")
    pub site_url: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    /// 계정 없는 방문자(client_id 기준)의 하루 변환 횟수
    pub guest_daily_limit: i64,
    /// 무료 계정의 하루 변환 횟수
    pub member_daily_limit: i64,
    pub public_dir: String,
    pub secure_cookies: bool,
    pub totp_issuer: String,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config를 만듭니다.
    ///
    /// 모든 값에 기본값이 있으므로 실패하지 않습니다.
    /// 숫자 파싱에 실패한 값도 기본값으로 대체됩니다.
    pub fn from_env() -> Self {
        let port = parse_or("PORT", 3000u16);

        // SITE_URL이 없으면 Render 같은 호스팅이 주는 외부 URL, 그것도 없으면 localhost
        let site_url = non_empty("SITE_URL")
            .or_else(|| non_empty("RENDER_EXTERNAL_URL"))
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/wordsmith.db?mode=rwc".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            site_url: site_url.trim_end_matches('/').to_string(),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            stripe_secret_key: non_empty("STRIPE_SECRET_KEY"),
            stripe_api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com/v1".to_string()),
            guest_daily_limit: parse_or("GUEST_DAILY_LIMIT", 5),
            member_daily_limit: parse_or("MEMBER_DAILY_LIMIT", 25),
            public_dir: env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()),
            secure_cookies: parse_or("SECURE_COOKIES", false),
            totp_issuer: env::var("TOTP_ISSUER").unwrap_or_else(|_| "Wordsmith".to_string()),
        }
    }
}

/// 빈 문자열은 "설정되지 않음"으로 취급합니다. (`.env`에 `KEY=`만 적힌 경우)
fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
