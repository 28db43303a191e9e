//! # Wordsmith 웹 서버 진입점
//!
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성과 마이그레이션
//! 4. 세션 저장소 준비
//! 5. 외부 서비스(언어 모델, 결제, 인증 코드 전달) 구성
//! 6. API 라우터 + 정적 파일 서빙
//! 7. HTTP 서버 시작

use std::{path::Path, sync::Arc};

use anyhow::Result;
use axum::{http::HeaderName, Router};
use sqlx::sqlite::SqlitePoolOptions;
use time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tower_sessions::{cookie::SameSite, ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wordsmith::{
    config::Config,
    db,
    models::{RATE_LIMIT_REACHED_HEADER, RATE_LIMIT_REMAINING_HEADER, SUBSCRIPTION_PLAN_HEADER},
    routes::{self, AppState},
    services::{
        checkout::StripeCheckout,
        llm::OpenAiProvider,
        quota::{self, QuotaLimits},
        verification::LogNotifier,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wordsmith=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting Wordsmith server on {}:{}", config.host, config.port);

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; transform requests will fail");
    }
    if config.stripe_secret_key.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY is not set; checkout is disabled");
    }

    // 기본 DATABASE_URL(sqlite:data/...)은 data 디렉토리가 있어야 파일을 만들 수 있습니다.
    if let Some(dir) = sqlite_parent_dir(&config.database_url) {
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await?;
            tracing::info!("Created database directory: {}", dir.display());
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // 어제 이전의 사용량 카운터는 더 이상 읽히지 않습니다.
    let pruned = db::prune_before(&pool, &quota::today()).await?;
    if pruned > 0 {
        tracing::info!(pruned, "Pruned old usage counters");
    }

    // 세션은 같은 SQLite 파일의 별도 테이블에 저장합니다.
    let session_store = SqliteStore::new(pool.clone());
    session_store.migrate().await?;
    tokio::spawn(
        session_store
            .clone()
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60)),
    );

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(7)));

    let state = AppState {
        pool,
        completions: Arc::new(OpenAiProvider::new(
            config.openai_api_key.clone(),
            &config.openai_model,
            &config.openai_base_url,
        )),
        checkout: Arc::new(StripeCheckout::new(
            config.stripe_secret_key.clone(),
            &config.stripe_api_base,
        )),
        notifier: Arc::new(LogNotifier),
        limits: QuotaLimits {
            guest_daily: config.guest_daily_limit,
            member_daily: config.member_daily_limit,
        },
        site_url: config.site_url.clone(),
        totp_issuer: config.totp_issuer.clone(),
    };

    // 브라우저 스크립트가 사용량 헤더를 읽을 수 있도록 노출합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(SUBSCRIPTION_PLAN_HEADER),
            HeaderName::from_static(RATE_LIMIT_REMAINING_HEADER),
            HeaderName::from_static(RATE_LIMIT_REACHED_HEADER),
        ]);

    let mut app = Router::new().merge(routes::router(state));

    let public_dir = Path::new(&config.public_dir);
    if public_dir.exists() {
        tracing::info!("Serving static files from {}", config.public_dir);
        app = app.fallback_service(ServeDir::new(public_dir));
    } else {
        tracing::warn!("Static directory {} not found, serving API only", config.public_dir);
    }

    let app = app
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// `sqlite:data/wordsmith.db?mode=rwc` → `data`. 메모리 DB나 현재 디렉토리 파일이면 `None`.
fn sqlite_parent_dir(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}
