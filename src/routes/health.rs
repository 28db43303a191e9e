//! `GET /api/health`: 서버와 데이터베이스가 살아 있는지 확인합니다.
//!
//! 호스팅(Render 등)의 헬스체크가 이 경로를 호출합니다. 외부 API 키가
//! 설정되어 있는지도 함께 알려주어 배포 직후 설정 누락을 바로 확인할 수 있습니다.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{error::AppError, routes::AppState};

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    // 가장 가벼운 쿼리로 연결 풀 상태만 확인
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    Ok(Json(json!({
        "status": "ok",
        "payments": state.checkout.is_configured(),
    })))
}
