//! # Wordsmith
//!
//! AI 글쓰기 도우미의 서버와 클라이언트 라이브러리입니다.
//!
//! - 서버: `routes::router`가 `/api` 아래의 모든 엔드포인트를 묶고,
//!   `main.rs`가 세션/CORS/정적 파일 레이어를 씌워 실행합니다.
//! - 클라이언트: `client` 모듈이 편집기 상태, 변환/인증/결제 컨트롤러,
//!   화면 상태(ViewModel)를 UI 없이 다룹니다.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
