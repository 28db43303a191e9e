//! # 클라이언트 라이브러리
//!
//! 브라우저 쪽 동작(편집기, 변환 버튼, 로그인/2단계 인증, 설정, 결제 버튼)을
//! DOM 없이 타입으로 표현한 모듈입니다. 컨트롤러가 `ViewModel`을 갱신하고,
//! 화면은 `ViewModel`만 읽어서 그립니다.
//!
//! - `api`: 서버 호출 경계(`Backend` 트레이트)와 reqwest 구현, `ClientError`
//! - `app`: 모든 컨트롤러를 묶은 페이지 단위 상태
//! - `billing`: 플랜 버튼과 결제 페이지 이동
//! - `editor`: 본문, 선택 영역, 톤
//! - `i18n`: 메시지 카탈로그 (기본 영어)
//! - `session`: 로그인 상태 기계
//! - `settings`: 설정 화면 파생 값과 설정 변경 동작
//! - `storage`: 로컬 저장소(메모리/JSON 파일)와 client id
//! - `transform`: 아홉 가지 변환 버튼
//! - `view`: 화면 상태

pub mod api;
pub mod app;
pub mod billing;
pub mod editor;
pub mod i18n;
pub mod session;
pub mod settings;
pub mod storage;
pub mod transform;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{Backend, ClientError, HttpBackend};
pub use app::App;
pub use editor::Editor;
pub use view::ViewModel;
