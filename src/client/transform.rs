//! # 변환 버튼 컨트롤러
//!
//! 아홉 개 버튼이 컨트롤러 하나를 씁니다. 한 번의 실행은 [`TransformController::begin`]
//! (검증, 대상 저장, 버튼 잠금)과 [`TransformController::finish`] (잠금 해제, 결과 표시)로
//! 나뉩니다. 실행 중에는 다른 `begin`을 거부합니다.

use crate::models::{Tone, TransformKind, TransformRequest};

use super::api::{Backend, ClientError, TransformReply};
use super::editor::{Capture, Editor};
use super::i18n::Catalog;
use super::view::{StatusKind, SuggestionPanel, ViewModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// 다른 변환이 아직 진행 중
    Busy,
    /// 보낼 내용이 없음. 상태 줄에 입력을 요청합니다.
    EmptyInput,
}

/// 시작된 실행. [`TransformController::finish`]에 다시 넘깁니다.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub kind: TransformKind,
    pub request: TransformRequest,
    capture: Capture,
    tone: Tone,
}

#[derive(Debug, Clone)]
struct Pending {
    kind: TransformKind,
    capture: Capture,
    result: String,
}

#[derive(Debug, Default)]
pub struct TransformController {
    in_flight: bool,
    pending: Option<Pending>,
}

/// 문구 키: (진행 중 상태, 제안 안내, 적용 후 상태)
fn labels(kind: TransformKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        TransformKind::Complete => ("suggesting", "suggestedHint", "inserted"),
        TransformKind::Rewrite => ("rewriting", "rewrittenHint", "replaced"),
        TransformKind::Grammar => ("fixing", "corrected", "applied"),
        TransformKind::Summarize => ("summarizing", "summary", "applied"),
        TransformKind::Expand => ("expanding", "expanded", "applied"),
        TransformKind::Bullets => ("converting", "converted", "applied"),
        TransformKind::Simplify => ("simplifying", "simplified", "applied"),
        TransformKind::Paraphrase => ("paraphrasing", "paraphrased", "applied"),
        TransformKind::Outline => ("creatingOutline", "outlineHint", "applied"),
    }
}

impl TransformController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn has_suggestion(&self) -> bool {
        self.pending.is_some()
    }

    pub fn begin(
        &mut self,
        kind: TransformKind,
        editor: &Editor,
        client_id: Option<&str>,
        catalog: &dyn Catalog,
        view: &mut ViewModel,
    ) -> Result<Ticket, Refusal> {
        if self.in_flight {
            return Err(Refusal::Busy);
        }

        let Some(capture) = editor.capture(kind) else {
            let key = match kind {
                TransformKind::Complete => "typeText",
                _ => "selectText",
            };
            view.set_status(catalog.tr(key), StatusKind::Plain);
            return Err(Refusal::EmptyInput);
        };

        let tone = editor.tone();
        let request = TransformRequest {
            text: Some(capture.text.clone()),
            tone: (kind == TransformKind::Rewrite).then(|| tone.as_str().to_string()),
            client_id: client_id.map(str::to_string),
        };

        self.in_flight = true;
        view.controls_disabled = true;
        view.set_status(catalog.tr(labels(kind).0), StatusKind::Loading);

        Ok(Ticket {
            kind,
            request,
            capture,
            tone,
        })
    }

    pub fn finish(
        &mut self,
        ticket: Ticket,
        result: Result<TransformReply, ClientError>,
        catalog: &dyn Catalog,
        view: &mut ViewModel,
    ) {
        self.in_flight = false;
        view.controls_disabled = false;

        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                if let ClientError::RateLimited {
                    quota: Some(quota), ..
                } = &err
                {
                    view.update_plan_badge(Some(quota), catalog);
                }
                if err.opens_signup_prompt() {
                    view.modals.rate_limit = true;
                }
                tracing::debug!(kind = %ticket.kind, error = %err, "transform failed");
                view.set_status(err.to_string(), StatusKind::Error);
                return;
            }
        };

        if let Some(quota) = &reply.quota {
            view.update_plan_badge(Some(quota), catalog);
        }

        let output = reply.response.output(ticket.kind).unwrap_or_default();
        if output.is_empty() {
            // 이전 제안은 그대로 둡니다.
            let key = match ticket.kind {
                TransformKind::Complete => "noSuggestion",
                _ => "noResult",
            };
            view.set_status(catalog.tr(key), StatusKind::Plain);
            return;
        }

        let hint_key = labels(ticket.kind).1;
        let hint = match ticket.kind {
            TransformKind::Rewrite => catalog
                .tr(hint_key)
                .replace("{tone}", &catalog.tr(ticket.tone.as_str())),
            _ => catalog.tr(hint_key),
        };
        view.suggestion = Some(SuggestionPanel {
            hint,
            text: output.to_string(),
        });
        view.set_status(catalog.tr("ready"), StatusKind::Plain);

        self.pending = Some(Pending {
            kind: ticket.kind,
            capture: ticket.capture,
            result: output.to_string(),
        });
    }

    pub async fn run(
        &mut self,
        kind: TransformKind,
        editor: &Editor,
        backend: &dyn Backend,
        client_id: Option<&str>,
        catalog: &dyn Catalog,
        view: &mut ViewModel,
    ) -> Result<(), Refusal> {
        let ticket = self.begin(kind, editor, client_id, catalog, view)?;
        let result = backend.transform(kind, &ticket.request).await;
        self.finish(ticket, result, catalog, view);
        Ok(())
    }

    /// 제안 패널 클릭. 적용할 것이 없으면 `false`
    pub fn apply(&mut self, editor: &mut Editor, catalog: &dyn Catalog, view: &mut ViewModel) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        editor.apply(&pending.capture, &pending.result);
        view.suggestion = None;
        view.update_char_count(editor.char_count(), catalog);
        view.set_status(catalog.tr(labels(pending.kind).2), StatusKind::Success);
        true
    }
}
