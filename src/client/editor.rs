use std::ops::Range;

use crate::models::{Tone, TransformKind};

use super::storage::{KeyValueStore, EDITOR_KEY, TONE_KEY};

/// 변환 대상. 요청을 시작할 때 잡아 둡니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub text: String,
    pub target: Target,
}

/// 결과를 적용할 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 내용의 이 바이트 구간을 교체
    Span(Range<usize>),
    /// 내용 전체를 `captured + " " + result`로 교체
    Append,
}

/// 편집기 내용, 선택 영역(문자 경계의 바이트 오프셋), 톤
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    content: String,
    selection: Range<usize>,
    tone: Tone,
}

fn floor_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn clamp(s: &str, range: Range<usize>) -> Range<usize> {
    let start = floor_boundary(s, range.start);
    let end = floor_boundary(s, range.end).max(start);
    start..end
}

impl Editor {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let end = content.len();
        Self {
            content,
            selection: end..end,
            tone: Tone::default(),
        }
    }

    /// [`Editor::persist`]로 저장한 내용과 톤을 복원합니다.
    /// 더 이상 없는 톤이면 무시합니다.
    pub fn restore(store: &dyn KeyValueStore) -> Self {
        let mut editor = Editor::new(store.get(EDITOR_KEY).unwrap_or_default());
        if let Some(tone) = store.get(TONE_KEY).as_deref().and_then(Tone::parse) {
            editor.tone = tone;
        }
        editor
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    /// 사용자 입력으로 내용을 교체하고 커서는 끝으로 옮깁니다.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        let end = self.content.len();
        self.selection = end..end;
    }

    pub fn select(&mut self, range: Range<usize>) {
        self.selection = clamp(&self.content, range);
    }

    pub fn selected_text(&self) -> &str {
        &self.content[self.selection.clone()]
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// `kind`의 입력: 선택 영역이 있으면 선택 영역, 없으면 전체 내용.
    /// complete는 항상 앞뒤 공백을 뺀 전체 내용을 씁니다.
    /// 입력이 비어 있으면 `None`
    pub fn capture(&self, kind: TransformKind) -> Option<Capture> {
        let capture = match kind {
            TransformKind::Complete => Capture {
                text: self.content.trim().to_string(),
                target: Target::Append,
            },
            _ if !self.selection.is_empty() => Capture {
                text: self.selected_text().to_string(),
                target: Target::Span(self.selection.clone()),
            },
            _ => Capture {
                text: self.content.clone(),
                target: Target::Span(0..self.content.len()),
            },
        };
        (!capture.text.trim().is_empty()).then_some(capture)
    }

    /// 잡아 둔 대상 위치에 `result`를 씁니다. 구간은 요청 시점의 것이고,
    /// 그 사이 내용이 줄었다면 현재 길이에 맞춰 자릅니다.
    pub fn apply(&mut self, capture: &Capture, result: &str) {
        match &capture.target {
            Target::Append => {
                self.set_content(format!("{} {}", capture.text, result));
            }
            Target::Span(span) => {
                let span = clamp(&self.content, span.clone());
                self.content.replace_range(span.clone(), result);
                let caret = span.start + result.len();
                self.selection = caret..caret;
            }
        }
    }

    pub fn persist(&self, store: &mut dyn KeyValueStore) {
        store.set(EDITOR_KEY, &self.content);
        store.set(TONE_KEY, self.tone.as_str());
    }
}
