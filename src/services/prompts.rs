//! # 변환별 시스템 지시문
//!
//! 변환 종류마다 고정된 시스템 지시문(system instruction) 하나가 대응합니다.
//! `rewrite`만 톤(formal/casual/concise/elaborate)에 따라 네 가지 중 하나를 고르며,
//! 알 수 없는 톤은 formal로 처리합니다.

use crate::models::{Tone, TransformKind};

/// 모든 변환에 같은 샘플링 온도를 사용합니다.
pub const TEMPERATURE: f32 = 0.7;

const COMPLETE: &str = "You are a writing assistant. Complete the following text naturally. \
Add only the next few words or sentence to continue the thought. Do not repeat the input. Be concise.";

const GRAMMAR: &str = "You are a grammar and style editor. Fix any grammar, spelling, punctuation, \
and clarity issues. Preserve the original tone and meaning. Return only the corrected text.";

const SUMMARIZE: &str = "You are a summarization assistant. Create a concise summary of the \
following text. Preserve the main ideas. Return only the summary, no preamble.";

const EXPAND: &str = "You are a writing assistant. Expand the following text into a fuller, more \
detailed paragraph or two. Add substance and elaboration without changing the core meaning. \
Return only the expanded text.";

const BULLETS: &str = "You are a writing assistant. If the input looks like prose/paragraphs, \
convert it to bullet points. If it looks like bullet points or a list, convert it to flowing \
prose. Return only the converted text.";

const SIMPLIFY: &str = "You are a clarity editor. Rewrite the following text in simple, plain \
language. Use short sentences and common words. Make it easy for anyone to understand. Return \
only the simplified text.";

const PARAPHRASE: &str = "You are a writing assistant. Paraphrase the following text using \
different wording and sentence structure while keeping exactly the same meaning and roughly the \
same length. Return only the paraphrased text.";

const OUTLINE: &str = "You are a writing assistant. Turn the following text into a structured \
outline with short headings and nested points that capture its main ideas in order. Return only \
the outline.";

const REWRITE_FORMAL: &str = "You are a writing assistant. Rewrite in a formal, professional \
tone. Keep the same meaning. Return only the rewritten text.";

const REWRITE_CASUAL: &str = "You are a writing assistant. Rewrite in a casual, friendly tone. \
Keep the same meaning. Return only the rewritten text.";

const REWRITE_CONCISE: &str = "You are a writing assistant. Rewrite more concisely. Remove \
filler, keep the core message. Return only the rewritten text.";

const REWRITE_ELABORATE: &str = "You are a writing assistant. Rewrite with more detail and \
elaboration. Return only the rewritten text.";

/// 톤별 rewrite 지시문
pub fn rewrite_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Formal => REWRITE_FORMAL,
        Tone::Casual => REWRITE_CASUAL,
        Tone::Concise => REWRITE_CONCISE,
        Tone::Elaborate => REWRITE_ELABORATE,
    }
}

/// 변환 종류(와 rewrite의 경우 요청된 톤 문자열)에 맞는 시스템 지시문을 고릅니다.
///
/// `tone`은 rewrite 외의 변환에서는 무시됩니다.
pub fn system_instruction(kind: TransformKind, tone: Option<&str>) -> &'static str {
    match kind {
        TransformKind::Complete => COMPLETE,
        TransformKind::Rewrite => {
            rewrite_instruction(tone.and_then(Tone::parse).unwrap_or_default())
        }
        TransformKind::Grammar => GRAMMAR,
        TransformKind::Summarize => SUMMARIZE,
        TransformKind::Expand => EXPAND,
        TransformKind::Bullets => BULLETS,
        TransformKind::Simplify => SIMPLIFY,
        TransformKind::Paraphrase => PARAPHRASE,
        TransformKind::Outline => OUTLINE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_tone_selects_its_own_instruction() {
        for tone in Tone::ALL {
            assert_eq!(
                system_instruction(TransformKind::Rewrite, Some(tone.as_str())),
                rewrite_instruction(tone)
            );
        }
        assert!(rewrite_instruction(Tone::Casual).contains("casual, friendly"));
    }

    #[test]
    fn unknown_or_missing_tone_falls_back_to_formal() {
        assert_eq!(
            system_instruction(TransformKind::Rewrite, Some("pirate")),
            REWRITE_FORMAL
        );
        assert_eq!(system_instruction(TransformKind::Rewrite, None), REWRITE_FORMAL);
    }

    #[test]
    fn every_kind_has_a_distinct_instruction() {
        let mut seen = std::collections::HashSet::new();
        for kind in TransformKind::ALL {
            assert!(seen.insert(system_instruction(kind, None)), "{kind} reuses a prompt");
        }
    }

    #[test]
    fn tone_is_ignored_outside_rewrite() {
        assert_eq!(
            system_instruction(TransformKind::Grammar, Some("casual")),
            system_instruction(TransformKind::Grammar, None)
        );
    }
}
