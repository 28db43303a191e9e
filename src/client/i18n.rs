//! # 문구 조회
//!
//! 번역은 이 크레이트 밖에 있습니다. 기본 구현은 [`English`]이고 모르는 키는 그대로 돌려줍니다.

pub trait Catalog: Send + Sync {
    fn lookup(&self, key: &str) -> Option<&str>;

    fn tr(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct English;

impl Catalog for English {
    fn lookup(&self, key: &str) -> Option<&str> {
        let text = match key {
            "typeText" => "Type some text first.",
            "selectText" => "Select or type some text first.",
            "suggesting" => "Suggesting...",
            "rewriting" => "Rewriting...",
            "fixing" => "Fixing grammar...",
            "summarizing" => "Summarizing...",
            "expanding" => "Expanding...",
            "converting" => "Converting to bullets...",
            "simplifying" => "Simplifying...",
            "paraphrasing" => "Paraphrasing...",
            "creatingOutline" => "Creating outline...",
            "suggestedHint" => "Suggestion (click to insert)",
            "rewrittenHint" => "Rewritten ({tone}), click to replace",
            "corrected" => "Corrected (click to apply)",
            "summary" => "Summary (click to apply)",
            "expanded" => "Expanded (click to apply)",
            "converted" => "Bullets (click to apply)",
            "simplified" => "Simplified (click to apply)",
            "paraphrased" => "Paraphrased (click to apply)",
            "outlineHint" => "Outline (click to apply)",
            "inserted" => "Inserted.",
            "replaced" => "Replaced.",
            "applied" => "Applied.",
            "ready" => "Ready.",
            "noSuggestion" => "No suggestion.",
            "noResult" => "No result.",
            "loading" => "Loading...",
            "formal" => "Formal",
            "casual" => "Casual",
            "concise" => "Concise",
            "elaborate" => "Elaborate",
            "plan" => "plan",
            "left" => "left",
            "charCount" => "characters",
            "charCountOne" => "character",
            "verified" => "Verified",
            "twoFactor" => "Two-factor authentication",
            "emailChanged" => "Email updated.",
            "passwordChanged" => "Password updated.",
            "codeSent" => "Code sent.",
            "login" => "Log in",
            "register" => "Sign up",
            _ => return None,
        };
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_echo() {
        assert_eq!(English.tr("ready"), "Ready.");
        assert_eq!(English.tr("no-such-key"), "no-such-key");
    }
}
