//! Token types and script forms

use serde::{Deserialize, Deserializer, Serialize};

/// Typesetting line-break marker embedded in flattened verse strings
pub const LINE_BREAK: char = '\n';
/// [`LINE_BREAK`] as a string, for text segments
pub const LINE_BREAK_STR: &str = "\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Han,
    Rom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Word,
    Punct,
}

/// Morphological/display form of a word token. Styling only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordForm {
    Single,
    CompoundSingle,
    Phrase,
    Compound,
    #[serde(other)]
    Other,
}

impl WordForm {
    pub fn class_name(&self) -> &'static str {
        match self {
            WordForm::Single => "single",
            WordForm::CompoundSingle => "compound_single",
            WordForm::Phrase => "phrase",
            WordForm::Compound => "compound",
            WordForm::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub han: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub rom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<WordForm>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub proper_name: bool,
}

impl Token {
    pub fn word(han: &str, rom: &str) -> Self {
        Self {
            kind: TokenKind::Word,
            han: non_empty(han),
            rom: non_empty(rom),
            form: None,
            proper_name: false,
        }
    }

    pub fn punct(han: &str) -> Self {
        Self {
            kind: TokenKind::Punct,
            han: non_empty(han),
            rom: None,
            form: None,
            proper_name: false,
        }
    }

    pub fn with_form(mut self, form: WordForm) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_rom(mut self, rom: &str) -> Self {
        self.rom = non_empty(rom);
        self
    }

    pub fn form(&self, script: Script) -> Option<&str> {
        match script {
            Script::Han => self.han.as_deref(),
            Script::Rom => self.rom.as_deref(),
        }
    }

    /// Number of characters this token contributes to the given script
    pub fn char_len(&self, script: Script) -> usize {
        self.form(script).map_or(0, |f| f.chars().count())
    }

    /// A token with neither form renders as nothing
    pub fn is_empty(&self) -> bool {
        self.han.is_none() && self.rom.is_none()
    }
}

/// Concatenate each token's form for `script`, skipping tokens without one.
pub fn flatten(tokens: &[Token], script: Script) -> String {
    tokens.iter().filter_map(|t| t.form(script)).collect()
}

/// Whether any token carries a form for `script`
pub fn has_script(tokens: &[Token], script: Script) -> bool {
    tokens.iter().any(|t| t.form(script).is_some())
}

/// Character offsets of line-break markers, counted in non-marker characters.
pub fn break_offsets(text: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut consumed = 0;
    for c in text.chars() {
        if c == LINE_BREAK {
            offsets.push(consumed);
        } else {
            consumed += 1;
        }
    }
    offsets
}

pub fn strip_breaks(text: &str) -> String {
    text.chars().filter(|&c| c != LINE_BREAK).collect()
}

/// Re-insert line-break markers into `text` at the recorded offsets.
pub fn insert_breaks(text: &str, offsets: &[usize]) -> String {
    let mut out = String::with_capacity(text.len() + offsets.len());
    let mut pending = offsets.iter().peekable();
    for (i, c) in text.chars().enumerate() {
        while pending.next_if(|&&o| o <= i).is_some() {
            out.push(LINE_BREAK);
        }
        out.push(c);
    }
    for _ in pending {
        out.push(LINE_BREAK);
    }
    out
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_skips_missing_forms() {
        let tokens = vec![
            Token::word("起初", "Kî-táu"),
            Token::punct("，"),
            Token::word("上帝", ""),
        ];
        assert_eq!(flatten(&tokens, Script::Han), "起初，上帝");
        assert_eq!(flatten(&tokens, Script::Rom), "Kî-táu");
    }

    #[test]
    fn test_malformed_token_is_empty() {
        let token = Token::word("", "");
        assert!(token.is_empty());
        assert_eq!(flatten(&[token], Script::Han), "");
    }

    #[test]
    fn test_deserialize_empty_rom_as_absent() {
        let token: Token =
            serde_json::from_str(r#"{"type":"punct","han":"。","rom":""}"#).unwrap();
        assert_eq!(token.kind, TokenKind::Punct);
        assert_eq!(token.rom, None);

        let word: Token =
            serde_json::from_str(r#"{"type":"word","han":"地","rom":"dē","form":"weird"}"#)
                .unwrap();
        assert_eq!(word.form, Some(WordForm::Other));
    }

    #[test]
    fn test_line_break_constants_agree() {
        assert!(LINE_BREAK_STR.chars().eq([LINE_BREAK]));
    }

    #[test]
    fn test_break_offsets_round_trip() {
        let text = "上帝\n造天地";
        let offsets = break_offsets(text);
        assert_eq!(offsets, vec![2]);
        assert_eq!(insert_breaks(&strip_breaks(text), &offsets), text);
        assert_eq!(insert_breaks("ab", &[2, 2]), "ab\n\n");
    }
}
