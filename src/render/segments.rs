//! Token streams -> rendered segments, with line-break reconciliation

use super::Segment;
use crate::corpus::{Heading, Verse};
use crate::tokens::{self, Script, Token, TokenKind, LINE_BREAK};
use regex_lite::Regex;
use std::iter::Peekable;
use std::slice::Iter;
use std::sync::OnceLock;

/// Borrowed view over anything with tokens and stored flattened strings
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextSource<'a> {
    pub tokens: &'a [Token],
    pub han: &'a str,
    pub rom: &'a str,
}

impl<'a> From<&'a Verse> for TextSource<'a> {
    fn from(v: &'a Verse) -> Self {
        Self { tokens: &v.tokens, han: &v.han, rom: &v.rom }
    }
}

impl<'a> From<&'a Heading> for TextSource<'a> {
    fn from(h: &'a Heading) -> Self {
        Self { tokens: &h.tokens, han: &h.han, rom: &h.rom }
    }
}

impl<'a> TextSource<'a> {
    fn stored(&self, script: Script) -> &'a str {
        match script {
            Script::Han => self.han,
            Script::Rom => self.rom,
        }
    }

    fn has_breaks(&self) -> bool {
        self.han.contains(LINE_BREAK) || self.rom.contains(LINE_BREAK)
    }
}

/// Emits break markers as the consumed character count passes their offsets
struct BreakCursor<'b> {
    pending: Peekable<Iter<'b, usize>>,
    consumed: usize,
}

impl<'b> BreakCursor<'b> {
    fn new(offsets: &'b [usize]) -> Self {
        Self { pending: offsets.iter().peekable(), consumed: 0 }
    }

    fn flush_due(&mut self, out: &mut Vec<Segment>) {
        while self.pending.next_if(|&&o| o <= self.consumed).is_some() {
            out.push(Segment::Break);
        }
    }

    fn advance(&mut self, chars: usize) {
        self.consumed += chars;
    }

    fn flush_rest(&mut self, out: &mut Vec<Segment>) {
        for _ in self.pending.by_ref() {
            out.push(Segment::Break);
        }
    }
}

/// Segments of one script: token forms when the tokens carry that script,
/// otherwise the stored string split on line-break markers.
pub(crate) fn script_segments(src: TextSource<'_>, script: Script) -> Vec<Segment> {
    if !tokens::has_script(src.tokens, script) {
        return text_segments(src.stored(script));
    }

    let offsets = tokens::break_offsets(src.stored(script));
    let mut cursor = BreakCursor::new(&offsets);
    let mut out = Vec::with_capacity(src.tokens.len() + offsets.len());

    for token in src.tokens {
        let Some(text) = token.form(script) else {
            continue;
        };
        cursor.flush_due(&mut out);
        out.push(match token.kind {
            TokenKind::Punct => Segment::Punct { text: text.to_string() },
            TokenKind::Word => Segment::Word {
                text: text.to_string(),
                form: token.form,
                proper_name: token.proper_name,
            },
        });
        cursor.advance(token.char_len(script));
    }
    cursor.flush_rest(&mut out);
    out
}

/// Interlinear stream: Han base with Romanized annotation per word.
///
/// Break offsets come from the stored Han string and are counted against Han
/// characters consumed. A multi-line verse gets one extra trailing break.
pub(crate) fn ruby_segments(src: TextSource<'_>) -> Vec<Segment> {
    if src.tokens.iter().all(Token::is_empty) {
        return script_segments(src, Script::Han);
    }

    let offsets = tokens::break_offsets(src.han);
    let mut cursor = BreakCursor::new(&offsets);
    let mut out = Vec::with_capacity(src.tokens.len() + offsets.len() + 1);

    for token in src.tokens {
        let segment = match (token.kind, token.han.as_deref(), token.rom.as_deref()) {
            (TokenKind::Punct, Some(han), _) => Segment::Punct { text: han.to_string() },
            (TokenKind::Word, Some(han), Some(rom)) => Segment::Ruby {
                base: han.to_string(),
                annotation: rom.to_string(),
                form: token.form,
                proper_name: token.proper_name,
            },
            (TokenKind::Word, Some(text), None) | (TokenKind::Word, None, Some(text)) => {
                Segment::Word {
                    text: text.to_string(),
                    form: token.form,
                    proper_name: token.proper_name,
                }
            }
            _ => continue,
        };
        cursor.flush_due(&mut out);
        out.push(segment);
        cursor.advance(token.char_len(Script::Han));
    }
    cursor.flush_rest(&mut out);

    if !offsets.is_empty() {
        out.push(Segment::Break);
    }
    out
}

/// Stored string split on markers: lines joined by breaks
pub(crate) fn text_segments(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (i, line) in text.split(LINE_BREAK).enumerate() {
        if i > 0 {
            out.push(Segment::Break);
        }
        if !line.is_empty() {
            out.push(Segment::Text { text: line.to_string() });
        }
    }
    out
}

fn terminal_pattern() -> &'static Regex {
    static TERMINAL: OnceLock<Regex> = OnceLock::new();
    TERMINAL.get_or_init(|| {
        Regex::new(r#"[\s.,;:!?'")\]…—“”‘’»。，、；：！？」』）]$"#)
            .expect("terminal punctuation pattern is valid")
    })
}

/// Whether a Romanized verse needs a synthesized space before the next verse
pub(crate) fn needs_separator(src: TextSource<'_>, rom_text: &str) -> bool {
    !rom_text.is_empty() && !src.has_breaks() && !terminal_pattern().is_match(rom_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(tokens: Vec<Token>, han: &str, rom: &str) -> Verse {
        Verse { verse: 1, han: han.to_string(), rom: rom.to_string(), tokens }
    }

    #[test]
    fn test_ruby_break_at_offset_and_trailing() {
        let v = verse(
            vec![Token::word("我", "Gua "), Token::word("唱", "chiō̤ng"), Token::punct("。")],
            "我\n唱。",
            "Gua chiō̤ng",
        );
        let segs = ruby_segments((&v).into());
        assert_eq!(segs.len(), 5);
        assert!(matches!(&segs[0], Segment::Ruby { base, .. } if base == "我"));
        assert_eq!(segs[1], Segment::Break);
        assert!(matches!(&segs[2], Segment::Ruby { annotation, .. } if annotation == "chiō̤ng"));
        assert_eq!(segs[3], Segment::Punct { text: "。".to_string() });
        assert_eq!(segs[4], Segment::Break);
    }

    #[test]
    fn test_ruby_single_form_tokens() {
        let v = verse(
            vec![
                Token::word("耶和華", ""),
                Token::word("", "Ngá"),
                Token::punct("，").with_rom(","),
                Token::word("", ""),
            ],
            "耶和華，",
            "Ngá,",
        );
        let segs = ruby_segments((&v).into());
        assert_eq!(
            segs,
            vec![
                Segment::Word { text: "耶和華".to_string(), form: None, proper_name: false },
                Segment::Word { text: "Ngá".to_string(), form: None, proper_name: false },
                Segment::Punct { text: "，".to_string() },
            ]
        );
    }

    #[test]
    fn test_break_inside_multi_char_token_lands_after_it() {
        let v = verse(
            vec![Token::word("起初", "a"), Token::word("上帝", "b")],
            "起\n初上帝",
            "ab",
        );
        let segs = script_segments((&v).into(), Script::Han);
        assert_eq!(segs[1], Segment::Break);
        assert_eq!(segs.len(), 3);
    }

    #[test]
    fn test_text_path_without_tokens() {
        let v = verse(vec![], "", "Line one\nLine two");
        let segs = script_segments((&v).into(), Script::Rom);
        assert_eq!(
            segs,
            vec![
                Segment::Text { text: "Line one".to_string() },
                Segment::Break,
                Segment::Text { text: "Line two".to_string() },
            ]
        );
        assert!(script_segments((&v).into(), Script::Han).is_empty());
    }

    #[test]
    fn test_separator_rules() {
        let plain = verse(vec![], "", "Kî-táu");
        assert!(needs_separator((&plain).into(), "Kî-táu"));
        assert!(!needs_separator((&plain).into(), "teng-dē."));
        assert!(!needs_separator((&plain).into(), "teng-dē "));
        assert!(!needs_separator((&plain).into(), ""));

        let poem = verse(vec![], "我\n唱", "Gua\nchiō̤ng");
        assert!(!needs_separator((&poem).into(), "Gua\nchiō̤ng"));
    }
}
