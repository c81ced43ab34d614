//! Corpus document: books -> chapters -> sections (headings and verses)

use crate::catalog;
use crate::tokens::{self, Script, Token};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub name_han: String,
    #[serde(default)]
    pub name_rom: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name_eng: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter: u32,
    #[serde(default)]
    pub chapter_title_han: String,
    #[serde(default)]
    pub chapter_title_rom: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Section {
    #[serde(alias = "section_title")]
    Heading(Heading),
    Verse(Verse),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Heading {
    #[serde(default)]
    pub han: String,
    #[serde(default)]
    pub rom: String,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

/// A verse's token stream and its stored flattened strings.
///
/// The token stream is authoritative: [`Verse::text`] derives the flattened
/// string from the tokens and only uses the stored string for its line-break
/// positions, or as the whole text when no token carries that script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Verse {
    pub verse: u32,
    #[serde(default)]
    pub rom: String,
    #[serde(default)]
    pub han: String,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl Verse {
    pub fn new(verse: u32, tokens: Vec<Token>) -> Self {
        let rom = tokens::flatten(&tokens, Script::Rom);
        let han = tokens::flatten(&tokens, Script::Han);
        Self { verse, rom, han, tokens }
    }

    /// Stored flattened string for `script`, line-break markers included
    pub fn stored(&self, script: Script) -> &str {
        match script {
            Script::Han => &self.han,
            Script::Rom => &self.rom,
        }
    }

    /// Break offsets recorded in the stored string for `script`
    pub fn breaks(&self, script: Script) -> Vec<usize> {
        tokens::break_offsets(self.stored(script))
    }

    pub fn has_breaks(&self) -> bool {
        self.han.contains(tokens::LINE_BREAK) || self.rom.contains(tokens::LINE_BREAK)
    }

    /// Flattened text for `script` with line-break markers
    pub fn text(&self, script: Script) -> Cow<'_, str> {
        if !tokens::has_script(&self.tokens, script) {
            return Cow::Borrowed(self.stored(script));
        }
        let flat = tokens::flatten(&self.tokens, script);
        let breaks = self.breaks(script);
        if breaks.is_empty() {
            Cow::Owned(flat)
        } else {
            Cow::Owned(tokens::insert_breaks(&flat, &breaks))
        }
    }

    /// Stored string for `script` without line-break markers, as read and
    /// searched. Falls back to the token forms when nothing is stored.
    pub fn plain_text(&self, script: Script) -> Cow<'_, str> {
        let stored = self.stored(script);
        if stored.is_empty() {
            Cow::Owned(tokens::flatten(&self.tokens, script))
        } else if stored.contains(tokens::LINE_BREAK) {
            Cow::Owned(tokens::strip_breaks(stored))
        } else {
            Cow::Borrowed(stored)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.iter().all(Token::is_empty) && self.han.is_empty() && self.rom.is_empty()
    }
}

impl Chapter {
    pub fn verses(&self) -> impl Iterator<Item = &Verse> {
        self.sections.iter().filter_map(|s| match s {
            Section::Verse(v) => Some(v),
            Section::Heading(_) => None,
        })
    }

    pub fn verse(&self, number: u32) -> Option<&Verse> {
        self.verses().find(|v| v.verse == number)
    }
}

impl Book {
    pub fn chapter(&self, number: u32) -> Option<(usize, &Chapter)> {
        self.chapters
            .iter()
            .enumerate()
            .find(|(_, c)| c.chapter == number)
    }
}

/// A verse with its position in the corpus
#[derive(Debug, Clone, Copy)]
pub struct VerseRef<'a> {
    pub book_index: usize,
    pub book: &'a Book,
    pub chapter_index: usize,
    pub chapter: &'a Chapter,
    pub verse: &'a Verse,
}

/// A verse whose token stream disagrees with its stored flattened string
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Divergence {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub script: Script,
    pub from_tokens: String,
    pub stored: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
    pub tokens: usize,
}

impl Corpus {
    /// Parse a corpus document and fill in missing chapter titles
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let mut corpus: Corpus =
            serde_json::from_slice(bytes).context("Failed to parse corpus document")?;
        corpus.fill_chapter_titles();
        Ok(corpus)
    }

    fn fill_chapter_titles(&mut self) {
        for chapter in self.books.iter_mut().flat_map(|b| b.chapters.iter_mut()) {
            if chapter.chapter_title_han.is_empty() {
                chapter.chapter_title_han = catalog::chapter_title_han(chapter.chapter);
            }
            if chapter.chapter_title_rom.is_empty() {
                chapter.chapter_title_rom = catalog::chapter_title_rom(chapter.chapter);
            }
        }
    }

    pub fn book(&self, name_han: &str) -> Option<(usize, &Book)> {
        self.books
            .iter()
            .enumerate()
            .find(|(_, b)| b.name_han == name_han)
    }

    /// Every verse of every chapter of every book, in corpus order
    pub fn verses(&self) -> impl Iterator<Item = VerseRef<'_>> {
        self.books.iter().enumerate().flat_map(|(book_index, book)| {
            book.chapters
                .iter()
                .enumerate()
                .flat_map(move |(chapter_index, chapter)| {
                    chapter.verses().map(move |verse| VerseRef {
                        book_index,
                        book,
                        chapter_index,
                        chapter,
                        verse,
                    })
                })
        })
    }

    pub fn stats(&self) -> CorpusStats {
        let mut stats = CorpusStats {
            books: self.books.len(),
            chapters: self.books.iter().map(|b| b.chapters.len()).sum(),
            ..Default::default()
        };
        for r in self.verses() {
            stats.verses += 1;
            stats.tokens += r.verse.tokens.len();
        }
        stats
    }

    /// Verses whose tokens do not reproduce the stored string (markers stripped).
    /// Verses without any token form for a script are not checked for it.
    pub fn divergences(&self) -> Vec<Divergence> {
        let mut out = Vec::new();
        for r in self.verses() {
            for script in [Script::Han, Script::Rom] {
                if !tokens::has_script(&r.verse.tokens, script) {
                    continue;
                }
                let from_tokens = tokens::flatten(&r.verse.tokens, script);
                let stored = tokens::strip_breaks(r.verse.stored(script));
                if from_tokens != stored {
                    out.push(Divergence {
                        book: r.book.name_han.clone(),
                        chapter: r.chapter.chapter,
                        verse: r.verse.verse,
                        script,
                        from_tokens,
                        stored,
                    });
                }
            }
        }
        out
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::tokens::WordForm;

    /// Genesis 1:1-3 plus a heading and a two-line verse in chapter 2
    pub fn genesis() -> Corpus {
        let v1 = Verse::new(
            1,
            vec![
                Token::word("起初", "Kî-táu ").with_form(WordForm::Phrase),
                Token::word("上帝", "Sang-dā̤ ").with_form(WordForm::Phrase),
                Token::word("造", "cō ").with_form(WordForm::Single),
                Token::word("天地", "teng-dē").with_form(WordForm::Phrase),
                Token::punct("。").with_rom("."),
            ],
        );
        let v2 = Verse::new(
            2,
            vec![
                Token::word("地", "Dē ").with_form(WordForm::Single),
                Token::word("空虛", "kung-hṳ").with_form(WordForm::Phrase),
                Token::punct("，"),
            ],
        );
        let v3 = Verse::new(
            3,
            vec![
                Token::word("上帝", "Neq-sing ").with_form(WordForm::Phrase),
                Token::word("講", "gō̤ng").with_form(WordForm::Single),
            ],
        );
        let mut poem = Verse::new(
            1,
            vec![Token::word("我", "Gua "), Token::word("唱", "chiō̤ng")],
        );
        poem.han = "我\n唱".to_string();
        poem.rom = "Gua \nchiō̤ng".to_string();

        Corpus {
            books: vec![Book {
                name_han: "創世記".to_string(),
                name_rom: "Cho̤̍ng-sa̤-gi̍".to_string(),
                name_eng: "Genesis".to_string(),
                chapters: vec![
                    Chapter {
                        chapter: 1,
                        chapter_title_han: "第一章".to_string(),
                        chapter_title_rom: "Dā̤ 1 Ca̤uⁿ".to_string(),
                        sections: vec![
                            Section::Heading(Heading {
                                han: "創造".to_string(),
                                ..Default::default()
                            }),
                            Section::Verse(v1),
                            Section::Verse(v2),
                            Section::Verse(v3),
                        ],
                    },
                    Chapter {
                        chapter: 2,
                        chapter_title_han: "第二章".to_string(),
                        chapter_title_rom: "Dā̤ 2 Ca̤uⁿ".to_string(),
                        sections: vec![Section::Verse(poem)],
                    },
                ],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "books": [{
            "name_han": "路得記",
            "name_rom": "Lō-deh Gi̍",
            "chapters": [{
                "chapter": 2,
                "sections": [
                    {"type": "section_title", "han": "路得拾麥", "rom": "", "tokens": []},
                    {"type": "verse", "verse": 1, "rom": "Lō-deh", "han": "路得\n。",
                     "tokens": [
                        {"type": "word", "han": "路得", "rom": "Lō-deh", "form": "phrase"},
                        {"type": "punct", "han": "。", "rom": ""}
                     ]},
                    {"type": "verse", "verse": 3, "rom": "Rom only", "han": ""}
                ]
            }]
        }]
    }"#;

    #[test]
    fn test_parse_document() {
        let corpus = Corpus::from_json(DOC.as_bytes()).unwrap();
        let chapter = &corpus.books[0].chapters[0];
        assert_eq!(chapter.chapter_title_han, "第二章");
        assert_eq!(chapter.chapter_title_rom, "Dā̤ 2 Ca̤uⁿ");
        assert!(matches!(chapter.sections[0], Section::Heading(_)));
        assert_eq!(chapter.verses().map(|v| v.verse).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(corpus.stats().tokens, 2);
    }

    #[test]
    fn test_text_prefers_tokens_and_keeps_breaks() {
        let corpus = Corpus::from_json(DOC.as_bytes()).unwrap();
        let chapter = &corpus.books[0].chapters[0];
        let v1 = chapter.verse(1).unwrap();
        assert_eq!(v1.text(Script::Han), "路得\n。");
        assert_eq!(v1.text(Script::Rom), "Lō-deh");

        let v3 = chapter.verse(3).unwrap();
        assert_eq!(v3.text(Script::Rom), "Rom only");
        assert_eq!(v3.text(Script::Han), "");
    }

    #[test]
    fn test_plain_text_keeps_stored_spacing() {
        let v = Verse {
            verse: 1,
            rom: "Kî-táu \nSang-dā cō.".to_string(),
            han: String::new(),
            tokens: vec![Token::word("起初", "Kî-táu"), Token::word("上帝", "Sang-dā"), Token::word("造", "cō")],
        };
        assert_eq!(v.plain_text(Script::Rom), "Kî-táu Sang-dā cō.");
        assert_eq!(v.plain_text(Script::Han), "起初上帝造");
    }

    #[test]
    fn test_tokens_reproduce_flattened_strings() {
        let corpus = fixtures::genesis();
        assert!(corpus.divergences().is_empty());
        for r in corpus.verses() {
            for script in [Script::Han, Script::Rom] {
                assert_eq!(
                    tokens::flatten(&r.verse.tokens, script),
                    tokens::strip_breaks(r.verse.stored(script))
                );
            }
        }
    }

    #[test]
    fn test_divergence_reported() {
        let mut corpus = fixtures::genesis();
        if let Section::Verse(v) = &mut corpus.books[0].chapters[0].sections[1] {
            v.han = "起初上帝".to_string();
        }
        let found = corpus.divergences();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].verse, 1);
        assert_eq!(found[0].script, Script::Han);
    }

    #[test]
    fn test_verses_in_corpus_order() {
        let corpus = fixtures::genesis();
        let refs: Vec<(u32, u32)> = corpus
            .verses()
            .map(|r| (r.chapter.chapter, r.verse.verse))
            .collect();
        assert_eq!(refs, vec![(1, 1), (1, 2), (1, 3), (2, 1)]);
    }
}
