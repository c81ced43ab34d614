//! Full-text search over both scripts of every verse
//!
//! A linear scan in corpus order. The corpus is small and immutable; a larger
//! one would want a precomputed substring index instead.

use crate::corpus::Corpus;
use crate::tokens::Script;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Case-fold text for Romanized matching, keeping for each folded char the
/// index of the original char it came from.
fn fold_case(text: &str) -> (Vec<char>, Vec<usize>) {
    let mut folded = Vec::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        for lower in c.to_lowercase() {
            folded.push(lower);
            origin.push(i);
        }
    }
    (folded, origin)
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// First match of a highlight, in characters of the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub offset: usize,
    pub length: usize,
}

impl MatchSpan {
    /// Split `text` into (before, matched, after) for highlighting
    pub fn split<'a>(&self, text: &'a str) -> (&'a str, &'a str, &'a str) {
        let byte_at = |chars: usize| {
            text.char_indices()
                .nth(chars)
                .map_or(text.len(), |(b, _)| b)
        };
        let start = byte_at(self.offset);
        let end = byte_at(self.offset + self.length);
        (&text[..start], &text[start..end], &text[end..])
    }
}

/// Case-insensitive first match of `term` in Romanized `text`
pub fn rom_match(text: &str, term: &str) -> Option<MatchSpan> {
    let (needle, _) = fold_case(term);
    let (haystack, origin) = fold_case(text);
    let start = find_chars(&haystack, &needle)?;
    let first = origin[start];
    let last = origin[start + needle.len() - 1];
    Some(MatchSpan { offset: first, length: last - first + 1 })
}

/// Exact first match of `term` in Han `text`
pub fn han_match(text: &str, term: &str) -> Option<MatchSpan> {
    if term.is_empty() {
        return None;
    }
    let byte = text.find(term)?;
    Some(MatchSpan {
        offset: text[..byte].chars().count(),
        length: term.chars().count(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Han name of the book
    pub book: String,
    pub chapter: u32,
    /// Position of the chapter within its book, for click-through
    pub chapter_index: usize,
    pub verse: u32,
    pub rom_text: String,
    pub han_text: String,
    pub rom_span: Option<MatchSpan>,
    pub han_span: Option<MatchSpan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    /// Blank query: nothing was searched, as opposed to "no matches"
    pub blank_query: bool,
    pub total_hits: usize,
    pub results: Vec<Hit>,
    pub elapsed_ms: u64,
}

pub struct SearchEngine {
    corpus: Arc<Corpus>,
}

impl SearchEngine {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }

    /// Every verse whose Romanized text contains `term` case-insensitively or
    /// whose Han text contains it exactly, in corpus order. Matches and spans
    /// are against the stored verse text, line-break markers removed.
    pub fn search(&self, term: &str) -> Vec<Hit> {
        if term.trim().is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for r in self.corpus.verses() {
            let rom_text = r.verse.plain_text(Script::Rom);
            let han_text = r.verse.plain_text(Script::Han);
            let rom_span = rom_match(&rom_text, term);
            let han_span = han_match(&han_text, term);
            if rom_span.is_none() && han_span.is_none() {
                continue;
            }
            hits.push(Hit {
                book: r.book.name_han.clone(),
                chapter: r.chapter.chapter,
                chapter_index: r.chapter_index,
                verse: r.verse.verse,
                rom_text: rom_text.into_owned(),
                han_text: han_text.into_owned(),
                rom_span,
                han_span,
            });
        }
        hits
    }

    /// Search with paging and timing
    pub fn query(&self, term: &str, limit: usize, offset: usize) -> SearchResults {
        let start = std::time::Instant::now();
        let hits = self.search(term);
        Self::page(term, &hits, limit, offset, start)
    }

    pub(crate) fn page(
        term: &str,
        hits: &[Hit],
        limit: usize,
        offset: usize,
        start: std::time::Instant,
    ) -> SearchResults {
        SearchResults {
            query: term.to_string(),
            blank_query: term.trim().is_empty(),
            total_hits: hits.len(),
            results: hits.iter().skip(offset).take(limit).cloned().collect(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }
}
