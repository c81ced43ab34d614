//! Verse -> scanned page alignment over any set of page indexes

use crate::corpus::Chapter;
use crate::pages::{PageId, PageLookup};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do when no index knows the requested book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Unmapped books resolve to no page
    #[default]
    None,
    /// Resolve unmapped books against this book's pages instead.
    /// Produces wrong links for every other book; opt-in only.
    DefaultBook(String),
}

/// Page links for the verses of one chapter, keyed by verse number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageAnnotations {
    pages: BTreeMap<u32, PageId>,
}

impl PageAnnotations {
    pub fn get(&self, verse: u32) -> Option<&PageId> {
        self.pages.get(&verse)
    }

    pub fn insert(&mut self, verse: u32, page: PageId) {
        self.pages.insert(verse, page);
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }
}

/// Resolves references through indexes tried in priority order
pub struct Resolver<'a> {
    indexes: Vec<&'a dyn PageLookup>,
    fallback: FallbackPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(indexes: Vec<&'a dyn PageLookup>) -> Self {
        Self { indexes, fallback: FallbackPolicy::None }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Book name to query: the requested one if any index knows it, else the
    /// fallback book when the policy allows it.
    fn effective_book<'b>(&'b self, book: &'b str) -> Option<&'b str> {
        if self.indexes.iter().any(|i| i.has_book(book)) {
            return Some(book);
        }
        match &self.fallback {
            FallbackPolicy::None => None,
            FallbackPolicy::DefaultBook(default) => {
                tracing::debug!(book, fallback = %default, "Book not indexed, using fallback book");
                Some(default.as_str())
            }
        }
    }

    /// Page on which (chapter, verse) of `book` appears
    pub fn resolve_page(&self, book: &str, chapter: u32, verse: u32) -> Option<PageId> {
        let book = self.effective_book(book)?;
        self.indexes
            .iter()
            .filter(|i| i.has_book(book))
            .find_map(|i| i.lookup(book, chapter, verse))
    }

    /// Page on which `chapter` of `book` begins
    pub fn resolve_chapter_start_page(&self, book: &str, chapter: u32) -> Option<PageId> {
        let book = self.effective_book(book)?;
        self.indexes
            .iter()
            .filter(|i| i.has_book(book))
            .find_map(|i| i.chapter_start(book, chapter))
    }

    /// Unified lookup; identical to [`Resolver::resolve_page`]
    pub fn lookup(&self, book: &str, chapter: u32, verse: u32) -> Option<PageId> {
        self.resolve_page(book, chapter, verse)
    }

    /// Page links for every verse of `chapter`
    pub fn annotate(&self, book: &str, chapter: &Chapter) -> PageAnnotations {
        let mut annotations = PageAnnotations::default();
        for verse in chapter.verses() {
            if let Some(page) = self.resolve_page(book, chapter.chapter, verse.verse) {
                annotations.insert(verse.verse, page);
            }
        }
        annotations
    }
}
