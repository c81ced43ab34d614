//! Page identifiers and the two page-index shapes (flat OCR list, chapter table)
//!
//! Both shapes implement [`PageLookup`], so the resolver is written once
//! against the trait.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Width of a page identifier; `5` is stored as `"0005"`
pub const PAGE_ID_WIDTH: usize = 4;
pub const MIN_PAGE: u32 = 1;
pub const MAX_PAGE: u32 = 1485;

/// Zero-padded scanned page identifier. Lexicographic order equals numeric order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn from_number(n: u32) -> Self {
        Self(format!("{:0width$}", n, width = PAGE_ID_WIDTH))
    }

    /// Accepts up to `PAGE_ID_WIDTH` digits, padding short ones, within
    /// `MAX_PAGE`; anything else is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > PAGE_ID_WIDTH || !raw.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        raw.parse::<u32>()
            .ok()
            .filter(|&n| n <= MAX_PAGE)
            .map(Self::from_number)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn number(&self) -> u32 {
        self.0.parse().unwrap_or(0)
    }

    pub fn next(&self) -> Option<Self> {
        let n = self.number();
        (n < MAX_PAGE).then(|| Self::from_number(n + 1))
    }

    pub fn prev(&self) -> Option<Self> {
        let n = self.number();
        (n > MIN_PAGE).then(|| Self::from_number(n - 1))
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Common lookup contract over every page-index shape
pub trait PageLookup: Send + Sync {
    /// Whether the index has any entry for `book`
    fn has_book(&self, book: &str) -> bool;

    /// Page containing (chapter, verse) of `book`
    fn lookup(&self, book: &str, chapter: u32, verse: u32) -> Option<PageId>;

    /// Page where `chapter` of `book` begins
    fn chapter_start(&self, book: &str, chapter: u32) -> Option<PageId>;
}

// ============ Flat OCR index ============

/// One OCR-detected page header: the reference that begins on that page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOcrEntry")]
pub struct OcrEntry {
    pub book_han: String,
    pub chapter: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse: Option<u32>,
}

/// Older OCR output names the book `book_hanci`; either key (or both) may appear
#[derive(Deserialize)]
struct RawOcrEntry {
    #[serde(default)]
    book_han: Option<String>,
    #[serde(default)]
    book_hanci: Option<String>,
    chapter: u32,
    #[serde(default)]
    verse: Option<u32>,
}

impl TryFrom<RawOcrEntry> for OcrEntry {
    type Error = String;

    fn try_from(raw: RawOcrEntry) -> std::result::Result<Self, Self::Error> {
        let book_han = raw
            .book_han
            .or(raw.book_hanci)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| "missing book_han / book_hanci".to_string())?;
        Ok(Self { book_han, chapter: raw.chapter, verse: raw.verse })
    }
}

impl OcrEntry {
    /// A page that begins at a chapter boundary starts at verse 1
    pub fn position(&self) -> (u32, u32) {
        (self.chapter, self.verse.unwrap_or(1))
    }
}

/// Sparse page -> reference boundary list, ordered by page id
#[derive(Debug, Clone, Default)]
pub struct OcrPageIndex {
    entries: BTreeMap<PageId, OcrEntry>,
}

impl OcrPageIndex {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let raw: HashMap<String, serde_json::Value> =
            serde_json::from_slice(bytes).context("Failed to parse OCR page index")?;
        let mut entries = BTreeMap::new();
        for (key, value) in raw {
            let Some(page) = PageId::parse(&key) else {
                tracing::warn!(key = %key, "Skipping OCR entry with malformed page id");
                continue;
            };
            match serde_json::from_value::<OcrEntry>(value) {
                Ok(entry) => {
                    entries.insert(page, entry);
                }
                Err(e) => tracing::warn!(key = %key, error = %e, "Skipping malformed OCR entry"),
            }
        }
        Ok(Self { entries })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (PageId, OcrEntry)>) -> Self {
        Self { entries: entries.into_iter().collect() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PageId, &OcrEntry)> {
        self.entries.iter()
    }

    fn book_entries<'a>(&'a self, book: &'a str) -> impl Iterator<Item = (&'a PageId, &'a OcrEntry)> {
        self.entries.iter().filter(move |(_, e)| e.book_han == book)
    }
}

impl PageLookup for OcrPageIndex {
    fn has_book(&self, book: &str) -> bool {
        self.book_entries(book).next().is_some()
    }

    /// Last page whose starting reference is <= (chapter, verse). Entries are a
    /// non-decreasing boundary list, so the scan stops at the first one past it.
    fn lookup(&self, book: &str, chapter: u32, verse: u32) -> Option<PageId> {
        let target = (chapter, verse);
        let mut best = None;
        for (page, entry) in self.book_entries(book) {
            if entry.position() > target {
                break;
            }
            best = Some(page);
        }
        best.cloned()
    }

    fn chapter_start(&self, book: &str, chapter: u32) -> Option<PageId> {
        self.lookup(book, chapter, 1)
    }
}

// ============ Chapter table ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterPages {
    pub page_start: PageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_end: Option<PageId>,
    /// Pages on which a verse begins the page
    pub verses: BTreeMap<u32, PageId>,
}

#[derive(Debug, Deserialize)]
struct RawChapterPages {
    page_start: String,
    #[serde(default)]
    page_end: Option<String>,
    #[serde(default)]
    verses: HashMap<String, String>,
}

/// Precomputed book -> chapter -> {page_start, page_end, verses} table
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChapterPageIndex {
    books: HashMap<String, BTreeMap<u32, ChapterPages>>,
}

impl ChapterPageIndex {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, RawChapterPages>> =
            serde_json::from_slice(bytes).context("Failed to parse chapter page index")?;

        let mut books = HashMap::new();
        for (book, chapters) in raw {
            let mut table = BTreeMap::new();
            for (chapter_key, raw_chapter) in chapters {
                let (Ok(chapter), Some(page_start)) =
                    (chapter_key.trim().parse::<u32>(), PageId::parse(&raw_chapter.page_start))
                else {
                    tracing::warn!(book = %book, chapter = %chapter_key, "Skipping malformed chapter entry");
                    continue;
                };
                let verses = raw_chapter
                    .verses
                    .iter()
                    .filter_map(|(v, p)| Some((v.trim().parse::<u32>().ok()?, PageId::parse(p)?)))
                    .collect();
                table.insert(
                    chapter,
                    ChapterPages {
                        page_start,
                        page_end: raw_chapter.page_end.as_deref().and_then(PageId::parse),
                        verses,
                    },
                );
            }
            books.insert(book, table);
        }
        Ok(Self { books })
    }

    /// Build the chapter table from the flat OCR index.
    ///
    /// A new book or chapter opens a record starting on that page; the
    /// previous chapter ends on the page before. Entries with an explicit
    /// verse are recorded as verse boundaries. The last chapter ends on the
    /// last indexed page.
    pub fn from_ocr(ocr: &OcrPageIndex) -> Self {
        let mut books: HashMap<String, BTreeMap<u32, ChapterPages>> = HashMap::new();
        let mut open: Option<(String, u32)> = None;

        for (page, entry) in ocr.iter() {
            let key = (entry.book_han.clone(), entry.chapter);
            if open.as_ref() != Some(&key) {
                if let Some((book, chapter)) = &open {
                    close_chapter(&mut books, book, *chapter, page.prev());
                }
                books
                    .entry(key.0.clone())
                    .or_default()
                    .entry(key.1)
                    .or_insert_with(|| ChapterPages {
                        page_start: page.clone(),
                        page_end: None,
                        verses: BTreeMap::new(),
                    });
                open = Some(key);
            }
            if let Some(verse) = entry.verse {
                if let Some(pages) = books
                    .get_mut(&entry.book_han)
                    .and_then(|b| b.get_mut(&entry.chapter))
                {
                    pages.verses.insert(verse, page.clone());
                }
            }
        }

        if let (Some((book, chapter)), Some((last, _))) = (&open, ocr.iter().last()) {
            close_chapter(&mut books, book, *chapter, Some(last.clone()));
        }

        Self { books }
    }

    pub fn chapter(&self, book: &str, chapter: u32) -> Option<&ChapterPages> {
        self.books.get(book)?.get(&chapter)
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }
}

fn close_chapter(
    books: &mut HashMap<String, BTreeMap<u32, ChapterPages>>,
    book: &str,
    chapter: u32,
    page_end: Option<PageId>,
) {
    if let Some(pages) = books.get_mut(book).and_then(|b| b.get_mut(&chapter)) {
        if pages.page_end.is_none() {
            pages.page_end = page_end;
        }
    }
}

impl PageLookup for ChapterPageIndex {
    fn has_book(&self, book: &str) -> bool {
        self.books.get(book).is_some_and(|b| !b.is_empty())
    }

    /// Exact verse entry first, then the nearest verse boundary before it in
    /// the same chapter, then the chapter's start page.
    fn lookup(&self, book: &str, chapter: u32, verse: u32) -> Option<PageId> {
        let pages = self.chapter(book, chapter)?;
        if let Some(page) = pages.verses.get(&verse) {
            return Some(page.clone());
        }
        pages
            .verses
            .range(..verse)
            .next_back()
            .map(|(_, p)| p.clone())
            .or_else(|| Some(pages.page_start.clone()))
    }

    fn chapter_start(&self, book: &str, chapter: u32) -> Option<PageId> {
        self.chapter(book, chapter).map(|p| p.page_start.clone())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn entry(book: &str, chapter: u32, verse: Option<u32>) -> OcrEntry {
        OcrEntry { book_han: book.to_string(), chapter, verse }
    }

    /// 0005 -> 1:1, 0006 -> 1:3, 0007 -> 2 (chapter boundary), 0008 -> 2:10
    pub fn genesis_ocr() -> OcrPageIndex {
        OcrPageIndex::from_entries([
            (PageId::from_number(5), entry("創世記", 1, Some(1))),
            (PageId::from_number(6), entry("創世記", 1, Some(3))),
            (PageId::from_number(7), entry("創世記", 2, None)),
            (PageId::from_number(8), entry("創世記", 2, Some(10))),
            (PageId::from_number(72), entry("出伊及", 1, Some(1))),
        ])
    }
}
