//! Library state: the loaded corpus, page indexes and search, shared read-only

use crate::align::{FallbackPolicy, PageAnnotations, Resolver};
use crate::cache::SearchCache;
use crate::config::DataConfig;
use crate::corpus::Corpus;
use crate::loader::{self, LoadReport, LoadedData};
use crate::pages::{ChapterPageIndex, OcrPageIndex, PageId, PageLookup};
use crate::render::{self, Layout, RenderMode, RenderOptions};
use crate::search::{Hit, SearchEngine, SearchResults};
use anyhow::Result;
use std::sync::Arc;

/// Immutable after construction; wrap in `Arc` to share between requests
pub struct Library {
    pub corpus: Arc<Corpus>,
    pub ocr_index: Option<OcrPageIndex>,
    pub chapter_index: Option<ChapterPageIndex>,
    pub search_engine: SearchEngine,
    pub search_cache: SearchCache,
    pub fallback: FallbackPolicy,
    pub report: Option<LoadReport>,
}

impl Library {
    /// Load every configured document
    pub async fn load(config: &DataConfig) -> Result<Self> {
        let data = loader::load_all(config).await?;
        Ok(Self::from_loaded(data, config))
    }

    pub fn from_loaded(data: LoadedData, config: &DataConfig) -> Self {
        let mut library = Self::new(data.corpus, data.ocr_index, data.chapter_index, config.search_cache_capacity);
        library.fallback = config.fallback.clone();
        library.report = Some(data.report);
        library
    }

    pub fn new(
        corpus: Corpus,
        ocr_index: Option<OcrPageIndex>,
        chapter_index: Option<ChapterPageIndex>,
        search_cache_capacity: usize,
    ) -> Self {
        let corpus = Arc::new(corpus);
        Self {
            search_engine: SearchEngine::new(Arc::clone(&corpus)),
            search_cache: SearchCache::new(search_cache_capacity),
            corpus,
            ocr_index,
            chapter_index,
            fallback: FallbackPolicy::None,
            report: None,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn has_page_links(&self) -> bool {
        self.ocr_index.is_some() || self.chapter_index.is_some()
    }

    /// Resolver over the loaded indexes: OCR boundaries first, then the
    /// chapter table for books or chapters the OCR list lacks.
    pub fn resolver(&self) -> Resolver<'_> {
        let mut indexes: Vec<&dyn PageLookup> = Vec::new();
        if let Some(ocr) = &self.ocr_index {
            indexes.push(ocr);
        }
        if let Some(table) = &self.chapter_index {
            indexes.push(table);
        }
        Resolver::new(indexes).with_fallback(self.fallback.clone())
    }

    pub fn resolve_page(&self, book: &str, chapter: u32, verse: u32) -> Option<PageId> {
        self.resolver().resolve_page(book, chapter, verse)
    }

    pub fn chapter_start_page(&self, book: &str, chapter: u32) -> Option<PageId> {
        self.resolver().resolve_chapter_start_page(book, chapter)
    }

    /// Render `chapter` of the book named `book` (Han name). Unknown
    /// references render as a placeholder.
    pub fn render_chapter(&self, book: &str, chapter: u32, mode: RenderMode, foreword: bool) -> Layout {
        let found = self
            .corpus
            .book(book)
            .and_then(|(_, b)| b.chapter(chapter))
            .map(|(_, c)| c);

        let annotations = match found {
            Some(c) if !foreword => self.resolver().annotate(book, c),
            _ => PageAnnotations::default(),
        };
        let options = RenderOptions {
            foreword,
            annotations: Some(&annotations),
        };
        render::render_chapter(found, mode, options)
    }

    pub fn search(&self, term: &str) -> Arc<Vec<Hit>> {
        self.search_cache.get_or_search(&self.search_engine, term)
    }

    pub fn search_page(&self, term: &str, limit: usize, offset: usize) -> SearchResults {
        self.search_cache.query(&self.search_engine, term, limit, offset)
    }
}
