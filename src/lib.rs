//! Hinghwa - bilingual (Han / romanized) Bible reader core
//!
//! Corpus model, dual-script rendering, verse search and scan-page alignment.

// Tokens come first: corpus, render and search all build on them
pub mod tokens;
pub mod catalog;
pub mod corpus;
pub mod pages;
pub mod align;
pub mod render;
pub mod search;
pub mod cache;
pub mod config;
pub mod loader;
pub mod prefs;
pub mod error;
pub mod state;

pub use error::HinghwaError;
pub use state::Library;
pub use tokens::{Script, Token, TokenKind, WordForm, LINE_BREAK};
pub use corpus::{Book, Chapter, Corpus, Heading, Section, Verse};
pub use pages::{ChapterPageIndex, OcrPageIndex, PageId, PageLookup};
pub use align::{FallbackPolicy, PageAnnotations, Resolver};
pub use render::{render_chapter, Block, Layout, RenderMode, RenderOptions, Segment, VerseBody};
pub use search::{Hit, MatchSpan, SearchEngine, SearchResults};
pub use cache::SearchCache;
pub use config::{get_data_dir, DataConfig, Source};
pub use loader::{load_all, verify_hash, DatasetStatus, LoadReport, LoadState, LoadedData};
pub use prefs::{PreferenceStore, Preferences, ScrollDirection, Theme};
