//! Data source configuration and data directory resolution

use crate::align::FallbackPolicy;
use std::fmt;
use std::path::PathBuf;

pub const CORPUS_FILE: &str = "bible_data.json";
pub const OCR_INDEX_FILE: &str = "page-ocr-results.json";
pub const CHAPTER_INDEX_FILE: &str = "chapter-page-mapping.json";

/// Default search memo capacity (number of distinct terms)
pub const DEFAULT_SEARCH_CACHE_CAPACITY: usize = 256;

/// Where a document comes from: a local file or an http(s) URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => write!(f, "{}", p.display()),
            Source::Url(u) => f.write_str(u),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub corpus: Source,
    pub ocr_index: Source,
    pub chapter_index: Source,
    /// Expected SHA-256 of the corpus document, optionally `sha256:`-prefixed
    pub corpus_sha256: Option<String>,
    pub fallback: FallbackPolicy,
    pub search_cache_capacity: usize,
}

impl DataConfig {
    /// Default file names inside `data_dir`
    pub fn in_dir(data_dir: PathBuf) -> Self {
        Self {
            corpus: Source::Path(data_dir.join(CORPUS_FILE)),
            ocr_index: Source::Path(data_dir.join(OCR_INDEX_FILE)),
            chapter_index: Source::Path(data_dir.join(CHAPTER_INDEX_FILE)),
            data_dir,
            corpus_sha256: None,
            fallback: FallbackPolicy::None,
            search_cache_capacity: DEFAULT_SEARCH_CACHE_CAPACITY,
        }
    }

    /// Defaults overridden by `HINGHWA_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let data_dir = get("HINGHWA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(get_data_dir);
        let mut config = Self::in_dir(data_dir);

        if let Some(v) = get("HINGHWA_CORPUS") {
            config.corpus = Source::parse(&v);
        }
        if let Some(v) = get("HINGHWA_OCR_INDEX") {
            config.ocr_index = Source::parse(&v);
        }
        if let Some(v) = get("HINGHWA_CHAPTER_INDEX") {
            config.chapter_index = Source::parse(&v);
        }
        config.corpus_sha256 = get("HINGHWA_CORPUS_SHA256");
        if let Some(book) = get("HINGHWA_DEFAULT_BOOK") {
            config.fallback = FallbackPolicy::DefaultBook(book);
        }
        if let Some(v) = get("HINGHWA_SEARCH_CACHE") {
            match v.trim().parse() {
                Ok(n) => config.search_cache_capacity = n,
                Err(_) => tracing::warn!(value = %v, "Ignoring invalid HINGHWA_SEARCH_CACHE"),
            }
        }
        config
    }
}

/// Get the data directory
///
/// - Development: `data/` in the working directory or a parent project dir
/// - macOS: ~/Library/Application Support/Hinghwa/
/// - Windows/Linux: data folder next to executable (portable)
pub fn get_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        let dev_paths = [PathBuf::from("data"), PathBuf::from("../data")];
        for path in &dev_paths {
            if path.join(CORPUS_FILE).exists() {
                return path.canonicalize().unwrap_or_else(|_| path.clone());
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("Hinghwa");
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                return exe_dir.join("data");
            }
        }
    }

    PathBuf::from("data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("https://example.org/bible_data.json"),
            Source::Url("https://example.org/bible_data.json".to_string())
        );
        assert_eq!(Source::parse("data/x.json"), Source::Path(PathBuf::from("data/x.json")));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HINGHWA_DATA_DIR", "/srv/hinghwa"),
            ("HINGHWA_OCR_INDEX", "https://cdn.example.org/ocr.json"),
            ("HINGHWA_DEFAULT_BOOK", "創世記"),
            ("HINGHWA_SEARCH_CACHE", "not-a-number"),
            ("HINGHWA_CORPUS_SHA256", " "),
        ]
        .into_iter()
        .collect();
        let config = DataConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.corpus, Source::Path(PathBuf::from("/srv/hinghwa").join(CORPUS_FILE)));
        assert_eq!(config.ocr_index, Source::Url("https://cdn.example.org/ocr.json".to_string()));
        assert_eq!(config.fallback, FallbackPolicy::DefaultBook("創世記".to_string()));
        assert_eq!(config.search_cache_capacity, DEFAULT_SEARCH_CACHE_CAPACITY);
        assert_eq!(config.corpus_sha256, None);
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = DataConfig::from_lookup(|_| None);
        assert_eq!(config.fallback, FallbackPolicy::None);
        assert_eq!(config.corpus, Source::Path(config.data_dir.join(CORPUS_FILE)));
    }
}
