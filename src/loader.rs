//! One-shot document loading
//!
//! Fetches the corpus and the two page indexes from local files or URLs,
//! verifies the corpus digest when one is configured, and degrades to "no
//! page links" when a page index cannot be loaded.

use crate::config::{DataConfig, Source};
use crate::corpus::Corpus;
use crate::error::HinghwaError;
use crate::pages::{ChapterPageIndex, OcrPageIndex};
use anyhow::{anyhow, Context, Result};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Loaded,
    /// Chapter table built from the OCR index instead of its own document
    Derived,
    Failed,
}

/// Outcome of one dataset load, reported to the front end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStatus {
    pub source: String,
    pub state: LoadState,
    pub entries: usize,
    pub error: Option<String>,
    pub loaded_at: String,
}

impl DatasetStatus {
    fn new(source: &Source, state: LoadState, entries: usize, error: Option<String>) -> Self {
        Self {
            source: source.to_string(),
            state,
            entries,
            error,
            loaded_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub corpus: DatasetStatus,
    pub ocr_index: DatasetStatus,
    pub chapter_index: DatasetStatus,
}

/// Everything loaded at startup
pub struct LoadedData {
    pub corpus: Corpus,
    pub ocr_index: Option<OcrPageIndex>,
    pub chapter_index: Option<ChapterPageIndex>,
    pub report: LoadReport,
}

/// Verify bytes against an expected SHA-256 hex digest
pub fn verify_hash(bytes: &[u8], expected_hash: &str) -> bool {
    let expected = expected_hash.trim();
    let expected = expected.strip_prefix("sha256:").unwrap_or(expected);
    let actual = hex::encode(Sha256::digest(bytes));
    actual.eq_ignore_ascii_case(expected)
}

/// Read a document from disk or over HTTP
pub async fn fetch_bytes(source: &Source) -> Result<Vec<u8>> {
    match source {
        Source::Path(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        Source::Url(url) => fetch_url(url).await,
    }
}

async fn fetch_url(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| HinghwaError::Network(e.to_string()))
        .with_context(|| format!("Failed to fetch {}", url))?;

    if !response.status().is_success() {
        return Err(anyhow!("Failed to fetch {}: HTTP {}", url, response.status()));
    }

    let mut bytes = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Error reading chunk")?;
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

pub async fn load_corpus(source: &Source, expected_sha256: Option<&str>) -> Result<Corpus> {
    let bytes = fetch_bytes(source).await?;
    if let Some(expected) = expected_sha256 {
        if !verify_hash(&bytes, expected) {
            return Err(HinghwaError::Integrity(format!("corpus digest mismatch for {}", source)).into());
        }
    }
    let corpus = Corpus::from_json(&bytes)
        .map_err(|e| HinghwaError::Parse(format!("{:#}", e)))
        .with_context(|| format!("Failed to load corpus from {}", source))?;

    let divergences = corpus.divergences();
    if !divergences.is_empty() {
        tracing::warn!(
            count = divergences.len(),
            first = ?divergences.first().map(|d| (&d.book, d.chapter, d.verse, d.script)),
            "Token streams disagree with stored verse text"
        );
    }
    Ok(corpus)
}

pub async fn load_ocr_index(source: &Source) -> Result<OcrPageIndex> {
    let bytes = fetch_bytes(source).await?;
    OcrPageIndex::from_json(&bytes).with_context(|| format!("Failed to load OCR index from {}", source))
}

pub async fn load_chapter_index(source: &Source) -> Result<ChapterPageIndex> {
    let bytes = fetch_bytes(source).await?;
    ChapterPageIndex::from_json(&bytes)
        .with_context(|| format!("Failed to load chapter index from {}", source))
}

/// Load all three documents concurrently.
///
/// Only a corpus failure is fatal. A failed page index is logged and left
/// out; a missing chapter table is derived from the OCR index when that one
/// loaded.
pub async fn load_all(config: &DataConfig) -> Result<LoadedData> {
    let (corpus, ocr, chapters) = tokio::join!(
        load_corpus(&config.corpus, config.corpus_sha256.as_deref()),
        load_ocr_index(&config.ocr_index),
        load_chapter_index(&config.chapter_index),
    );

    let corpus = corpus.map_err(|e| HinghwaError::Load(format!("{:#}", e)))?;
    let stats = corpus.stats();
    tracing::info!(books = stats.books, chapters = stats.chapters, verses = stats.verses, "Corpus loaded");
    let corpus_status = DatasetStatus::new(&config.corpus, LoadState::Loaded, stats.verses, None);

    let (ocr_index, ocr_status) = match ocr {
        Ok(index) => {
            tracing::info!(pages = index.len(), "OCR page index loaded");
            let status = DatasetStatus::new(&config.ocr_index, LoadState::Loaded, index.len(), None);
            (Some(index), status)
        }
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "OCR page index unavailable, page links degraded");
            let status = DatasetStatus::new(&config.ocr_index, LoadState::Failed, 0, Some(format!("{:#}", e)));
            (None, status)
        }
    };

    let (chapter_index, chapter_status) = match (chapters, &ocr_index) {
        (Ok(table), _) => {
            let status = DatasetStatus::new(&config.chapter_index, LoadState::Loaded, table.book_count(), None);
            (Some(table), status)
        }
        (Err(e), Some(ocr)) => {
            tracing::warn!(error = %format!("{:#}", e), "Chapter index unavailable, deriving from OCR index");
            let table = ChapterPageIndex::from_ocr(ocr);
            let status = DatasetStatus::new(
                &config.chapter_index,
                LoadState::Derived,
                table.book_count(),
                Some(format!("{:#}", e)),
            );
            (Some(table), status)
        }
        (Err(e), None) => {
            tracing::warn!(error = %format!("{:#}", e), "Chapter index unavailable");
            let status =
                DatasetStatus::new(&config.chapter_index, LoadState::Failed, 0, Some(format!("{:#}", e)));
            (None, status)
        }
    };

    Ok(LoadedData {
        corpus,
        ocr_index,
        chapter_index,
        report: LoadReport {
            corpus: corpus_status,
            ocr_index: ocr_status,
            chapter_index: chapter_status,
        },
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::config::{CORPUS_FILE, OCR_INDEX_FILE};

    #[test]
    fn test_verify_hash() {
        let digest = hex::encode(Sha256::digest(b"abc"));
        assert!(verify_hash(b"abc", &digest));
        assert!(verify_hash(b"abc", &format!("sha256:{}", digest.to_uppercase())));
        assert!(!verify_hash(b"abd", &digest));
    }

    #[tokio::test]
    async fn test_missing_page_indexes_degrade() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), CORPUS_FILE, CORPUS);
        let config = DataConfig::in_dir(dir.path().to_path_buf());

        let loaded = load_all(&config).await.unwrap();
        assert_eq!(loaded.corpus.stats().verses, 3);
        assert!(loaded.ocr_index.is_none());
        assert!(loaded.chapter_index.is_none());
        assert_eq!(loaded.report.ocr_index.state, LoadState::Failed);
        assert!(loaded.report.ocr_index.error.is_some());
        assert_eq!(loaded.report.chapter_index.state, LoadState::Failed);
    }

    #[tokio::test]
    async fn test_chapter_index_derived_from_ocr() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), CORPUS_FILE, CORPUS);
        write(dir.path(), OCR_INDEX_FILE, OCR);
        let config = DataConfig::in_dir(dir.path().to_path_buf());

        let loaded = load_all(&config).await.unwrap();
        assert_eq!(loaded.report.ocr_index.entries, 2);
        assert_eq!(loaded.report.chapter_index.state, LoadState::Derived);
        let table = loaded.chapter_index.unwrap();
        assert_eq!(table.chapter("創世記", 1).unwrap().page_start.as_str(), "0005");
    }

    #[tokio::test]
    async fn test_missing_corpus_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), OCR_INDEX_FILE, OCR);
        let config = DataConfig::in_dir(dir.path().to_path_buf());
        assert!(load_all(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_corpus_digest_checked() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), CORPUS_FILE, CORPUS);
        let source = Source::Path(dir.path().join(CORPUS_FILE));

        let good = hex::encode(Sha256::digest(CORPUS.as_bytes()));
        assert!(load_corpus(&source, Some(&good)).await.is_ok());

        let err = load_corpus(&source, Some("sha256:00")).await.unwrap_err();
        assert!(err.downcast_ref::<HinghwaError>().is_some());
    }

    #[tokio::test]
    async fn test_malformed_corpus_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), CORPUS_FILE, "{\"books\": 7}");
        let source = Source::Path(dir.path().join(CORPUS_FILE));
        let err = load_corpus(&source, None).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<HinghwaError>(), Some(HinghwaError::Parse(_))));
    }
}
