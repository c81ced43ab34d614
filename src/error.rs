//! Error types for Hinghwa

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HinghwaError {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl serde::Serialize for HinghwaError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
