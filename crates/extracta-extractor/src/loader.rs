//! Document loaders for plain text sources
//!
//! Binary formats such as PDF need their own text extraction and plug in
//! through the [`Loader`] trait.

use async_trait::async_trait;
use extracta_domain::{LoadError, Loader};
use std::path::PathBuf;

/// Document text already held in memory
#[derive(Debug, Clone)]
pub struct TextLoader {
    text: String,
}

impl TextLoader {
    /// Create a loader for `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Loader for TextLoader {
    async fn load(&self) -> Result<String, LoadError> {
        Ok(self.text.clone())
    }
}

/// UTF-8 text file on disk
#[derive(Debug, Clone)]
pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    /// Create a loader for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Loader for FileLoader {
    async fn load(&self) -> Result<String, LoadError> {
        let bytes = tokio::fs::read(&self.path).await?;
        String::from_utf8(bytes).map_err(|e| LoadError::Encoding(e.to_string()))
    }
}

/// Uploaded bytes that must decode as UTF-8
#[derive(Debug, Clone)]
pub struct BytesLoader {
    bytes: Vec<u8>,
}

impl BytesLoader {
    /// Create a loader for `bytes`
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl Loader for BytesLoader {
    async fn load(&self) -> Result<String, LoadError> {
        std::str::from_utf8(&self.bytes)
            .map(str::to_string)
            .map_err(|e| LoadError::Encoding(e.to_string()))
    }
}
