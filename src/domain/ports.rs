use crate::core::url_codec::QueryParams;
use crate::domain::model::{Module, ModuleList};
use crate::utils::error::Result;

/// Reversible text compression onto a URL-safe alphabet.
pub trait Compressor: Send + Sync {
    fn compress(&self, input: &str) -> Result<String>;
    fn decompress(&self, input: &str) -> Result<String>;
}

/// Key-addressed blob storage (the browser's local storage, a directory on disk, ...).
pub trait Storage: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn write(&self, key: &str, data: &[u8]) -> Result<()>;
}

/// One candidate format in the share-link fallback chain.
pub trait ShareTier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Query key that identifies this tier in a parsed query string.
    fn key(&self) -> &'static str;

    /// Maximum accepted fragment length; `None` accepts anything.
    fn budget(&self) -> Option<usize>;

    /// Produce the full fragment, prefix included.
    fn encode(&self, modules: &[Module]) -> Result<String>;

    /// `None` when the tier's key is not present in `params`.
    fn decode(&self, params: &QueryParams) -> Option<Result<ModuleList>>;
}
