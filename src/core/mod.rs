pub mod calculator;
pub mod export;
pub mod templates;
pub mod tiers;
pub mod url_codec;

pub use crate::domain::model::{AverageSummary, Module, ModuleList, Template, TemplateUpdate};
pub use crate::domain::ports::{Compressor, ShareTier, Storage};
pub use crate::utils::error::Result;
