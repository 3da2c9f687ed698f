pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{lz::LzStringCompressor, storage::LocalStorage};
pub use core::{
    calculator::{summarize, weighted_average},
    templates::TemplateStore,
    url_codec::{generate_shareable_url, CodecLimits, QueryParams, UrlCodec},
    Module, ModuleList,
};
pub use utils::error::{Result, ShareError};
