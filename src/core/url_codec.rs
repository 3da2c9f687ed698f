use crate::adapters::lz::LzStringCompressor;
use crate::core::tiers::{
    Base64Tier, CompressedTier, LegacyTier, DEFAULT_BASE64_MAX_LEN, DEFAULT_COMPRESSED_MAX_LEN,
};
use crate::domain::model::{Module, ModuleList};
use crate::domain::ports::ShareTier;
use crate::utils::validation;
use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

/// A parsed query string. Keeps every pair in order; `get` returns the first match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Accepts the query with or without its leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn from_url(url: &Url) -> Self {
        Self {
            pairs: url.query_pairs().into_owned().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecLimits {
    pub compressed_max_len: usize,
    pub base64_max_len: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            compressed_max_len: DEFAULT_COMPRESSED_MAX_LEN,
            base64_max_len: DEFAULT_BASE64_MAX_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFragment {
    pub tier: &'static str,
    pub fragment: String,
}

/// Encodes a module list into the shortest accepted share fragment and reads any
/// of the fragment formats back.
pub struct UrlCodec {
    tiers: Vec<Box<dyn ShareTier>>,
    completeness: fn(&[Module]) -> bool,
}

impl UrlCodec {
    pub fn new() -> Self {
        Self::with_limits(CodecLimits::default())
    }

    pub fn with_limits(limits: CodecLimits) -> Self {
        Self::with_tiers(vec![
            Box::new(CompressedTier::new(
                LzStringCompressor,
                limits.compressed_max_len,
            )),
            Box::new(Base64Tier::new(limits.base64_max_len)),
            Box::new(LegacyTier),
        ])
    }

    /// Tiers are tried in the given order, for encoding and decoding alike.
    pub fn with_tiers(tiers: Vec<Box<dyn ShareTier>>) -> Self {
        Self {
            tiers,
            completeness: validation::is_complete,
        }
    }

    pub fn with_completeness(mut self, completeness: fn(&[Module]) -> bool) -> Self {
        self.completeness = completeness;
        self
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    /// Empty string when the list is not complete enough to share.
    pub fn encode(&self, modules: &[Module]) -> String {
        self.encode_detailed(modules)
            .map(|encoded| encoded.fragment)
            .unwrap_or_default()
    }

    /// Like `encode`, also reporting which tier produced the fragment.
    pub fn encode_detailed(&self, modules: &[Module]) -> Option<EncodedFragment> {
        if !(self.completeness)(modules) {
            tracing::debug!("Module list is incomplete, nothing to share yet");
            return None;
        }

        for tier in &self.tiers {
            match tier.encode(modules) {
                Ok(fragment) => match tier.budget() {
                    Some(budget) if fragment.len() > budget => {
                        tracing::debug!(
                            "{} fragment is {} chars (budget {}), trying next tier",
                            tier.name(),
                            fragment.len(),
                            budget
                        );
                    }
                    _ => {
                        tracing::debug!(
                            "Encoded {} modules with {} tier ({} chars)",
                            modules.len(),
                            tier.name(),
                            fragment.len()
                        );
                        return Some(EncodedFragment {
                            tier: tier.name(),
                            fragment,
                        });
                    }
                },
                Err(e) => {
                    tracing::warn!("{} tier failed to encode, falling back: {}", tier.name(), e);
                }
            }
        }

        tracing::warn!("No configured tier accepted the module list, using legacy format");
        Some(EncodedFragment {
            tier: LegacyTier.name(),
            fragment: LegacyTier::to_query(modules),
        })
    }

    /// `None` when no tier yields at least one module.
    pub fn decode(&self, params: &QueryParams) -> Option<ModuleList> {
        for tier in &self.tiers {
            match tier.decode(params) {
                None => continue,
                Some(Ok(modules)) if !modules.is_empty() => {
                    tracing::debug!(
                        "Decoded {} modules from {} tier",
                        modules.len(),
                        tier.name()
                    );
                    return Some(modules);
                }
                Some(Ok(_)) => {
                    tracing::debug!("{} tier decoded an empty module list", tier.name());
                }
                Some(Err(e)) => {
                    tracing::warn!("Failed to decode {} payload, trying next tier: {}", tier.name(), e);
                }
            }
        }
        None
    }

    pub fn decode_query(&self, query: &str) -> Option<ModuleList> {
        self.decode(&QueryParams::parse(query))
    }
}

impl Default for UrlCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// `base_url` is origin + path; an incomplete list yields the bare base URL.
pub fn generate_shareable_url(codec: &UrlCodec, base_url: &str, modules: &[Module]) -> String {
    let fragment = codec.encode(modules);
    if fragment.is_empty() {
        return base_url.to_string();
    }
    format!("{}?{}", base_url, fragment)
}
