use crate::adapters::lz::LzStringCompressor;
use crate::core::url_codec::QueryParams;
use crate::domain::model::{Module, ModuleList};
use crate::domain::ports::{Compressor, ShareTier};
use crate::utils::error::{Result, ShareError};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde_json::Value;
use url::form_urlencoded;

pub const COMPRESSED_KEY: &str = "v2";
pub const BASE64_KEY: &str = "data";
pub const LEGACY_FIRST_KEY: &str = "m0_name";

pub const DEFAULT_COMPRESSED_MAX_LEN: usize = 1500;
pub const DEFAULT_BASE64_MAX_LEN: usize = 1800;

// 2^53，超過這個值的整數無法在 f64 中精確表示
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// 整數值輸出成 `3` 而不是 `3.0`，跟瀏覽器端 JSON.stringify 的結果一致
fn number_value(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// `[name, coef, avg, name, coef, avg, ...]`
pub fn flat_payload(modules: &[Module]) -> Result<String> {
    let mut values = Vec::with_capacity(modules.len() * 3);
    for module in modules {
        values.push(Value::String(module.name.clone()));
        values.push(number_value(module.coefficient));
        values.push(number_value(module.average));
    }
    Ok(serde_json::to_string(&Value::Array(values))?)
}

fn field_number(tier: &str, field: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ShareError::malformed(tier, format!("{} is out of range", field))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ShareError::malformed(tier, format!("{} '{}' is not a number", field, s))),
        other => Err(ShareError::malformed(
            tier,
            format!("{} must be a number, got {}", field, other),
        )),
    }
}

fn triple_to_module(tier: &str, triple: &[Value]) -> Result<Module> {
    let [name, coefficient, average] = triple else {
        return Err(ShareError::malformed(tier, "module entries need exactly 3 fields"));
    };
    let name = name
        .as_str()
        .ok_or_else(|| ShareError::malformed(tier, "module name must be a string"))?;

    Ok(Module::new(
        name,
        field_number(tier, "coefficient", coefficient)?,
        field_number(tier, "average", average)?,
    ))
}

/// Accepts the flat layout and the older array-of-triples layout.
pub fn parse_payload(tier: &str, json: &str) -> Result<ModuleList> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(ShareError::malformed(tier, "payload is not a JSON array"));
    };

    if !items.is_empty() && items.iter().all(Value::is_array) {
        return items
            .iter()
            .map(|item| match item {
                Value::Array(triple) => triple_to_module(tier, triple),
                _ => Err(ShareError::malformed(tier, "mixed payload layout")),
            })
            .collect();
    }

    if items.len() % 3 != 0 {
        return Err(ShareError::malformed(
            tier,
            format!("flat payload has {} values, not a multiple of 3", items.len()),
        ));
    }

    items
        .chunks_exact(3)
        .map(|triple| triple_to_module(tier, triple))
        .collect()
}

/// `v2=<lz-string payload>`
pub struct CompressedTier<C: Compressor = LzStringCompressor> {
    compressor: C,
    max_len: usize,
}

impl<C: Compressor> CompressedTier<C> {
    pub fn new(compressor: C, max_len: usize) -> Self {
        Self {
            compressor,
            max_len,
        }
    }
}

impl<C: Compressor> ShareTier for CompressedTier<C> {
    fn name(&self) -> &'static str {
        "compressed"
    }

    fn key(&self) -> &'static str {
        COMPRESSED_KEY
    }

    fn budget(&self) -> Option<usize> {
        Some(self.max_len)
    }

    fn encode(&self, modules: &[Module]) -> Result<String> {
        let json = flat_payload(modules)?;
        let compressed = self.compressor.compress(&json)?;
        Ok(format!("{}={}", COMPRESSED_KEY, compressed))
    }

    fn decode(&self, params: &QueryParams) -> Option<Result<ModuleList>> {
        let payload = params.get(COMPRESSED_KEY)?;
        Some(
            self.compressor
                .decompress(payload)
                .and_then(|json| parse_payload(self.name(), &json)),
        )
    }
}

/// `data=<url-safe base64 of the JSON payload>`
pub struct Base64Tier {
    max_len: usize,
}

impl Base64Tier {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    fn restore_standard_base64(payload: &str) -> String {
        let mut restored: String = payload
            .trim_end_matches('=')
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                other => other,
            })
            .collect();
        while restored.len() % 4 != 0 {
            restored.push('=');
        }
        restored
    }

    fn decode_payload(&self, payload: &str) -> Result<ModuleList> {
        let bytes = STANDARD.decode(Self::restore_standard_base64(payload))?;
        let json = String::from_utf8(bytes)
            .map_err(|e| ShareError::malformed(self.name(), format!("invalid UTF-8: {}", e)))?;
        parse_payload(self.name(), &json)
    }
}

impl ShareTier for Base64Tier {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn key(&self) -> &'static str {
        BASE64_KEY
    }

    fn budget(&self) -> Option<usize> {
        Some(self.max_len)
    }

    fn encode(&self, modules: &[Module]) -> Result<String> {
        let json = flat_payload(modules)?;
        Ok(format!("{}={}", BASE64_KEY, URL_SAFE_NO_PAD.encode(json.as_bytes())))
    }

    fn decode(&self, params: &QueryParams) -> Option<Result<ModuleList>> {
        let payload = params.get(BASE64_KEY)?;
        Some(self.decode_payload(payload))
    }
}

/// `m0_name=..&m0_coef=..&m0_avg=..&m1_name=..`，沒有長度上限，永遠可用
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyTier;

impl LegacyTier {
    pub fn to_query(modules: &[Module]) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (index, module) in modules.iter().enumerate() {
            serializer.append_pair(&format!("m{}_name", index), &module.name);
            serializer.append_pair(&format!("m{}_coef", index), &module.coefficient.to_string());
            serializer.append_pair(&format!("m{}_avg", index), &module.average.to_string());
        }
        serializer.finish()
    }

    pub fn from_query(params: &QueryParams) -> ModuleList {
        let mut modules = Vec::new();
        let mut index = 0;

        // 連續索引，遇到第一個缺口就停
        while let Some(name) = params.get(&format!("m{}_name", index)) {
            let coef = params.get(&format!("m{}_coef", index)).unwrap_or("");
            let avg = params.get(&format!("m{}_avg", index)).unwrap_or("");

            if !name.is_empty() && !coef.is_empty() && !avg.is_empty() {
                modules.push(Module::new(name, parse_float(coef), parse_float(avg)));
            } else {
                tracing::debug!("Skipping incomplete legacy module at index {}", index);
            }
            index += 1;
        }

        modules
    }
}

/// Permissive: unparsable text becomes NaN instead of dropping the entry.
fn parse_float(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

impl ShareTier for LegacyTier {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn key(&self) -> &'static str {
        LEGACY_FIRST_KEY
    }

    fn budget(&self) -> Option<usize> {
        None
    }

    fn encode(&self, modules: &[Module]) -> Result<String> {
        Ok(Self::to_query(modules))
    }

    fn decode(&self, params: &QueryParams) -> Option<Result<ModuleList>> {
        if !params.has(LEGACY_FIRST_KEY) {
            return None;
        }
        Some(Ok(Self::from_query(params)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ModuleList {
        vec![
            Module::new("Math", 3.0, 15.5),
            Module::new("Physics", 4.0, 14.2),
        ]
    }

    #[test]
    fn test_flat_payload_uses_integer_text() {
        let json = flat_payload(&sample()).unwrap();
        assert_eq!(json, r#"["Math",3,15.5,"Physics",4,14.2]"#);
    }

    #[test]
    fn test_parse_payload_layouts() {
        let flat = parse_payload("test", r#"["Math",3,15.5,"Physics",4,14.2]"#).unwrap();
        assert_eq!(flat, sample());

        let nested = parse_payload("test", r#"[["Math",3,15.5],["Physics",4,14.2]]"#).unwrap();
        assert_eq!(nested, sample());

        let stringly = parse_payload("test", r#"["Math","3","15.5"]"#).unwrap();
        assert_eq!(stringly, vec![Module::new("Math", 3.0, 15.5)]);
    }

    #[test]
    fn test_full_precision_floats_survive_payload() {
        let modules = vec![Module::new("Lab", 39.430133835633676, 13.123456789012345)];
        let json = flat_payload(&modules).unwrap();
        assert_eq!(parse_payload("test", &json).unwrap(), modules);
    }

    #[test]
    fn test_parse_payload_rejects_malformed() {
        assert!(parse_payload("test", "not json").is_err());
        assert!(parse_payload("test", r#"{"modules":[]}"#).is_err());
        assert!(parse_payload("test", r#"["Math",3]"#).is_err());
        assert!(parse_payload("test", r#"[7,3,15.5]"#).is_err());
        assert!(parse_payload("test", r#"["Math",true,15.5]"#).is_err());
        assert!(parse_payload("test", r#"[["Math",3]]"#).is_err());
    }

    #[test]
    fn test_base64_fragment_is_url_safe() {
        let modules = vec![Module::new("Ünïcødé ?>>", 2.0, 11.25)];
        let fragment = Base64Tier::new(DEFAULT_BASE64_MAX_LEN)
            .encode(&modules)
            .unwrap();

        let payload = fragment.strip_prefix("data=").unwrap();
        assert!(!payload.contains('+'));
        assert!(!payload.contains('/'));
        assert!(!payload.ends_with('='));
    }

    #[test]
    fn test_base64_restores_padding_and_alphabet() {
        assert_eq!(Base64Tier::restore_standard_base64("ab-_c"), "ab+/c===");
        assert_eq!(Base64Tier::restore_standard_base64("abcd"), "abcd");
        assert_eq!(Base64Tier::restore_standard_base64("abc=="), "abc=");
    }

    #[test]
    fn test_legacy_query_matches_form_encoding() {
        let modules = vec![Module::new("Data & Algo", 2.0, 12.0)];
        assert_eq!(
            LegacyTier::to_query(&modules),
            "m0_name=Data+%26+Algo&m0_coef=2&m0_avg=12"
        );
    }

    #[test]
    fn test_legacy_skips_incomplete_index_but_continues() {
        let params = QueryParams::parse(
            "m0_name=A&m0_coef=1&m0_avg=10&m1_name=B&m1_coef=&m1_avg=9&m2_name=C&m2_coef=2&m2_avg=11",
        );
        let modules = LegacyTier::from_query(&params);
        assert_eq!(
            modules,
            vec![Module::new("A", 1.0, 10.0), Module::new("C", 2.0, 11.0)]
        );
    }

    #[test]
    fn test_legacy_keeps_unparsable_numbers_as_nan() {
        let params = QueryParams::parse("m0_name=A&m0_coef=abc&m0_avg=10");
        let modules = LegacyTier::from_query(&params);
        assert_eq!(modules.len(), 1);
        assert!(modules[0].coefficient.is_nan());
        assert_eq!(modules[0].average, 10.0);
    }
}
