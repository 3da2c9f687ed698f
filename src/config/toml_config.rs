use crate::core::url_codec::CodecLimits;
use crate::utils::error::{Result, ShareError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TEMPLATES_DIR: &str = "./.grade-share";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub codec: CodecConfig,
    pub templates: TemplatesConfig,
    pub share: Option<ShareConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub compressed_max_len: usize,
    pub base64_max_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        let limits = CodecLimits::default();
        Self {
            compressed_max_len: limits.compressed_max_len,
            base64_max_len: limits.base64_max_len,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub dir: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_TEMPLATES_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ShareError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ShareError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SHARE_BASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ShareError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn codec_limits(&self) -> CodecLimits {
        CodecLimits {
            compressed_max_len: self.codec.compressed_max_len,
            base64_max_len: self.codec.base64_max_len,
        }
    }

    pub fn templates_dir(&self) -> &str {
        &self.templates.dir
    }

    pub fn base_url(&self) -> Option<&str> {
        self.share.as_ref().map(|s| s.base_url.as_str())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_positive_number(
            "codec.compressed_max_len",
            self.codec.compressed_max_len,
            1,
        )?;
        validation::validate_positive_number("codec.base64_max_len", self.codec.base64_max_len, 1)?;
        validation::validate_path("templates.dir", &self.templates.dir)?;

        if let Some(base_url) = self.base_url() {
            validation::validate_url("share.base_url", base_url)?;
        }

        if let Some(level) = self.log_level() {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(ShareError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }
}
