use crate::domain::model::Module;
use crate::utils::error::{Result, ShareError};
use url::Url;

pub const MIN_AVERAGE: f64 = 0.0;
pub const MAX_AVERAGE: f64 = 20.0;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ShareError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" | "file" => Ok(()),
            scheme => Err(ShareError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ShareError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ShareError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ShareError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ShareError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ShareError::ValidationError {
            message: format!("{} cannot be empty or whitespace-only", field_name),
        });
    }
    Ok(())
}

pub fn validate_strictly_positive(field_name: &str, value: f64) -> Result<()> {
    // NaN 也不是 finite
    if !value.is_finite() || value <= 0.0 {
        return Err(ShareError::ValidationError {
            message: format!("{} must be greater than 0 (got {})", field_name, value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(ShareError::ValidationError {
            message: format!(
                "{} must be between {} and {} (got {})",
                field_name, min, max, value
            ),
        });
    }
    Ok(())
}

impl Validate for Module {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_strictly_positive("coefficient", self.coefficient)?;
        validate_range("average", self.average, MIN_AVERAGE, MAX_AVERAGE)
    }
}

impl Validate for [Module] {
    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ShareError::ValidationError {
                message: "at least one module is required".to_string(),
            });
        }
        for (index, module) in self.iter().enumerate() {
            module.validate().map_err(|e| ShareError::ValidationError {
                message: format!("module #{}: {}", index + 1, e),
            })?;
        }
        Ok(())
    }
}

/// Completeness predicate used before a list is encoded for sharing.
pub fn is_complete(modules: &[Module]) -> bool {
    modules.validate().is_ok()
}
