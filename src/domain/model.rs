use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One weighted score entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub coefficient: f64,
    pub average: f64,
}

impl Module {
    pub fn new(name: impl Into<String>, coefficient: f64, average: f64) -> Self {
        Self {
            name: name.into(),
            coefficient,
            average,
        }
    }

    pub fn weighted_score(&self) -> f64 {
        self.coefficient * self.average
    }
}

/// Order matters: position is part of the round-trip identity.
pub type ModuleList = Vec<Module>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub modules: ModuleList,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied by `TemplateStore::update`; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub modules: Option<ModuleList>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageSummary {
    pub average: f64,
    pub total_coefficients: f64,
    pub weighted_total: f64,
    pub passed: bool,
}
