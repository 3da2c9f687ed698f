use crate::domain::model::{ModuleList, Template, TemplateUpdate};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ShareError};
use chrono::Utc;
use uuid::Uuid;

pub const TEMPLATES_STORAGE_KEY: &str = "semester-calculator-templates.json";

/// Saved module lists, kept as a single JSON array in `Storage`.
pub struct TemplateStore<S: Storage> {
    storage: S,
}

impl<S: Storage> TemplateStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// 讀取失敗時回傳空清單，不中斷流程
    pub fn all(&self) -> Vec<Template> {
        match self.load() {
            Ok(templates) => templates,
            Err(e) => {
                tracing::error!("Failed to load templates: {}", e);
                Vec::new()
            }
        }
    }

    fn load(&self) -> Result<Vec<Template>> {
        match self.storage.read(TEMPLATES_STORAGE_KEY)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, templates: &[Template]) -> Result<()> {
        let json = serde_json::to_vec_pretty(templates)?;
        self.storage.write(TEMPLATES_STORAGE_KEY, &json)
    }

    pub fn get(&self, id: &str) -> Option<Template> {
        self.all().into_iter().find(|t| t.id == id)
    }

    pub fn save(
        &self,
        name: impl Into<String>,
        description: Option<String>,
        modules: ModuleList,
    ) -> Result<Template> {
        let mut templates = self.all();
        let now = Utc::now();
        let template = Template {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description,
            modules,
            created_at: now,
            updated_at: now,
        };

        templates.push(template.clone());
        self.persist(&templates)?;
        tracing::info!("Saved template '{}' ({})", template.name, template.id);
        Ok(template)
    }

    pub fn update(&self, id: &str, update: TemplateUpdate) -> Result<Template> {
        let mut templates = self.all();
        let template = templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ShareError::TemplateNotFound { id: id.to_string() })?;

        if let Some(name) = update.name {
            template.name = name;
        }
        if let Some(description) = update.description {
            template.description = description;
        }
        if let Some(modules) = update.modules {
            template.modules = modules;
        }
        template.updated_at = Utc::now();

        let updated = template.clone();
        self.persist(&templates)?;
        Ok(updated)
    }

    /// `false` when no template has that id.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let templates = self.all();
        let before = templates.len();
        let remaining: Vec<Template> = templates.into_iter().filter(|t| t.id != id).collect();

        if remaining.len() == before {
            return Ok(false);
        }

        self.persist(&remaining)?;
        Ok(true)
    }
}

/// Fresh copy of a template's modules, ready to load into the form.
pub fn apply_template(template: &Template) -> ModuleList {
    template.modules.clone()
}
