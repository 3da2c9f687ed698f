use crate::domain::model::{Module, ModuleList};
use crate::utils::error::{Result, ShareError};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "grade-share")]
#[command(about = "Weighted average calculator with compact share links")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, global = true, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory holding saved templates")]
    pub templates_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the share fragment for a module list
    Encode(ModuleInput),
    /// Read modules back from a share link or query string
    Decode {
        link: String,
    },
    /// Print a full share URL
    Share {
        #[arg(long)]
        base_url: Option<String>,
        #[command(flatten)]
        input: ModuleInput,
    },
    /// Compute the weighted average
    Average(ModuleInput),
    /// Export results as CSV
    ExportCsv {
        #[arg(long, help = "Output file (defaults to semester-results-<date>.csv)")]
        output: Option<PathBuf>,
        #[command(flatten)]
        input: ModuleInput,
    },
    /// Manage saved templates
    Template {
        #[command(subcommand)]
        action: TemplateCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TemplateCommand {
    List,
    Save {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        input: ModuleInput,
    },
    Show {
        id: String,
    },
    /// Print a template's modules and its share fragment
    Apply {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ModuleInput {
    #[arg(
        long = "module",
        short = 'm',
        value_name = "NAME:COEF:AVG",
        value_parser = parse_module_arg
    )]
    pub modules: Vec<Module>,

    #[arg(long, help = "JSON file with a module array or {\"modules\": [...]}")]
    pub input: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModuleFile {
    Bare(ModuleList),
    Wrapped { modules: ModuleList },
}

impl ModuleInput {
    pub fn resolve(&self) -> Result<ModuleList> {
        let mut modules = match &self.input {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                match serde_json::from_str::<ModuleFile>(&content)? {
                    ModuleFile::Bare(list) | ModuleFile::Wrapped { modules: list } => list,
                }
            }
            None => Vec::new(),
        };
        modules.extend(self.modules.iter().cloned());

        if modules.is_empty() {
            return Err(ShareError::MissingConfigError {
                field: "--module or --input".to_string(),
            });
        }
        Ok(modules)
    }
}

/// `NAME:COEF:AVG`, split from the right so names may contain ':'.
pub fn parse_module_arg(value: &str) -> std::result::Result<Module, String> {
    let mut parts = value.rsplitn(3, ':');
    let (Some(avg), Some(coef), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected NAME:COEF:AVG, got '{}'", value));
    };

    let coefficient = coef
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid coefficient '{}': {}", coef, e))?;
    let average = avg
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid average '{}': {}", avg, e))?;

    Ok(Module::new(name, coefficient, average))
}
