use clap::Parser;
use grade_share::config::cli::{Command, ModuleInput, TemplateCommand};
use grade_share::core::export::{default_csv_filename, write_csv};
use grade_share::core::templates::apply_template;
use grade_share::utils::error::{ErrorSeverity, Result, ShareError};
use grade_share::utils::{logger, validation::Validate};
use grade_share::{
    generate_shareable_url, summarize, CliConfig, LocalStorage, Module, QueryParams,
    TemplateStore, TomlConfig, UrlCodec,
};
use std::path::{Path, PathBuf};
use url::Url;

fn main() {
    let config = CliConfig::parse();

    let file_config = match &config.config {
        Some(path) => TomlConfig::from_file(path),
        None => Ok(TomlConfig::default()),
    };

    // 初始化日誌
    let level = file_config
        .as_ref()
        .ok()
        .and_then(|c| c.log_level())
        .map(str::to_string);
    if config.json_logs {
        logger::init_json_logger(config.verbose, level.as_deref());
    } else {
        logger::init_cli_logger(config.verbose, level.as_deref());
    }

    tracing::debug!("CLI config: {:?}", config);

    let result = file_config.and_then(|file_config| {
        file_config.validate()?;
        run(&config, &file_config)
    });

    if let Err(e) = result {
        tracing::error!(
            "❌ grade-share failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn run(cli: &CliConfig, file_config: &TomlConfig) -> Result<()> {
    let codec = UrlCodec::with_limits(file_config.codec_limits());

    match &cli.command {
        Command::Encode(input) => {
            let modules = input.resolve()?;
            let encoded = shareable(&codec, &modules)?;
            tracing::info!("Encoded with {} tier", encoded.tier);
            println!("{}", encoded.fragment);
        }
        Command::Decode { link } => {
            let params = parse_link(link);
            match codec.decode(&params) {
                Some(modules) => print_modules(&modules),
                None => eprintln!("No shareable data found in this link"),
            }
        }
        Command::Share { base_url, input } => {
            let modules = input.resolve()?;
            let base_url = base_url
                .as_deref()
                .or_else(|| file_config.base_url())
                .ok_or_else(|| ShareError::MissingConfigError {
                    field: "--base-url or [share].base_url".to_string(),
                })?;
            grade_share::utils::validation::validate_url("base_url", base_url)?;
            modules.validate()?;
            println!("{}", generate_shareable_url(&codec, base_url, &modules));
        }
        Command::Average(input) => {
            let modules = input.resolve()?;
            print_modules(&modules);
        }
        Command::ExportCsv { output, input } => {
            let modules = input.resolve()?;
            modules.validate()?;
            let summary = summarize(&modules).ok_or_else(|| ShareError::ValidationError {
                message: "total coefficient is zero".to_string(),
            })?;

            let path = output.clone().unwrap_or_else(|| {
                PathBuf::from(default_csv_filename(chrono::Local::now().date_naive()))
            });
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let storage = LocalStorage::new(dir.unwrap_or_else(|| Path::new(".")));
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| ShareError::InvalidConfigValueError {
                    field: "--output".to_string(),
                    value: path.display().to_string(),
                    reason: "Output path has no file name".to_string(),
                })?;

            write_csv(&storage, filename, &modules, summary.average)?;
            println!("📁 Results saved to: {}", path.display());
        }
        Command::Template { action } => run_template(cli, file_config, &codec, action)?,
    }

    Ok(())
}

fn run_template(
    cli: &CliConfig,
    file_config: &TomlConfig,
    codec: &UrlCodec,
    action: &TemplateCommand,
) -> Result<()> {
    let dir = cli
        .templates_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(file_config.templates_dir()));
    let store = TemplateStore::new(LocalStorage::new(dir));

    match action {
        TemplateCommand::List => {
            let templates = store.all();
            if templates.is_empty() {
                println!("No saved templates");
            }
            for template in templates {
                println!(
                    "{}  {}  ({} modules, updated {})",
                    template.id,
                    template.name,
                    template.modules.len(),
                    template.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        TemplateCommand::Save {
            name,
            description,
            input,
        } => {
            let modules = input.resolve()?;
            let template = store.save(name.clone(), description.clone(), modules)?;
            println!("✅ Saved template {} ({})", template.name, template.id);
        }
        TemplateCommand::Show { id } => {
            let template = find_template(&store, id)?;
            println!("{}", serde_json::to_string_pretty(&template)?);
        }
        TemplateCommand::Apply { id } => {
            let template = find_template(&store, id)?;
            let modules = apply_template(&template);
            print_modules(&modules);
            let fragment = codec.encode(&modules);
            if !fragment.is_empty() {
                println!("?{}", fragment);
            }
        }
        TemplateCommand::Delete { id } => {
            if store.delete(id)? {
                println!("🗑️  Deleted template {}", id);
            } else {
                return Err(ShareError::TemplateNotFound { id: id.clone() });
            }
        }
    }

    Ok(())
}

fn find_template(
    store: &TemplateStore<LocalStorage>,
    id: &str,
) -> Result<grade_share::core::Template> {
    store
        .get(id)
        .ok_or_else(|| ShareError::TemplateNotFound { id: id.to_string() })
}

fn shareable(
    codec: &UrlCodec,
    modules: &[Module],
) -> Result<grade_share::core::url_codec::EncodedFragment> {
    match codec.encode_detailed(modules) {
        Some(encoded) => Ok(encoded),
        // 編碼只在資料不完整時回傳 None，用驗證結果說明原因
        None => Err(modules.validate().err().unwrap_or_else(|| ShareError::ValidationError {
            message: "module list is not complete".to_string(),
        })),
    }
}

fn parse_link(link: &str) -> QueryParams {
    match Url::parse(link) {
        Ok(url) if url.has_host() || url.scheme() == "file" => QueryParams::from_url(&url),
        _ => QueryParams::parse(link),
    }
}

fn print_modules(modules: &[Module]) {
    for module in modules {
        println!(
            "{:<30} coef {:>5}  avg {:>6}",
            module.name, module.coefficient, module.average
        );
    }
    match summarize(modules) {
        Some(summary) => println!(
            "Average: {:.2} ({})",
            summary.average,
            if summary.passed { "Pass" } else { "Fail" }
        ),
        None => println!("Average: n/a"),
    }
}
