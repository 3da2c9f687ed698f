use crate::core::calculator::PASS_THRESHOLD;
use crate::domain::model::Module;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ShareError};
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};

const HEADERS: [&str; 4] = ["Module Name", "Coefficient", "Score", "Weighted Score"];

pub fn default_csv_filename(date: NaiveDate) -> String {
    format!("semester-results-{}.csv", date.format("%Y-%m-%d"))
}

/// 每個欄位都加引號，結尾附上總計與及格狀態
pub fn export_csv(modules: &[Module], average: f64) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;

    for module in modules {
        writer.write_record([
            module.name.clone(),
            module.coefficient.to_string(),
            module.average.to_string(),
            format!("{:.2}", module.weighted_score()),
        ])?;
    }

    let total_coefficients: f64 = modules.iter().map(|m| m.coefficient).sum();
    writer.write_record([
        "TOTAL".to_string(),
        total_coefficients.to_string(),
        String::new(),
        format!("{:.2}", average * total_coefficients),
    ])?;

    writer.write_record(["", "", "", ""])?;
    let average_text = format!("{:.2}", average);
    writer.write_record(["Semester Average", average_text.as_str(), "", ""])?;
    let status = if average >= PASS_THRESHOLD { "Pass" } else { "Fail" };
    writer.write_record(["Status", status, "", ""])?;

    let bytes = writer.into_inner().map_err(|e| ShareError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ShareError::ValidationError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

/// Writes the export under `filename` and returns the CSV text.
pub fn write_csv<S: Storage>(
    storage: &S,
    filename: &str,
    modules: &[Module],
    average: f64,
) -> Result<String> {
    let content = export_csv(modules, average)?;
    storage.write(filename, content.as_bytes())?;
    tracing::info!("Exported {} modules to {}", modules.len(), filename);
    Ok(content)
}
