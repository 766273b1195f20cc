//! Read-only export projections of an [`ImpactResult`]
//!
//! JSON, CSV and plain-text renderings. Output depends only on the result
//! (dates come from its timestamp), so exporting the same result twice yields
//! identical bytes.

use crate::error::ValidationError;
use crate::types::{EnvironmentalImpacts, ImpactResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

const CSV_HEADER: &str = "Category,Metric,Value,Unit,Rating";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Structured dump
    Json,
    /// Flattened rows
    Csv,
    /// Human-readable report
    Text,
}

impl ExportFormat {
    /// File extension
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }

    /// MIME type
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Text => "text/plain",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ValidationError::unknown("format", s)),
        }
    }
}

/// Project section of an export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    /// Project name, or a placeholder when empty
    pub name: String,
    /// Result id
    pub id: String,
    /// Analysis date, `YYYY-MM-DD`
    pub date: String,
    /// Metal
    pub metal: String,
    /// Virgin share
    pub raw_material_percentage: u8,
    /// Recycled share
    pub recycled_percentage: u8,
    /// Energy source
    pub energy_source: String,
    /// Transport distance in km
    pub transport_distance: f64,
    /// End-of-life option
    pub end_of_life_option: String,
}

impl ProjectInfo {
    fn rows(&self) -> [(&'static str, String); 9] {
        [
            ("Name", self.name.clone()),
            ("Id", self.id.clone()),
            ("Date", self.date.clone()),
            ("Metal", self.metal.clone()),
            ("Raw Material Percentage", self.raw_material_percentage.to_string()),
            ("Recycled Percentage", self.recycled_percentage.to_string()),
            ("Energy Source", self.energy_source.clone()),
            ("Transport Distance", self.transport_distance.to_string()),
            ("End Of Life Option", self.end_of_life_option.clone()),
        ]
    }
}

/// Flattened view shared by all export formats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Project section
    pub project_info: ProjectInfo,
    /// Metrics
    pub environmental_impacts: EnvironmentalImpacts,
    /// Circularity score in percent
    pub circularity_score: u8,
    /// Recommendations in display order
    pub recommendations: Vec<String>,
    /// Full analysis timestamp
    pub analysis_date: String,
}

impl ExportDocument {
    /// Project `result` into an export document
    #[must_use]
    pub fn from_result(result: &ImpactResult) -> Self {
        let input = &result.project_data;
        let name = if input.project_name.trim().is_empty() {
            "LCA Analysis".to_string()
        } else {
            input.project_name.clone()
        };

        Self {
            project_info: ProjectInfo {
                name,
                id: result.project_id.to_string(),
                date: result.timestamp.format("%Y-%m-%d").to_string(),
                metal: input.metal.to_string(),
                raw_material_percentage: input.raw_material_percentage,
                recycled_percentage: input.recycled_percentage(),
                energy_source: input.energy_source.to_string(),
                transport_distance: input.transport_distance,
                end_of_life_option: input.end_of_life_option.to_string(),
            },
            environmental_impacts: result.environmental_impacts.clone(),
            circularity_score: result.circular_flow_data.circularity_score,
            recommendations: result.recommendations.clone(),
            analysis_date: result.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

/// Render `result` in `format`
///
/// # Errors
/// Only JSON rendering can fail, and only if serialization itself fails.
pub fn render(result: &ImpactResult, format: ExportFormat) -> Result<String, serde_json::Error> {
    let document = ExportDocument::from_result(result);
    match format {
        ExportFormat::Json => serde_json::to_string_pretty(&document),
        ExportFormat::Csv => Ok(to_csv(&document)),
        ExportFormat::Text => Ok(to_text(&document)),
    }
}

/// Suggested download name, e.g. `LCA_Analysis_Copper_Wire_2026-10-14.csv`
///
/// Quotes, backslashes and control characters become `_` so the name can sit
/// inside a quoted `Content-Disposition` parameter.
#[must_use]
pub fn file_name(result: &ImpactResult, format: ExportFormat) -> String {
    let name = result.project_data.project_name.trim();
    let stem = if name.is_empty() {
        "Report".to_string()
    } else {
        name.split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .chars()
            .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
            .collect()
    };
    format!(
        "LCA_Analysis_{stem}_{}.{}",
        result.timestamp.format("%Y-%m-%d"),
        format.extension()
    )
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn to_csv(document: &ExportDocument) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for (kind, metric) in document.environmental_impacts.iter() {
        let _ = writeln!(
            out,
            "Environmental Impact,{},{},{},{}",
            kind.label(),
            metric.value,
            csv_field(&metric.unit),
            metric.rating
        );
    }
    for (label, value) in document.project_info.rows() {
        let _ = writeln!(out, "Project Info,{label},{},,", csv_field(&value));
    }
    let _ = writeln!(out, "Circularity,Score,{},%,", document.circularity_score);
    out
}

fn to_text(document: &ExportDocument) -> String {
    let info = &document.project_info;
    let mut out = String::new();

    out.push_str("LCA ANALYSIS REPORT\n");
    out.push_str("===================\n\n");

    out.push_str("Project Information:\n");
    let _ = writeln!(out, "- Name: {}", info.name);
    let _ = writeln!(out, "- ID: {}", info.id);
    let _ = writeln!(out, "- Analysis Date: {}", info.date);
    let _ = writeln!(out, "- Metal Type: {}", info.metal);
    let _ = writeln!(out, "- Raw Material Percentage: {}%", info.raw_material_percentage);
    let _ = writeln!(out, "- Recycled Content: {}%", info.recycled_percentage);
    let _ = writeln!(out, "- Energy Source: {}", info.energy_source);
    let _ = writeln!(out, "- Transport Distance: {} km", info.transport_distance);
    let _ = writeln!(out, "- End-of-Life Option: {}", info.end_of_life_option);
    out.push('\n');

    out.push_str("Environmental Impact Results:\n");
    for (kind, metric) in document.environmental_impacts.iter() {
        let _ = writeln!(
            out,
            "- {}: {} {} ({} impact)",
            kind.label(),
            metric.value,
            metric.unit,
            metric.rating
        );
    }
    out.push('\n');

    let _ = writeln!(out, "Circularity Score: {}%", document.circularity_score);
    out.push('\n');

    out.push_str("Recommendations:\n");
    for (index, recommendation) in document.recommendations.iter().enumerate() {
        let _ = writeln!(out, "{}. {recommendation}", index + 1);
    }
    out.push('\n');

    let _ = writeln!(out, "Generated on: {}", document.analysis_date);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn mime_and_extension() {
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
        assert_eq!(ExportFormat::Text.extension(), "txt");
    }
}
