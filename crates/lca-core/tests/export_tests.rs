use chrono::{TimeZone, Utc};
use lca_core::export::{file_name, render};
use lca_core::{ExportDocument, ExportFormat, ImpactResult, ProjectId, ProjectInput, ScoringEngine};
use pretty_assertions::assert_eq;

fn fixed_result() -> ImpactResult {
    let input = ProjectInput::create().with_name("Copper Wire, Grade A");
    let mut result = ScoringEngine::seeded(11).score(&input).unwrap();
    result.project_id = ProjectId::from_millis(1_760_000_000_000);
    result.timestamp = Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap();
    result
}

#[test]
fn csv_has_header_metric_rows_and_score() {
    let result = fixed_result();
    let csv = render(&result, ExportFormat::Csv).unwrap();
    let lines: Vec<_> = csv.lines().collect();

    assert_eq!(lines[0], "Category,Metric,Value,Unit,Rating");
    assert_eq!(lines[1], "Environmental Impact,Carbon Footprint,11.25,kg CO2-eq,high");
    assert_eq!(lines[2], "Environmental Impact,Water Usage,1380,liters,high");
    assert_eq!(lines[3], "Environmental Impact,Energy Consumption,45,MJ,high");
    assert!(lines[4].starts_with("Environmental Impact,Waste Generation,"));
    assert_eq!(lines[5], "Project Info,Name,\"Copper Wire, Grade A\",,");
    assert_eq!(lines[6], "Project Info,Id,proj_1760000000000,,");
    assert_eq!(lines[7], "Project Info,Date,2026-10-14,,");
    assert_eq!(*lines.last().unwrap(), "Circularity,Score,75,%,");
}

#[test]
fn text_report_lists_numbered_recommendations() {
    let result = fixed_result();
    let text = render(&result, ExportFormat::Text).unwrap();

    assert!(text.starts_with("LCA ANALYSIS REPORT\n"));
    assert!(text.contains("- Raw Material Percentage: 80%"));
    assert!(text.contains("- Transport Distance: 500 km"));
    assert!(text.contains("- Carbon Footprint: 11.25 kg CO2-eq (high impact)"));
    assert!(text.contains("Circularity Score: 75%"));
    assert!(text.contains("1. Increase recycled content to 95% to reduce carbon footprint"));
    assert!(text.contains("4. Implement circular design principles"));
    assert!(text.contains("Generated on: 2026-10-14 09:30:00 UTC"));
}

#[test]
fn json_export_parses_back_into_document() {
    let result = fixed_result();
    let json = render(&result, ExportFormat::Json).unwrap();
    let parsed: ExportDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, ExportDocument::from_result(&result));
    assert_eq!(parsed.circularity_score, 75);
    assert_eq!(parsed.project_info.recycled_percentage, 20);
}

#[test]
fn exports_are_deterministic() {
    let result = fixed_result();
    for format in [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Text] {
        assert_eq!(render(&result, format).unwrap(), render(&result, format).unwrap());
    }
}

#[test]
fn download_name_uses_result_date() {
    let result = fixed_result();
    assert_eq!(
        file_name(&result, ExportFormat::Csv),
        "LCA_Analysis_Copper_Wire,_Grade_A_2026-10-14.csv"
    );

    let mut unnamed = result;
    unnamed.project_data.project_name = String::new();
    assert_eq!(
        file_name(&unnamed, ExportFormat::Text),
        "LCA_Analysis_Report_2026-10-14.txt"
    );
}

#[test]
fn download_name_is_header_safe() {
    let mut result = fixed_result();
    result.project_data.project_name = "Bar \"7\\8\"\u{1}\tRev".to_string();
    let name = file_name(&result, ExportFormat::Json);
    assert_eq!(name, "LCA_Analysis_Bar__7_8___Rev_2026-10-14.json");
    assert!(name.chars().all(|c| c != '"' && c != '\\' && !c.is_control()));
}
