// Report module - 报告输出
// 控制台摘要、JSON 报告和 HTML 报告

use crate::error::Result;
use crate::model::{CoverageReport, SchemaCoverage};
use std::fmt::Write;
use std::fs;
use std::path::Path;

const MAX_MISSING_ENDPOINTS: usize = 10;
const MAX_SCHEMA_DETAILS: usize = 5;

/// Human-readable summary printed after an analysis.
pub fn render_summary(report: &CoverageReport, verbose: bool) -> String {
    let mut out = String::new();
    // fmt::Write on a String cannot fail
    let _ = write_summary(&mut out, report, verbose);
    out
}

fn write_summary(out: &mut String, report: &CoverageReport, verbose: bool) -> std::fmt::Result {
    writeln!(out, "=== ENDPOINT COVERAGE ===")?;
    writeln!(out, "Total Endpoints: {}", report.total_endpoints)?;
    writeln!(out, "Covered Endpoints: {}", report.covered_endpoints)?;
    writeln!(out, "Coverage Percentage: {:.2}%", report.coverage_percent)?;

    let schemas = &report.schema_analysis;
    writeln!(out, "\n=== SCHEMA COVERAGE ===")?;
    writeln!(out, "Total Schemas: {}", schemas.total_schemas)?;
    writeln!(out, "Covered Schemas: {}", schemas.covered_schemas)?;
    writeln!(out, "Schema Coverage Percentage: {:.2}%", schemas.schema_coverage_percent)?;
    writeln!(
        out,
        "Property Coverage: {}/{} ({:.2}%)",
        schemas.covered_properties, schemas.total_properties, schemas.property_coverage_percent
    )?;

    writeln!(out, "\n=== RESOURCE ANALYSIS ===")?;
    writeln!(out, "Total Resources: {}", report.resource_analysis.len())?;
    for (name, resource) in &report.resource_analysis {
        let operations: Vec<&str> = resource.supported_operations.iter().map(|op| op.as_str()).collect();
        writeln!(
            out,
            "- {}: {} properties, [{}] operations",
            name,
            resource.schema_properties.len(),
            operations.join(" ")
        )?;
    }

    writeln!(out, "\n=== DATA SOURCE ANALYSIS ===")?;
    writeln!(out, "Total Data Sources: {}", report.data_source_analysis.len())?;
    for (name, data_source) in &report.data_source_analysis {
        writeln!(out, "- {}: {} properties", name, data_source.schema_properties.len())?;
    }

    writeln!(out, "\n=== TOP MISSING ENDPOINTS ===")?;
    for coverage in report
        .endpoint_details
        .values()
        .filter(|c| !c.missing.is_empty())
        .take(MAX_MISSING_ENDPOINTS)
    {
        writeln!(out, "- {} ({})", coverage.path, coverage.missing.join(", "))?;
    }

    if !schemas.schema_details.is_empty() {
        writeln!(out, "\n=== SCHEMA DETAILS (Top {}) ===", MAX_SCHEMA_DETAILS)?;
        for schema in schemas.schema_details.values().take(MAX_SCHEMA_DETAILS) {
            writeln!(out, "Schema: {}", schema.schema_name)?;
            writeln!(out, "  Total Properties: {}", schema.total_properties)?;
            writeln!(out, "  Covered Properties: {}", schema.covered_properties)?;
            writeln!(out, "  Missing Properties: [{}]", schema.missing_properties.join(" "))?;
            writeln!(out)?;
        }
    }

    if verbose {
        let diagnostics = &report.diagnostics;
        writeln!(out, "\n=== DIAGNOSTICS ===")?;
        writeln!(out, "Files Analyzed: {}", diagnostics.files_analyzed)?;
        writeln!(out, "Files With Errors: {}", diagnostics.files_with_errors)?;
        writeln!(out, "API Calls Found: {}", diagnostics.total_api_calls_found)?;
        writeln!(out, "Resources Found: {}", diagnostics.found_resources.len())?;
        writeln!(out, "Data Sources Found: {}", diagnostics.found_data_sources.len())?;
        for error in &diagnostics.errors {
            writeln!(out, "! {}", error)?;
        }
    }

    Ok(())
}

/// Writes the report as pretty-printed JSON.
pub fn save_json(report: &CoverageReport, path: &Path) -> Result<()> {
    let json_str = serde_json::to_string_pretty(report)?;
    fs::write(path, json_str)?;
    tracing::info!("Report saved to {}", path.display());
    Ok(())
}

pub fn save_html(report: &CoverageReport, path: &Path) -> Result<()> {
    fs::write(path, render_html(report))?;
    tracing::info!("HTML report saved to {}", path.display());
    Ok(())
}

pub fn render_html(report: &CoverageReport) -> String {
    let schemas = &report.schema_analysis;
    let mut html = vec![
        "<!DOCTYPE html><html><head><meta charset='utf-8'>".to_string(),
        "<title>API Coverage Report</title>".to_string(),
        "<style>body{font-family:sans-serif;} summary{cursor:pointer;} .ok{color:#4caf50;} .ko{color:#f44336;}</style>".to_string(),
        "</head><body>".to_string(),
        "<h1>API Coverage Report</h1>".to_string(),
        format!("<p>Generated at {}</p>", escape_html(&report.generated_at)),
        format!("<h2>Overall coverage: {:.2}%</h2>", report.coverage_percent),
        format!(
            "<p>Covered endpoints: {} / {}</p>",
            report.covered_endpoints, report.total_endpoints
        ),
        "<h2>Schema coverage</h2>".to_string(),
        format!(
            "<p>Covered schemas: {} / {}</p>",
            schemas.covered_schemas, schemas.total_schemas
        ),
        "<div>".to_string(),
    ];

    for (name, schema) in &schemas.schema_details {
        html.push(render_schema(name, schema));
    }

    html.push("</div>".to_string());
    html.push("</body></html>".to_string());
    html.join("\n")
}

fn render_schema(name: &str, schema: &SchemaCoverage) -> String {
    let mut html = format!(
        "<details><summary><b>{}</b> ({}/{} covered)</summary>\n<ul>",
        escape_html(name),
        schema.covered_properties,
        schema.total_properties
    );
    for (prop_name, property) in &schema.properties {
        let class = if property.covered { "ok" } else { "ko" };
        html.push_str(&format!(
            "<li><span class=\"{}\">{}</span></li>",
            class,
            escape_html(prop_name)
        ));
    }
    if !schema.missing_properties.is_empty() {
        let missing: Vec<String> = schema.missing_properties.iter().map(|p| escape_html(p)).collect();
        html.push_str(&format!("<li><b>Missing:</b> {}</li>", missing.join(", ")));
    }
    html.push_str("</ul></details>\n");
    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
