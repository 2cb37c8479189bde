//! Rendering of duplicate reports

use std::path::Path;

use refdup_core::bibtex::format_entries;
use refdup_core::{DetectionReport, ReportFormat};

/// Render the report for one file in the requested format
pub fn render(
    format: ReportFormat,
    path: &Path,
    report: &DetectionReport,
) -> Result<String, serde_json::Error> {
    let rendered = match format {
        ReportFormat::Text => render_text(path, report),
        ReportFormat::Json => render_json(path, report)?,
        ReportFormat::Keys => render_keys(report),
        ReportFormat::Bibtex => render_bibtex(report),
    };
    Ok(rendered)
}

/// Human-readable summary, positions shown 1-based
fn render_text(path: &Path, report: &DetectionReport) -> String {
    let mut out = String::new();

    if report.has_duplicates() {
        out.push_str(&format!(
            "{}: {} duplicate(s) among {} entries\n",
            path.display(),
            report.duplicates.len(),
            report.entry_count
        ));
        for group in &report.groups {
            let repeats: Vec<String> = group
                .duplicate_positions
                .iter()
                .map(|p| (p + 1).to_string())
                .collect();
            out.push_str(&format!(
                "  {}: {} occurrences, first at entry {}, repeated at entry {}\n",
                group.key,
                group.occurrences(),
                group.first_position + 1,
                repeats.join(", ")
            ));
        }
    } else {
        out.push_str(&format!(
            "{}: no duplicates among {} entries\n",
            path.display(),
            report.entry_count
        ));
    }

    if !report.skipped.is_empty() {
        let lines: Vec<String> = report.skipped.iter().map(|s| s.line.to_string()).collect();
        out.push_str(&format!(
            "  {} malformed segment(s) at line {}\n",
            report.skipped.len(),
            lines.join(", ")
        ));
    }

    out
}

fn render_json(path: &Path, report: &DetectionReport) -> Result<String, serde_json::Error> {
    let value = serde_json::json!({
        "file": path.display().to_string(),
        "report": report,
    });
    let mut out = serde_json::to_string_pretty(&value)?;
    out.push('\n');
    Ok(out)
}

/// One line per reported duplicate
fn render_keys(report: &DetectionReport) -> String {
    report
        .duplicates
        .iter()
        .map(|e| format!("{}\n", e.cite_key))
        .collect()
}

fn render_bibtex(report: &DetectionReport) -> String {
    if report.duplicates.is_empty() {
        return String::new();
    }
    let mut out = format_entries(&report.duplicates);
    out.push('\n');
    out
}
