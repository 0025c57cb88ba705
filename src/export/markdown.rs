use std::fmt::Write;
use std::path::Path;

use crate::models::scan_result::ScanResult;
use crate::ui::format::{format_count, format_seconds};

pub fn export_markdown(
    result: &ScanResult,
    scanned_file: &Path,
    output_path: &Path,
) -> anyhow::Result<()> {
    let md = render_markdown(result, scanned_file)?;
    std::fs::write(output_path, md)?;
    Ok(())
}

pub fn render_markdown(result: &ScanResult, scanned_file: &Path) -> Result<String, std::fmt::Error> {
    let mut md = String::new();

    writeln!(md, "# Scan Report")?;
    writeln!(md)?;
    writeln!(md, "- **File:** {}", scanned_file.display())?;
    writeln!(md, "- **Generated:** {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(md, "- **Total issues:** {}", format_count(result.total_issues))?;
    writeln!(md, "- **Sequential scan:** {} s", format_seconds(result.time_taken_sequential))?;
    writeln!(md, "- **Parallel scan:** {} s", format_seconds(result.time_taken_parallel))?;
    writeln!(md)?;

    writeln!(md, "## Issues by Category")?;
    writeln!(md)?;
    writeln!(md, "| Category | Issues | % |")?;
    writeln!(md, "|----------|-------:|--:|")?;
    let total = result.by_category.sum();
    for (name, count) in result.by_category.labelled() {
        let pct = if total > 0 {
            count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        writeln!(md, "| {} | {} | {:.1}% |", name, format_count(count), pct)?;
    }

    if !result.samples.is_empty() {
        writeln!(md)?;
        writeln!(md, "## Sample Matches ({} shown)", result.samples.len())?;
        writeln!(md)?;
        writeln!(md, "| Line | Category | Match |")?;
        writeln!(md, "|-----:|----------|-------|")?;
        for sample in &result.samples {
            writeln!(
                md,
                "| {} | {} | `{}` |",
                sample.line,
                sample.category,
                escape_cell(&sample.matched)
            )?;
        }
    }

    Ok(md)
}

fn escape_cell(s: &str) -> String {
    s.trim_end_matches(['\r', '\n'])
        .replace('|', "\\|")
        .replace('`', "'")
}
