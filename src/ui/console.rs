use std::io::Write;

use crate::core::sink::{PresentationSink, STARTING_LABEL};
use crate::core::stages::StageState;
use crate::models::scan_result::ScanResult;
use crate::ui::charts::ChartRegistry;
use crate::ui::format::{format_count, format_seconds};

/// Plain-text sink for `--headless` runs. Progress goes to `progress`
/// (stderr by default), the final summary to `summary` (stdout).
pub struct ConsoleSink {
    progress: Box<dyn Write + Send>,
    summary: Box<dyn Write + Send>,
    last_line: Option<String>,
    percent: f64,
    status_label: String,
    active_stages: Vec<String>,
    charts: ChartRegistry,
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(Box::new(std::io::stderr()), Box::new(std::io::stdout()))
    }
}

impl ConsoleSink {
    pub fn new(progress: Box<dyn Write + Send>, summary: Box<dyn Write + Send>) -> Self {
        Self {
            progress,
            summary,
            last_line: None,
            percent: 0.0,
            status_label: STARTING_LABEL.to_string(),
            active_stages: Vec::new(),
            charts: ChartRegistry::new(),
        }
    }

    /// Only changed lines are printed; polls repeat the same state a lot.
    fn emit_progress(&mut self) {
        let mut line = format!("[{:>3.0}%] {}", self.percent, self.status_label);
        if !self.active_stages.is_empty() {
            line.push_str(&format!("  <{}>", self.active_stages.join(", ")));
        }
        if self.last_line.as_deref() == Some(line.as_str()) {
            return;
        }
        let _ = writeln!(self.progress, "{}", line);
        self.last_line = Some(line);
    }
}

impl PresentationSink for ConsoleSink {
    fn reset(&mut self) {
        self.last_line = None;
        self.percent = 0.0;
        self.status_label = STARTING_LABEL.to_string();
        self.active_stages.clear();
        self.charts.clear();
        self.emit_progress();
    }

    fn update_progress(&mut self, percent: f64, status_label: &str) {
        self.percent = percent;
        self.status_label = status_label.to_string();
        self.emit_progress();
    }

    fn highlight_stages(&mut self, stages: &[StageState]) {
        self.active_stages = stages
            .iter()
            .filter(|s| s.active)
            .map(|s| s.label.to_string())
            .collect();
        self.emit_progress();
    }

    fn render_result(&mut self, result: &ScanResult) {
        self.charts.render_counts(&result.by_category);
        let _ = write!(self.summary, "{}", format_summary(result, &self.charts));
    }

    fn set_result_visible(&mut self, _visible: bool) {}

    fn notify(&mut self, message: &str) {
        let _ = writeln!(self.progress, "! {}", message);
    }
}

/// Text summary with a horizontal bar per category, scaled to the bar
/// chart's axis.
pub fn format_summary(result: &ScanResult, charts: &ChartRegistry) -> String {
    const BAR_WIDTH: u64 = 40;
    let mut out = String::new();
    out.push_str(&format!("Total issues: {}\n", format_count(result.total_issues)));

    let axis_max = charts.bar().map(|b| b.axis.max).unwrap_or(100).max(1);
    for (name, count) in result.by_category.labelled() {
        let filled = count
            .min(axis_max)
            .saturating_mul(BAR_WIDTH)
            .div_ceil(axis_max)
            .min(BAR_WIDTH) as usize;
        out.push_str(&format!(
            "  {:<10} {:>9}  {}\n",
            name,
            format_count(count),
            "\u{2588}".repeat(filled)
        ));
    }
    if let Some(bar) = charts.bar() {
        out.push_str(&format!(
            "  (axis 0..{} step {})\n",
            format_count(bar.axis.max),
            format_count(bar.axis.step)
        ));
    }
    out.push_str(&format!(
        "Sequential: {} s\nParallel:   {} s\n",
        format_seconds(result.time_taken_sequential),
        format_seconds(result.time_taken_parallel)
    ));
    out
}
