use std::path::PathBuf;

use crate::core::progress::PollSnapshot;
use crate::core::sink::{PresentationSink, STARTING_LABEL};
use crate::core::stages::{StagePartition, StageSet, StageState};
use crate::models::scan_result::ScanResult;
use crate::ui::charts::ChartRegistry;

pub struct AppState {
    pub file_path: PathBuf,
    pub server_url: String,
    pub percent: f64,
    pub status_label: String,
    pub stages: StagePartition,
    pub result: Option<ScanResult>,
    pub result_visible: bool,
    pub charts: ChartRegistry,
    /// Modal message; input is blocked until it is dismissed.
    pub notice: Option<String>,
    /// One-line message in the status bar.
    pub message: Option<String>,
    pub show_help: bool,
    pub poll_stats: Option<PollSnapshot>,
    pub last_outcome: Option<&'static str>,
    pub selected_index: usize,
    pub list_offset: usize,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(file_path: PathBuf, server_url: String, stages: &StageSet) -> Self {
        Self {
            file_path,
            server_url,
            percent: 0.0,
            status_label: String::new(),
            stages: stages.cleared(),
            result: None,
            result_visible: false,
            charts: ChartRegistry::new(),
            notice: None,
            message: None,
            show_help: false,
            poll_stats: None,
            last_outcome: None,
            selected_index: 0,
            list_offset: 0,
            should_quit: false,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.result.as_ref().map(|r| r.samples.len()).unwrap_or(0)
    }

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            if self.selected_index < self.list_offset {
                self.list_offset = self.selected_index;
            }
        }
    }

    pub fn move_down(&mut self) {
        let count = self.sample_count();
        if count > 0 && self.selected_index < count - 1 {
            self.selected_index += 1;
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn active_stage(&self) -> Option<&StageState> {
        self.stages.iter().find(|s| s.active)
    }
}

impl PresentationSink for AppState {
    fn reset(&mut self) {
        self.percent = 0.0;
        self.status_label = STARTING_LABEL.to_string();
        for stage in self.stages.iter_mut() {
            stage.active = false;
        }
        self.result = None;
        self.result_visible = false;
        self.charts.clear();
        self.last_outcome = None;
        self.poll_stats = None;
        self.selected_index = 0;
        self.list_offset = 0;
    }

    fn update_progress(&mut self, percent: f64, status_label: &str) {
        self.percent = percent;
        self.status_label = status_label.to_string();
    }

    fn highlight_stages(&mut self, stages: &[StageState]) {
        self.stages = stages.iter().cloned().collect();
    }

    fn render_result(&mut self, result: &ScanResult) {
        self.charts.render_counts(&result.by_category);
        self.result = Some(result.clone());
        self.selected_index = 0;
        self.list_offset = 0;
    }

    fn set_result_visible(&mut self, visible: bool) {
        self.result_visible = visible;
    }

    fn notify(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }
}
