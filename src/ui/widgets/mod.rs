pub mod bar_chart;
pub mod help_panel;
pub mod issue_list;
pub mod progress_bar;
pub mod ring_chart;
pub mod stage_track;
pub mod status_bar;
