use crate::core::stages::StageState;
use crate::models::scan_result::ScanResult;

/// Where a scan session sends everything the user should see.
///
/// `render_result` must fully replace what a previous call drew, so calling
/// it twice with the same counts leaves the same picture behind.
pub trait PresentationSink: Send {
    /// Back to the initial picture: 0 %, `Starting...`, no highlighted
    /// stage, result section hidden.
    fn reset(&mut self);

    fn update_progress(&mut self, percent: f64, status_label: &str);

    fn highlight_stages(&mut self, stages: &[StageState]);

    fn render_result(&mut self, result: &ScanResult);

    fn set_result_visible(&mut self, visible: bool);

    /// A failure or notice the user has to acknowledge.
    fn notify(&mut self, message: &str);
}

pub const STARTING_LABEL: &str = "Starting...";
