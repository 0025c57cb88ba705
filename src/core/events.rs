use tokio::sync::mpsc;

use crate::core::sink::PresentationSink;
use crate::core::stages::{StagePartition, StageState};
use crate::models::scan_result::ScanResult;

/// Presentation calls carried from a scan session to the UI task.
#[derive(Debug, Clone)]
pub enum Event {
    Reset,
    Progress { percent: f64, status_label: String },
    Stages(StagePartition),
    Result(Box<ScanResult>),
    ResultVisible(bool),
    Notice(String),
}

impl Event {
    pub fn apply<S: PresentationSink + ?Sized>(self, sink: &mut S) {
        match self {
            Event::Reset => sink.reset(),
            Event::Progress {
                percent,
                status_label,
            } => sink.update_progress(percent, &status_label),
            Event::Stages(stages) => sink.highlight_stages(&stages),
            Event::Result(result) => sink.render_result(&result),
            Event::ResultVisible(visible) => sink.set_result_visible(visible),
            Event::Notice(message) => sink.notify(&message),
        }
    }
}

pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Forwards every call over the channel. A closed channel means the UI is
/// gone, so sends are dropped silently.
impl PresentationSink for EventSender {
    fn reset(&mut self) {
        let _ = self.send(Event::Reset);
    }

    fn update_progress(&mut self, percent: f64, status_label: &str) {
        let _ = self.send(Event::Progress {
            percent,
            status_label: status_label.to_string(),
        });
    }

    fn highlight_stages(&mut self, stages: &[StageState]) {
        let _ = self.send(Event::Stages(stages.iter().cloned().collect()));
    }

    fn render_result(&mut self, result: &ScanResult) {
        let _ = self.send(Event::Result(Box::new(result.clone())));
    }

    fn set_result_visible(&mut self, visible: bool) {
        let _ = self.send(Event::ResultVisible(visible));
    }

    fn notify(&mut self, message: &str) {
        let _ = self.send(Event::Notice(message.to_string()));
    }
}
