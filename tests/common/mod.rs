#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use scanlens::config::settings::Settings;
use scanlens::core::client::ScanService;
use scanlens::core::retry::RetryPolicy;
use scanlens::core::sink::PresentationSink;
use scanlens::core::stages::StageState;
use scanlens::error::TransportError;
use scanlens::models::progress::{ScanProgress, ScanStatus};
use scanlens::models::request::{ScanOptions, UploadFile};
use scanlens::models::scan_result::ScanResult;

// ---------------------------------------------------------------------------
// Recording sink
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reset,
    Progress(f64, String),
    Stages(Vec<(String, bool)>),
    Result(ScanResult),
    Visible(bool),
    Notify(String),
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Notify(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn results(&self) -> Vec<ScanResult> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Result(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn ever_visible(&self) -> bool {
        self.calls().contains(&Call::Visible(true))
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PresentationSink for RecordingSink {
    fn reset(&mut self) {
        self.push(Call::Reset);
    }

    fn update_progress(&mut self, percent: f64, status_label: &str) {
        self.push(Call::Progress(percent, status_label.to_string()));
    }

    fn highlight_stages(&mut self, stages: &[StageState]) {
        self.push(Call::Stages(
            stages
                .iter()
                .map(|s| (s.label.to_string(), s.active))
                .collect(),
        ));
    }

    fn render_result(&mut self, result: &ScanResult) {
        self.push(Call::Result(result.clone()));
    }

    fn set_result_visible(&mut self, visible: bool) {
        self.push(Call::Visible(visible));
    }

    fn notify(&mut self, message: &str) {
        self.push(Call::Notify(message.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Scripted scan service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Step {
    Progress(ScanProgress),
    Fail(u16),
}

/// Answers polls from a script; the last step repeats forever.
#[derive(Default)]
pub struct ScriptedService {
    pub script: Mutex<VecDeque<Step>>,
    pub fail_start: bool,
    pub poll_delay: Duration,
    pub start_delay: Duration,
    pub start_calls: AtomicUsize,
    pub polls: AtomicUsize,
    pub submitted: Mutex<Vec<(String, ScanOptions)>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedService {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            ..Self::default()
        }
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Option<Step> {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }
}

#[async_trait]
impl ScanService for ScriptedService {
    async fn start_scan(
        &self,
        upload: UploadFile,
        options: ScanOptions,
    ) -> Result<(), TransportError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted
            .lock()
            .unwrap()
            .push((upload.file_name, options));
        if !self.start_delay.is_zero() {
            tokio::time::sleep(self.start_delay).await;
        }
        if self.fail_start {
            return Err(TransportError::HttpStatus {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(())
    }

    async fn scan_progress(&self) -> Result<ScanProgress, TransportError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.poll_delay.is_zero() {
            tokio::time::sleep(self.poll_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.next_step() {
            Some(Step::Progress(p)) => Ok(p),
            Some(Step::Fail(status)) => Err(TransportError::HttpStatus {
                status,
                body: String::new(),
            }),
            None => Err(TransportError::HttpStatus {
                status: 404,
                body: "empty script".into(),
            }),
        }
    }

    async fn download_report(&self) -> Result<Vec<u8>, TransportError> {
        Ok(b"line,category,matched_text,rule\n".to_vec())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn progress(percent: f64, status: ScanStatus, stage: &str, result: Option<Value>) -> ScanProgress {
    ScanProgress {
        progress: percent,
        status,
        stage: stage.to_string(),
        result,
    }
}

pub fn running(percent: f64, stage: &str) -> Step {
    Step::Progress(progress(percent, ScanStatus::Running, stage, None))
}

pub fn completed(result: Value) -> Step {
    Step::Progress(progress(100.0, ScanStatus::Completed, "Generating report", Some(result)))
}

pub fn errored(message: &str) -> Step {
    Step::Progress(progress(
        0.0,
        ScanStatus::Error,
        "Sequential scan",
        Some(json!({ "error": message })),
    ))
}

/// The result from the Completed scenario: 12 issues, 5/3/4.
pub fn sample_result_json() -> Value {
    json!({
        "total_issues": 12,
        "by_category": { "sensitive": 5, "forbidden": 3, "policy": 4 },
        "time_taken_sequential": 1.2341,
        "time_taken_parallel": 0.4567,
        "samples": [
            { "line": 3, "type": "sensitive", "match": "alice@example.com" },
            { "line": 9, "type": "policy", "match": "confidential" }
        ]
    })
}

pub fn fast_settings() -> Settings {
    Settings {
        poll_interval: Duration::from_millis(10),
        poll_retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        },
        request_timeout: Duration::from_secs(5),
        ..Settings::default()
    }
}

pub fn upload_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}
