use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::scan_result::{ScanError, ScanResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    Idle,
    Running,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

impl ScanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Idle => "Idle",
            ScanStatus::Running => "Running",
            ScanStatus::Completed => "Completed",
            ScanStatus::Error => "Error",
            ScanStatus::Unknown => "Unknown",
        }
    }
}

/// One answer from `GET /scan_progress`. Each answer replaces the
/// previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanProgress {
    #[serde(default)]
    pub progress: f64,
    pub status: ScanStatus,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub result: Option<Value>,
}

impl ScanProgress {
    pub fn percent(&self) -> f64 {
        if self.progress.is_nan() {
            return 0.0;
        }
        self.progress.clamp(0.0, 100.0)
    }

    /// Status line shown next to the progress bar, e.g. `Running (Parallel scan)`.
    pub fn status_label(&self) -> String {
        format!("{} ({})", self.status.as_str(), self.stage)
    }

    pub fn completed_result(&self) -> Result<ScanResult, serde_json::Error> {
        let value = self.result.clone().unwrap_or(Value::Null);
        serde_json::from_value(value)
    }

    pub fn error_message(&self) -> String {
        self.result
            .clone()
            .and_then(|v| serde_json::from_value::<ScanError>(v).ok())
            .map(|e| e.error)
            .unwrap_or_else(|| "scan failed without an error message".to_string())
    }
}
