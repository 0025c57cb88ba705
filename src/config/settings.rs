use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::retry::RetryPolicy;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:10000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);
pub const DEFAULT_REPORT_FILE: &str = "scan_results.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server_url: String,
    pub poll_interval: Duration,
    /// `None` polls until the service reports a terminal status.
    pub max_poll_duration: Option<Duration>,
    pub poll_retry: RetryPolicy,
    pub request_timeout: Duration,
    pub report_file_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_duration: None,
            poll_retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            report_file_name: DEFAULT_REPORT_FILE.to_string(),
        }
    }
}

impl Settings {
    /// Joins an endpoint onto the server URL, tolerating a trailing slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
