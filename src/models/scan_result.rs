use serde::{Deserialize, Serialize};

/// Final report of a completed scan, as sent by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub total_issues: u64,
    pub by_category: CategoryCounts,
    pub time_taken_sequential: f64,
    pub time_taken_parallel: f64,
    #[serde(default)]
    pub samples: Vec<IssueSample>,
}

impl ScanResult {
    /// `total_issues` should equal the sum of the category counts. The
    /// service computes both, so a mismatch is reported, never corrected.
    pub fn is_consistent(&self) -> bool {
        self.total_issues == self.by_category.sum()
    }

    pub fn speedup(&self) -> Option<f64> {
        if self.time_taken_parallel <= f64::EPSILON {
            return None;
        }
        Some(self.time_taken_sequential / self.time_taken_parallel)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub sensitive: u64,
    pub forbidden: u64,
    pub policy: u64,
}

impl CategoryCounts {
    pub const LABELS: [&'static str; 3] = ["Sensitive", "Forbidden", "Policy"];

    pub fn values(&self) -> [u64; 3] {
        [self.sensitive, self.forbidden, self.policy]
    }

    pub fn labelled(&self) -> [(&'static str, u64); 3] {
        let v = self.values();
        [
            (Self::LABELS[0], v[0]),
            (Self::LABELS[1], v[1]),
            (Self::LABELS[2], v[2]),
        ]
    }

    /// Saturates instead of overflowing on absurd server counts.
    pub fn sum(&self) -> u64 {
        self.values()
            .into_iter()
            .fold(0u64, |acc, v| acc.saturating_add(v))
    }

    pub fn max(&self) -> u64 {
        self.values().into_iter().max().unwrap_or(0)
    }
}

/// One matched line from the service's sample list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSample {
    pub line: u64,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(rename = "match")]
    pub matched: String,
}

/// Payload of a poll that reported `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanError {
    pub error: String,
}
