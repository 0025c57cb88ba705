use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A server-side phase the UI knows how to highlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub label: CompactString,
    /// Substring looked for in the server's stage text.
    pub matcher: CompactString,
}

impl Stage {
    /// The matcher is the first whitespace-delimited token of the label.
    pub fn from_label(label: &str) -> Self {
        let matcher = label.split_whitespace().next().unwrap_or("");
        Self {
            label: label.into(),
            matcher: matcher.into(),
        }
    }

    pub fn matches(&self, stage_text: &str) -> bool {
        stage_text.contains(self.matcher.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageState {
    pub label: CompactString,
    pub active: bool,
}

pub type StagePartition = SmallVec<[StageState; 4]>;

/// Ordered set of stages, in the order they are displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSet {
    stages: Vec<Stage>,
}

impl Default for StageSet {
    fn default() -> Self {
        Self::from_labels(["Sequential scan", "Parallel scan", "Generating report"])
    }
}

impl StageSet {
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            stages: labels.into_iter().map(Stage::from_label).collect(),
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Marks every stage active or inactive from scratch. Depends on nothing
    /// but the set and the text, so a rephrased stage never leaves a stale
    /// highlight behind.
    pub fn classify(&self, stage_text: &str) -> StagePartition {
        self.stages
            .iter()
            .map(|stage| StageState {
                label: stage.label.clone(),
                active: stage.matches(stage_text),
            })
            .collect()
    }

    /// Every stage inactive.
    pub fn cleared(&self) -> StagePartition {
        self.stages
            .iter()
            .map(|stage| StageState {
                label: stage.label.clone(),
                active: false,
            })
            .collect()
    }
}
