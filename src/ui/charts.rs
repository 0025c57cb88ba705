use std::collections::HashMap;

use ratatui::style::Color;

use crate::models::scan_result::CategoryCounts;

/// Bar colours per category, in `CategoryCounts::LABELS` order.
pub const CATEGORY_COLORS: [Color; 3] = [Color::Yellow, Color::Red, Color::Blue];

/// Rounds the largest count up to a readable axis maximum. Counts come
/// from the server unchecked, so the top bucket saturates at `u64::MAX`.
pub fn nice_max(value: u64) -> u64 {
    match value {
        0..=100 => 100,
        101..=1_000 => value.div_ceil(100) * 100,
        1_001..=10_000 => value.div_ceil(1_000) * 1_000,
        10_001..=100_000 => value.div_ceil(10_000) * 10_000,
        _ => value.div_ceil(100_000).saturating_mul(100_000),
    }
}

/// Upper bound on generated ticks; a terminal never has more rows.
pub const MAX_TICKS: usize = 1_000;

/// Tick spacing for an axis that ends at `max`.
pub fn tick_step(max: u64) -> u64 {
    match max {
        0..=1_000 => 100,
        1_001..=10_000 => 1_000,
        10_001..=100_000 => 10_000,
        _ => 100_000,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisScale {
    pub max: u64,
    pub step: u64,
}

impl AxisScale {
    pub fn for_counts(counts: &CategoryCounts) -> Self {
        let max = nice_max(counts.max());
        Self {
            max,
            step: tick_step(max),
        }
    }

    /// Tick values from 0 to `max` inclusive, at most `MAX_TICKS` of them.
    pub fn ticks(&self) -> Vec<u64> {
        (0..=self.max)
            .step_by(self.step.max(1) as usize)
            .take(MAX_TICKS)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub label: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarChartModel {
    pub bars: Vec<Bar>,
    pub axis: AxisScale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: &'static str,
    pub value: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChartModel {
    pub slices: Vec<PieSlice>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartInstance {
    Bar(BarChartModel),
    Pie(PieChartModel),
}

impl ChartInstance {
    pub fn bar(counts: &CategoryCounts) -> Self {
        let bars = counts
            .labelled()
            .into_iter()
            .map(|(label, value)| Bar { label, value })
            .collect();
        ChartInstance::Bar(BarChartModel {
            bars,
            axis: AxisScale::for_counts(counts),
        })
    }

    pub fn pie(counts: &CategoryCounts) -> Self {
        let total = counts.sum();
        let slices = counts
            .labelled()
            .into_iter()
            .map(|(label, value)| PieSlice {
                label,
                value,
                percentage: if total > 0 {
                    value as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        ChartInstance::Pie(PieChartModel { slices, total })
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            ChartInstance::Bar(_) => ChartKind::Bar,
            ChartInstance::Pie(_) => ChartKind::Pie,
        }
    }
}

/// The live chart per kind. Replacing a chart drops the old instance
/// before the new one goes in, so repeated renders never pile up.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    charts: HashMap<ChartKind, ChartInstance>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, chart: ChartInstance) {
        let kind = chart.kind();
        if let Some(old) = self.charts.remove(&kind) {
            tracing::trace!(?kind, "Dropping previous chart");
            drop(old);
        }
        self.charts.insert(kind, chart);
    }

    pub fn render_counts(&mut self, counts: &CategoryCounts) {
        self.replace(ChartInstance::bar(counts));
        self.replace(ChartInstance::pie(counts));
    }

    pub fn bar(&self) -> Option<&BarChartModel> {
        match self.charts.get(&ChartKind::Bar) {
            Some(ChartInstance::Bar(model)) => Some(model),
            _ => None,
        }
    }

    pub fn pie(&self) -> Option<&PieChartModel> {
        match self.charts.get(&ChartKind::Pie) {
            Some(ChartInstance::Pie(model)) => Some(model),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn clear(&mut self) {
        self.charts.clear();
    }
}
