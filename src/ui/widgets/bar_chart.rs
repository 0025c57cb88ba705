use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::ui::charts::{BarChartModel, CATEGORY_COLORS};
use crate::ui::format::format_count;

/// Vertical bars over a y axis labelled every `axis.step`.
pub struct IssueBarChart<'a> {
    model: &'a BarChartModel,
}

impl<'a> IssueBarChart<'a> {
    pub fn new(model: &'a BarChartModel) -> Self {
        Self { model }
    }
}

impl Widget for IssueBarChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 16 || area.height < 5 || self.model.axis.max == 0 {
            return;
        }

        let axis = self.model.axis;
        let label_width = format_count(axis.max).len() as u16 + 1;
        if label_width + 2 >= area.width {
            return;
        }
        // Bottom two rows: baseline and category labels.
        let plot_height = area.height - 2;
        let plot_x = area.x + label_width + 1;
        let plot_width = area.width.saturating_sub(label_width + 1);
        let baseline_y = area.y + plot_height;

        // Y axis: one label per tick, placed at the nearest row.
        let axis_style = Style::default().fg(Color::DarkGray);
        for row in 0..plot_height {
            buf.set_string(plot_x - 1, area.y + row, "\u{2502}", axis_style);
        }
        for tick in axis.ticks() {
            let from_bottom = (tick as f64 / axis.max as f64 * plot_height as f64).round() as u16;
            let y = baseline_y.saturating_sub(from_bottom).max(area.y);
            let label = format!("{:>width$}", format_count(tick), width = label_width as usize - 1);
            buf.set_string(area.x, y, &label, axis_style);
        }
        buf.set_string(
            plot_x - 1,
            baseline_y,
            format!("\u{2514}{}", "\u{2500}".repeat(plot_width as usize)),
            axis_style,
        );

        let count = self.model.bars.len().max(1) as u16;
        let slot = plot_width / count;
        if slot == 0 {
            return;
        }
        let bar_width = (slot * 2 / 3).max(1);

        for (i, bar) in self.model.bars.iter().enumerate() {
            let slot_x = plot_x + i as u16 * slot;
            let bar_x = slot_x + slot.saturating_sub(bar_width) / 2;
            let color = CATEGORY_COLORS[i % CATEGORY_COLORS.len()];

            // Eighth-block resolution on top of full cells.
            let eighths =
                (bar.value.min(axis.max) as f64 / axis.max as f64 * plot_height as f64 * 8.0).round() as u16;
            let full = eighths / 8;
            let rest = eighths % 8;
            for row in 0..full {
                let y = baseline_y - 1 - row;
                for col in 0..bar_width {
                    buf.set_string(bar_x + col, y, "\u{2588}", Style::default().fg(color));
                }
            }
            if rest > 0 && full < plot_height {
                let partial = ['\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}'];
                let y = baseline_y - 1 - full;
                for col in 0..bar_width {
                    if let Some(cell) = buf.cell_mut((bar_x + col, y)) {
                        cell.set_char(partial[rest as usize - 1]);
                        cell.set_fg(color);
                    }
                }
            }

            // Value above the bar, label under the baseline.
            let value = format_count(bar.value);
            let value_y = baseline_y.saturating_sub(full + 2).max(area.y);
            let value_x = slot_x + slot.saturating_sub(value.len() as u16) / 2;
            buf.set_string(
                value_x,
                value_y,
                &value,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            );
            let label_x = slot_x + slot.saturating_sub(bar.label.len() as u16) / 2;
            buf.set_string(label_x, baseline_y + 1, bar.label, Style::default().fg(color));
        }
    }
}
