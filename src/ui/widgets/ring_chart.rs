use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::ui::charts::{PieChartModel, CATEGORY_COLORS};
use crate::ui::format::format_count;

/// Share of each category, drawn as a ring with a legend.
pub struct RingChart<'a> {
    model: &'a PieChartModel,
}

impl<'a> RingChart<'a> {
    pub fn new(model: &'a PieChartModel) -> Self {
        Self { model }
    }
}

struct Sector {
    start_angle: f64,
    end_angle: f64,
    color: Color,
}

impl Widget for RingChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 2 || area.height < 2 {
            return;
        }

        if self.model.total == 0 {
            let msg = "No issues found";
            let x = area.x + area.width.saturating_sub(msg.len() as u16) / 2;
            let y = area.y + area.height / 2;
            buf.set_string(x, y, msg, Style::default().fg(Color::Green));
            return;
        }

        let legend_width = 24u16;
        let show_legend = area.width > legend_width + 12 && area.height >= 4;
        let chart_width = if show_legend {
            area.width - legend_width
        } else {
            area.width
        };
        let chart_area = Rect::new(area.x, area.y, chart_width, area.height);

        // One cell is one unit wide and two half-block pixels tall.
        let cx = chart_area.width as f64 / 2.0;
        let cy = chart_area.height as f64;
        let outer_r = (cx * 0.90).min(cy * 0.85);
        let inner_r = outer_r * 0.50;

        let total = self.model.total as f64;
        let mut sectors = Vec::with_capacity(self.model.slices.len());
        let mut angle = -FRAC_PI_2;
        for (i, slice) in self.model.slices.iter().enumerate() {
            let end = angle + slice.value as f64 / total * TAU;
            if slice.value > 0 {
                sectors.push(Sector {
                    start_angle: angle,
                    end_angle: end,
                    color: CATEGORY_COLORS[i % CATEGORY_COLORS.len()],
                });
            }
            angle = end;
        }

        for row in 0..chart_area.height {
            for col in 0..chart_area.width {
                let px = col as f64;
                let top = pixel_color(px, row as f64 * 2.0, cx, cy, inner_r, outer_r, &sectors);
                let bottom =
                    pixel_color(px, row as f64 * 2.0 + 1.0, cx, cy, inner_r, outer_r, &sectors);

                if let Some(cell) = buf.cell_mut((chart_area.x + col, chart_area.y + row)) {
                    match (top, bottom) {
                        (Some(tc), Some(bc)) if tc == bc => {
                            cell.set_char('\u{2588}');
                            cell.set_fg(tc);
                        }
                        (Some(tc), Some(bc)) => {
                            cell.set_char('\u{2580}');
                            cell.set_fg(tc);
                            cell.set_bg(bc);
                        }
                        (Some(tc), None) => {
                            cell.set_char('\u{2580}');
                            cell.set_fg(tc);
                        }
                        (None, Some(bc)) => {
                            cell.set_char('\u{2584}');
                            cell.set_fg(bc);
                        }
                        (None, None) => {}
                    }
                }
            }
        }

        // Total in the hole
        let center_text = format_count(self.model.total);
        let text_x = chart_area.x + chart_area.width.saturating_sub(center_text.len() as u16) / 2;
        let text_y = chart_area.y + chart_area.height / 2;
        buf.set_string(
            text_x,
            text_y,
            &center_text,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        if show_legend {
            let legend_x = chart_area.x + chart_area.width + 1;
            let top = area.y + area.height.saturating_sub(self.model.slices.len() as u16) / 2;
            for (i, slice) in self.model.slices.iter().enumerate() {
                let y = top + i as u16;
                if y >= area.y + area.height {
                    break;
                }
                let color = CATEGORY_COLORS[i % CATEGORY_COLORS.len()];
                buf.set_string(legend_x, y, "\u{2588}\u{2588}", Style::default().fg(color));
                let text = format!(" {:<10}{:>5.1}%", slice.label, slice.percentage);
                buf.set_string(legend_x + 2, y, &text, Style::default().fg(Color::Gray));
            }
        }
    }
}

fn pixel_color(
    px: f64,
    py: f64,
    cx: f64,
    cy: f64,
    inner_r: f64,
    outer_r: f64,
    sectors: &[Sector],
) -> Option<Color> {
    let dx = px - cx;
    let dy = py - cy;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist < inner_r || dist > outer_r {
        return None;
    }

    // Sectors start at -PI/2 (top); fold atan2's range onto theirs.
    let mut angle = dy.atan2(dx);
    if angle < -FRAC_PI_2 {
        angle += TAU;
    }

    sectors
        .iter()
        .find(|s| angle >= s.start_angle && angle < s.end_angle)
        .map(|s| s.color)
}
