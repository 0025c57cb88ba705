use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

pub struct ScanProgressBar<'a> {
    pub percent: f64,
    pub status_label: &'a str,
}

impl Widget for ScanProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 || area.width < 20 {
            return;
        }

        // Line 1: status text
        let label = truncate_label(self.status_label, area.width as usize - 2);
        let status_line = Line::from(vec![
            Span::styled(" ", Style::default()),
            Span::styled(label, Style::default().fg(Color::Yellow)),
        ]);
        buf.set_line(area.x, area.y, &status_line, area.width);

        // Line 2: bar + percentage
        let pct_str = format!(" {:>3.0}%", self.percent);
        let bar_width = (area.width as usize).saturating_sub(pct_str.len() + 2);
        let filled = ((self.percent / 100.0) * bar_width as f64).round() as usize;
        let filled = filled.min(bar_width);
        let bar_line = Line::from(vec![
            Span::styled(" ", Style::default()),
            Span::styled("\u{2588}".repeat(filled), Style::default().fg(Color::Cyan)),
            Span::styled(
                "\u{2591}".repeat(bar_width - filled),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(pct_str, Style::default().fg(Color::White)),
        ]);
        buf.set_line(area.x, area.y + 1, &bar_line, area.width);
    }
}

fn truncate_label(label: &str, max_width: usize) -> String {
    if label.width() <= max_width {
        return label.to_string();
    }
    if max_width < 4 {
        return "...".to_string();
    }
    let target = max_width - 3;
    let mut w = 0;
    let end = label
        .char_indices()
        .find(|&(_, c)| {
            w += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            w > target
        })
        .map(|(i, _)| i)
        .unwrap_or(label.len());
    format!("{}...", &label[..end])
}
