use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::progress::PollSnapshot;
use crate::ui::format::{format_count, format_elapsed};

pub struct StatusBar<'a> {
    pub server_url: &'a str,
    pub stats: Option<PollSnapshot>,
    pub outcome: Option<&'a str>,
    pub message: Option<&'a str>,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 10 {
            return;
        }

        if let Some(msg) = self.message {
            let line = Line::from(Span::styled(
                format!(" {}", msg),
                Style::default().fg(Color::Green),
            ));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let mut spans = vec![Span::styled(
            format!(" {}", self.server_url),
            Style::default().fg(Color::White),
        )];

        if let Some(stats) = self.stats {
            spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(
                format!(
                    "Polls: {}  Elapsed: {}",
                    format_count(stats.polls_issued as u64),
                    format_elapsed(stats.elapsed)
                ),
                Style::default().fg(Color::White),
            ));
            if stats.retries > 0 {
                spans.push(Span::styled(
                    format!("  Retries: {}", stats.retries),
                    Style::default().fg(Color::Red),
                ));
            }
        }

        if let Some(outcome) = self.outcome {
            let left_len: usize = spans.iter().map(|s| s.content.len()).sum();
            let outcome_str = format!("Session {} ", outcome);
            let padding = (area.width as usize).saturating_sub(left_len + outcome_str.len());
            spans.push(Span::raw(format!("{:pad$}", "", pad = padding)));
            spans.push(Span::styled(outcome_str, Style::default().fg(Color::DarkGray)));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
