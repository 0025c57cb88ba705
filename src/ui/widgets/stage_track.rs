use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::core::stages::StageState;

/// The known scan stages in order, active ones highlighted.
pub struct StageTrack<'a> {
    stages: &'a [StageState],
}

impl<'a> StageTrack<'a> {
    pub fn new(stages: &'a [StageState]) -> Self {
        Self { stages }
    }
}

impl Widget for StageTrack<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(" Stages ", Style::default().fg(Color::DarkGray))];

        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
            }
            let (marker, style) = if stage.active {
                (
                    "\u{25CF} ",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("\u{25CB} ", Style::default().fg(Color::Gray))
            };
            spans.push(Span::styled(format!("{}{}", marker, stage.label), style));
        }

        let track = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        track.render(area, buf);
    }
}
