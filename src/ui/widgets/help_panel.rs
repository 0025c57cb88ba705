use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Key bindings by section, in the order `handle_key_event` checks them.
pub const KEY_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Scan",
        &[
            ("r", "Rescan the file"),
            ("c", "Cancel the upload or stop polling"),
            ("d", "Download CSV report"),
            ("x", "Export result as JSON"),
        ],
    ),
    ("Samples", &[("j / Down", "Move down"), ("k / Up", "Move up")]),
    ("Notices", &[("Enter / Esc / Space", "Dismiss the notice")]),
    (
        "General",
        &[("?", "Toggle this help"), ("q / Ctrl+C", "Quit")],
    ),
];

pub struct HelpPanel;

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let section_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let key_width = KEY_SECTIONS
            .iter()
            .flat_map(|(_, keys)| keys.iter().map(|(key, _)| key.len()))
            .max()
            .unwrap_or(0);

        let mut lines = Vec::new();
        for (title, keys) in KEY_SECTIONS {
            lines.push(Line::from(Span::styled(format!("  {}", title), section_style)));
            for (key, desc) in keys.iter() {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("    {:<width$}  ", key, width = key_width),
                        Style::default().fg(Color::Green),
                    ),
                    Span::raw(*desc),
                ]));
            }
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "  Press ? or Esc to close",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" scanlens keys ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .style(Style::default().bg(Color::Black))
            .render(area, buf);
    }
}
