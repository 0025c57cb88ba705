use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::models::scan_result::IssueSample;

pub struct IssueListState {
    pub selected: usize,
    pub offset: usize,
}

/// Sample findings returned with the result, one per row.
pub struct IssueList<'a> {
    items: &'a [IssueSample],
    total_issues: u64,
    block: Option<Block<'a>>,
}

impl<'a> IssueList<'a> {
    pub fn new(items: &'a [IssueSample], total_issues: u64) -> Self {
        Self {
            items,
            total_issues,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl StatefulWidget for IssueList<'_> {
    type State = IssueListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.height < 3 || inner.width < 20 {
            return;
        }

        let header = Line::from(Span::styled(
            format!("  {:>7}  {:<10} Match", "Line", "Category"),
            Style::default().fg(Color::DarkGray),
        ));
        buf.set_line(inner.x, inner.y, &header, inner.width);

        // Header and footer take one row each.
        let list_height = (inner.height as usize).saturating_sub(2);
        if list_height == 0 {
            return;
        }

        if self.items.is_empty() {
            buf.set_string(
                inner.x + 2,
                inner.y + 1,
                "No sample matches",
                Style::default().fg(Color::DarkGray),
            );
        }

        if state.selected < state.offset {
            state.offset = state.selected;
        }
        if state.selected >= state.offset + list_height {
            state.offset = state.selected - list_height + 1;
        }

        let end = (state.offset + list_height).min(self.items.len());
        let start = state.offset.min(end);
        for (i, item) in self.items[start..end].iter().enumerate() {
            let row_y = inner.y + 1 + i as u16;
            let is_selected = start + i == state.selected;

            let prefix = format!("  {:>7}  {:<10} ", item.line, item.category);
            let match_max = (inner.width as usize).saturating_sub(prefix.width());
            let matched = truncate(&item.matched, match_max);

            let style = if is_selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(category_color(&item.category))
            };

            let line = Line::from(Span::styled(format!("{}{}", prefix, matched), style));
            buf.set_line(inner.x, row_y, &line, inner.width);
        }

        let footer_y = inner.y + inner.height - 1;
        let footer = format!(
            " Showing {} of {} issues",
            self.items.len(),
            self.total_issues
        );
        buf.set_line(
            inner.x,
            footer_y,
            &Line::from(Span::styled(footer, Style::default().fg(Color::DarkGray))),
            inner.width,
        );
    }
}

fn category_color(category: &str) -> Color {
    match category {
        "sensitive" => Color::Yellow,
        "forbidden" => Color::Red,
        "policy" => Color::Blue,
        _ => Color::White,
    }
}

fn truncate(text: &str, max_width: usize) -> String {
    // Matches can span a whole line; keep them on one row.
    let text = text.trim_end_matches(['\r', '\n']);
    if text.width() <= max_width {
        return text.to_string();
    }
    let target = max_width.saturating_sub(3);
    let mut w = 0;
    let boundary = text
        .char_indices()
        .find(|&(_, c)| {
            w += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            w > target
        })
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    format!("{}...", &text[..boundary])
}
