use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::models::scan_result::ScanResult;
use crate::ui::app_state::AppState;
use crate::ui::charts::CATEGORY_COLORS;
use crate::ui::format::{format_count, format_seconds};
use crate::ui::widgets::bar_chart::IssueBarChart;
use crate::ui::widgets::help_panel::HelpPanel;
use crate::ui::widgets::issue_list::{IssueList, IssueListState};
use crate::ui::widgets::progress_bar::ScanProgressBar;
use crate::ui::widgets::ring_chart::RingChart;
use crate::ui::widgets::stage_track::StageTrack;
use crate::ui::widgets::status_bar::StatusBar;

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(4), // progress
            Constraint::Length(3), // stages
            Constraint::Min(8),    // results
            Constraint::Length(1), // status bar
            Constraint::Length(1), // key hints
        ])
        .split(area);

    render_title(frame, chunks[0], state);

    let progress_block = Block::default()
        .title(" Progress ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let progress_inner = progress_block.inner(chunks[1]);
    frame.render_widget(progress_block, chunks[1]);
    frame.render_widget(
        ScanProgressBar {
            percent: state.percent,
            status_label: &state.status_label,
        },
        progress_inner,
    );

    frame.render_widget(StageTrack::new(&state.stages), chunks[2]);

    match state.result.as_ref() {
        Some(result) if state.result_visible => render_results(frame, chunks[3], state, result),
        _ => render_waiting(frame, chunks[3], state),
    }

    let status = StatusBar {
        server_url: &state.server_url,
        stats: state.poll_stats,
        outcome: state.last_outcome,
        message: state.message.as_deref(),
    };
    frame.render_widget(status, chunks[4]);

    let hints = Paragraph::new(Line::from(vec![
        Span::styled(" r", Style::default().fg(Color::Yellow)),
        Span::styled(": Rescan  ", Style::default().fg(Color::DarkGray)),
        Span::styled("c", Style::default().fg(Color::Yellow)),
        Span::styled(": Stop  ", Style::default().fg(Color::DarkGray)),
        Span::styled("d", Style::default().fg(Color::Yellow)),
        Span::styled(": CSV report  ", Style::default().fg(Color::DarkGray)),
        Span::styled("x", Style::default().fg(Color::Yellow)),
        Span::styled(": Export JSON  ", Style::default().fg(Color::DarkGray)),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::styled(": Help  ", Style::default().fg(Color::DarkGray)),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::styled(": Quit", Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(hints, chunks[5]);

    if state.show_help {
        let help_area = centered_rect(60, 70, area);
        frame.render_widget(HelpPanel, help_area);
    }

    if let Some(notice) = &state.notice {
        render_notice(frame, notice);
    }
}

fn render_title(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " scanlens ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            state.file_path.display().to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(title, area);
}

fn render_waiting(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = match (state.last_outcome, state.active_stage()) {
        (Some(outcome), _) => format!("Scan {}. Press r to scan again.", outcome),
        (None, Some(stage)) => format!("{}...", stage.label),
        (None, None) => "Waiting for the scan service...".to_string(),
    };
    let waiting = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )))
    .block(
        Block::default()
            .title(" Results ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(waiting, area);
}

fn render_results(frame: &mut Frame, area: Rect, state: &AppState, result: &ScanResult) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Percentage(40)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(32),
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(rows[0]);

    render_summary(frame, columns[0], result);

    let bar_block = Block::default()
        .title(" Issues by category ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let bar_inner = bar_block.inner(columns[1]);
    frame.render_widget(bar_block, columns[1]);
    if let Some(model) = state.charts.bar() {
        frame.render_widget(IssueBarChart::new(model), bar_inner);
    }

    let ring_block = Block::default()
        .title(" Share ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let ring_inner = ring_block.inner(columns[2]);
    frame.render_widget(ring_block, columns[2]);
    if let Some(model) = state.charts.pie() {
        frame.render_widget(RingChart::new(model), ring_inner);
    }

    let list = IssueList::new(&result.samples, result.total_issues).block(
        Block::default()
            .title(" Sample matches ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    let mut list_state = IssueListState {
        selected: state.selected_index,
        offset: state.list_offset,
    };
    frame.render_stateful_widget(list, rows[1], &mut list_state);
}

fn render_summary(frame: &mut Frame, area: Rect, result: &ScanResult) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Total issues  ", label),
            Span::styled(format_count(result.total_issues), value),
        ]),
        Line::from(""),
    ];
    for (i, (name, count)) in result.by_category.labelled().into_iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<14}", name), Style::default().fg(CATEGORY_COLORS[i])),
            Span::styled(format_count(count), value),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" Sequential    ", label),
        Span::styled(format!("{} s", format_seconds(result.time_taken_sequential)), value),
    ]));
    lines.push(Line::from(vec![
        Span::styled(" Parallel      ", label),
        Span::styled(format!("{} s", format_seconds(result.time_taken_parallel)), value),
    ]));
    if let Some(speedup) = result.speedup() {
        lines.push(Line::from(vec![
            Span::styled(" Speedup       ", label),
            Span::styled(format!("{:.2}x", speedup), value),
        ]));
    }

    let summary = Paragraph::new(lines).block(
        Block::default()
            .title(" Summary ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(summary, area);
}

fn render_notice(frame: &mut Frame, notice: &str) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", notice),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Press Enter or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Notice ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().bg(Color::Black))
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

/// Helper to create a centered rectangle within a given area
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
