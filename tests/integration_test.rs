use std::path::Path;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

use scanlens::config::settings::{Settings, DEFAULT_POLL_INTERVAL, DEFAULT_SERVER_URL};
use scanlens::core::events::{create_event_channel, Event};
use scanlens::core::progress::PollTracker;
use scanlens::core::retry::{RetryPolicy, RetryRunner};
use scanlens::core::sink::{PresentationSink, STARTING_LABEL};
use scanlens::core::stages::{Stage, StageSet};
use scanlens::error::TransportError;
use scanlens::export::json::export_json;
use scanlens::export::markdown::{export_markdown, render_markdown};
use scanlens::models::progress::{ScanProgress, ScanStatus};
use scanlens::models::request::ScanOptions;
use scanlens::models::scan_result::{CategoryCounts, IssueSample, ScanResult};
use scanlens::ui::app_state::AppState;
use scanlens::ui::charts::{
    nice_max, tick_step, AxisScale, ChartInstance, ChartRegistry, MAX_TICKS,
};
use scanlens::ui::console::format_summary;
use scanlens::ui::format::{format_count, format_elapsed, format_seconds};
use scanlens::ui::input::{handle_key_event, InputAction};
use scanlens::ui::widgets::bar_chart::IssueBarChart;
use scanlens::ui::widgets::help_panel::{HelpPanel, KEY_SECTIONS};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sample_result() -> ScanResult {
    ScanResult {
        total_issues: 12,
        by_category: CategoryCounts {
            sensitive: 5,
            forbidden: 3,
            policy: 4,
        },
        time_taken_sequential: 1.2341,
        time_taken_parallel: 0.4567,
        samples: vec![
            IssueSample {
                line: 3,
                category: "sensitive".into(),
                matched: "alice@example.com".into(),
            },
            IssueSample {
                line: 9,
                category: "policy".into(),
                matched: "confidential | internal".into(),
            },
        ],
    }
}

fn active_labels(set: &StageSet, text: &str) -> Vec<String> {
    set.classify(text)
        .into_iter()
        .filter(|s| s.active)
        .map(|s| s.label.to_string())
        .collect()
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

// ---------------------------------------------------------------------------
// 1. Stage classification
// ---------------------------------------------------------------------------

#[test]
fn test_stage_matcher_is_first_token() {
    let stage = Stage::from_label("Generating report");
    assert_eq!(stage.matcher, "Generating");
    assert!(stage.matches("Generating CSV"));
    assert!(!stage.matches("generating csv"));
}

#[test]
fn test_classify_parallel_phase() {
    let set = StageSet::default();
    let partition = set.classify("Parallel scan phase 2");

    assert_eq!(partition.len(), 3);
    assert!(!partition[0].active);
    assert!(partition[1].active);
    assert!(!partition[2].active);
    assert_eq!(partition[1].label, "Parallel scan");
}

#[test]
fn test_classify_is_stateless() {
    let set = StageSet::default();
    let first = set.classify("Sequential scan");
    let _ = set.classify("Generating report");
    let _ = set.classify("Parallel scan");
    assert_eq!(set.classify("Sequential scan"), first);

    // Unrelated or empty text clears every highlight.
    assert!(active_labels(&set, "Uploading").is_empty());
    assert!(active_labels(&set, "").is_empty());
}

#[test]
fn test_classify_can_mark_several_stages() {
    let set = StageSet::default();
    assert_eq!(
        active_labels(&set, "Sequential and Parallel comparison"),
        vec!["Sequential scan".to_string(), "Parallel scan".to_string()]
    );
}

#[test]
fn test_custom_stage_set_and_cleared() {
    let set = StageSet::from_labels(["Hashing files", "Upload"]);
    assert_eq!(set.len(), 2);
    assert!(!set.is_empty());
    assert_eq!(active_labels(&set, "Hashing 10/20"), vec!["Hashing files".to_string()]);
    assert!(set.cleared().iter().all(|s| !s.active));
}

// ---------------------------------------------------------------------------
// 2. Progress payloads
// ---------------------------------------------------------------------------

#[test]
fn test_progress_deserialization() {
    let progress: ScanProgress = serde_json::from_str(
        r#"{"progress": 45, "status": "Running", "stage": "Parallel scan phase 2"}"#,
    )
    .unwrap();
    assert_eq!(progress.percent(), 45.0);
    assert_eq!(progress.status_label(), "Running (Parallel scan phase 2)");
    assert!(!progress.status.is_terminal());

    let idle: ScanProgress = serde_json::from_str(r#"{"status": "Idle"}"#).unwrap();
    assert_eq!(idle.status, ScanStatus::Idle);
    assert_eq!(idle.percent(), 0.0);
    assert_eq!(idle.stage, "");

    let odd: ScanProgress =
        serde_json::from_str(r#"{"progress": 140, "status": "Paused", "stage": ""}"#).unwrap();
    assert_eq!(odd.status, ScanStatus::Unknown);
    assert_eq!(odd.percent(), 100.0);
}

#[test]
fn test_completed_and_error_payloads() {
    let completed: ScanProgress = serde_json::from_str(
        r#"{"progress": 100, "status": "Completed", "stage": "Done", "result": {
            "total_issues": 12,
            "by_category": {"sensitive": 5, "forbidden": 3, "policy": 4},
            "time_taken_sequential": 1.2341,
            "time_taken_parallel": 0.4567
        }}"#,
    )
    .unwrap();
    let result = completed.completed_result().unwrap();
    assert_eq!(result.total_issues, 12);
    assert!(result.samples.is_empty());
    assert!(result.is_consistent());

    let failed: ScanProgress = serde_json::from_str(
        r#"{"progress": 10, "status": "Error", "stage": "", "result": {"error": "corrupt file"}}"#,
    )
    .unwrap();
    assert_eq!(failed.error_message(), "corrupt file");

    let silent: ScanProgress =
        serde_json::from_str(r#"{"status": "Error", "stage": ""}"#).unwrap();
    assert_eq!(silent.error_message(), "scan failed without an error message");
    assert!(silent.completed_result().is_err());
}

#[test]
fn test_result_helpers() {
    let mut result = sample_result();
    assert!(result.is_consistent());
    let speedup = result.speedup().unwrap();
    assert!((speedup - 2.7022).abs() < 0.001);

    result.total_issues = 13;
    assert!(!result.is_consistent());

    result.time_taken_parallel = 0.0;
    assert!(result.speedup().is_none());
}

#[test]
fn test_scan_options_form_fields() {
    assert_eq!(
        ScanOptions::all().form_fields(),
        vec!["scan_sensitive", "scan_forbidden", "scan_policy"]
    );
    assert!(ScanOptions::default().form_fields().is_empty());
}

// ---------------------------------------------------------------------------
// 3. Chart axis and registry
// ---------------------------------------------------------------------------

#[test]
fn test_axis_for_large_counts() {
    let counts = CategoryCounts {
        sensitive: 250_000,
        forbidden: 10,
        policy: 3,
    };
    let axis = AxisScale::for_counts(&counts);
    assert_eq!(axis.max, 300_000);
    assert_eq!(axis.step, 100_000);
    assert_eq!(axis.ticks(), vec![0, 100_000, 200_000, 300_000]);
}

#[test]
fn test_nice_max_table() {
    let cases = [
        (0, 100),
        (12, 100),
        (100, 100),
        (101, 200),
        (950, 1_000),
        (1_001, 2_000),
        (9_999, 10_000),
        (10_001, 20_000),
        (99_000, 100_000),
        (100_001, 200_000),
        (250_000, 300_000),
    ];
    for (value, expected) in cases {
        assert_eq!(nice_max(value), expected, "nice_max({})", value);
    }

    assert_eq!(tick_step(100), 100);
    assert_eq!(tick_step(1_000), 100);
    assert_eq!(tick_step(2_000), 1_000);
    assert_eq!(tick_step(20_000), 10_000);
    assert_eq!(tick_step(300_000), 100_000);
}

#[test]
fn test_registry_replaces_instead_of_stacking() {
    let counts = sample_result().by_category;
    let mut registry = ChartRegistry::new();
    assert!(registry.is_empty());

    registry.render_counts(&counts);
    let first_bar = registry.bar().cloned();
    let first_pie = registry.pie().cloned();
    registry.render_counts(&counts);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.bar().cloned(), first_bar);
    assert_eq!(registry.pie().cloned(), first_pie);

    let bigger = CategoryCounts {
        sensitive: 5_000,
        forbidden: 0,
        policy: 0,
    };
    registry.replace(ChartInstance::bar(&bigger));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.bar().unwrap().axis.max, 5_000);

    registry.clear();
    assert!(registry.bar().is_none());
}

#[test]
fn test_pie_percentages() {
    let counts = sample_result().by_category;
    let ChartInstance::Pie(pie) = ChartInstance::pie(&counts) else {
        panic!("expected a pie chart");
    };
    assert_eq!(pie.total, 12);
    let total: f64 = pie.slices.iter().map(|s| s.percentage).sum();
    assert!((total - 100.0).abs() < 1e-9);

    let ChartInstance::Pie(empty) = ChartInstance::pie(&CategoryCounts::default()) else {
        panic!("expected a pie chart");
    };
    assert!(empty.slices.iter().all(|s| s.percentage == 0.0));
}

#[test]
fn test_huge_counts_do_not_overflow() {
    let counts = CategoryCounts {
        sensitive: u64::MAX,
        forbidden: u64::MAX,
        policy: 1,
    };
    assert_eq!(nice_max(u64::MAX), u64::MAX);
    assert_eq!(counts.sum(), u64::MAX);

    let axis = AxisScale::for_counts(&counts);
    assert_eq!(axis.max, u64::MAX);
    assert_eq!(axis.ticks().len(), MAX_TICKS);

    let result = ScanResult {
        total_issues: u64::MAX,
        by_category: counts,
        time_taken_sequential: 1.0,
        time_taken_parallel: 0.5,
        samples: vec![],
    };
    let mut charts = ChartRegistry::new();
    charts.render_counts(&result.by_category);
    let summary = format_summary(&result, &charts);
    let longest_bar = summary
        .lines()
        .map(|line| line.chars().filter(|c| *c == '\u{2588}').count())
        .max()
        .unwrap();
    assert_eq!(longest_bar, 40);

    let mut buf = Buffer::empty(Rect::new(0, 0, 40, 12));
    IssueBarChart::new(charts.bar().unwrap()).render(buf.area, &mut buf);
    let mut wide = Buffer::empty(Rect::new(0, 0, 80, 12));
    IssueBarChart::new(charts.bar().unwrap()).render(wide.area, &mut wide);
}

// ---------------------------------------------------------------------------
// 4. Formatting
// ---------------------------------------------------------------------------

#[test]
fn test_format_helpers() {
    assert_eq!(format_seconds(1.2341), "1.2341");
    assert_eq!(format_seconds(0.4567), "0.4567");
    assert_eq!(format_seconds(2.0), "2.0000");
    assert_eq!(format_count(0), "0");
    assert_eq!(format_count(999), "999");
    assert_eq!(format_count(300_000), "300,000");
    assert_eq!(format_count(1_234_567), "1,234,567");
    assert_eq!(format_elapsed(Duration::from_secs(75)), "01:15");
}

#[test]
fn test_console_summary() {
    let result = sample_result();
    let mut charts = ChartRegistry::new();
    charts.render_counts(&result.by_category);
    let summary = format_summary(&result, &charts);

    assert!(summary.starts_with("Total issues: 12\n"));
    assert!(summary.contains("Sensitive"));
    assert!(summary.contains("(axis 0..100 step 100)"));
    assert!(summary.contains("Sequential: 1.2341 s"));
    assert!(summary.contains("Parallel:   0.4567 s"));
}

// ---------------------------------------------------------------------------
// 5. TUI state as a presentation sink
// ---------------------------------------------------------------------------

#[test]
fn test_app_state_sink() {
    let set = StageSet::default();
    let mut state = AppState::new("notes.txt".into(), DEFAULT_SERVER_URL.into(), &set);

    state.update_progress(45.0, "Running (Parallel scan phase 2)");
    state.highlight_stages(&set.classify("Parallel scan phase 2"));
    assert_eq!(state.active_stage().unwrap().label, "Parallel scan");

    let result = sample_result();
    state.render_result(&result);
    state.set_result_visible(true);
    assert_eq!(state.sample_count(), 2);
    assert_eq!(state.charts.len(), 2);

    state.move_down();
    state.move_down();
    assert_eq!(state.selected_index, 1);

    state.reset();
    assert_eq!(state.percent, 0.0);
    assert_eq!(state.status_label, STARTING_LABEL);
    assert!(state.result.is_none());
    assert!(!state.result_visible);
    assert!(state.charts.is_empty());
    assert!(state.active_stage().is_none());
    assert_eq!(state.selected_index, 0);
}

#[test]
fn test_events_replay_onto_state() {
    let set = StageSet::default();
    let mut state = AppState::new("notes.txt".into(), DEFAULT_SERVER_URL.into(), &set);
    let (mut tx, mut rx) = create_event_channel();

    tx.reset();
    tx.update_progress(100.0, "Completed (Generating report)");
    tx.render_result(&sample_result());
    tx.set_result_visible(true);
    tx.notify("done");
    drop(tx);

    let mut count = 0;
    while let Ok(event) = rx.try_recv() {
        if count == 0 {
            assert!(matches!(event, Event::Reset));
        }
        event.apply(&mut state);
        count += 1;
    }
    assert_eq!(count, 5);
    assert!(state.result_visible);
    assert_eq!(state.result.as_ref().unwrap().total_issues, 12);
    assert_eq!(state.notice.as_deref(), Some("done"));
}

#[test]
fn test_key_handling() {
    let set = StageSet::default();
    let mut state = AppState::new("notes.txt".into(), DEFAULT_SERVER_URL.into(), &set);

    assert_eq!(handle_key_event(key(KeyCode::Char('r')), &mut state), InputAction::Rescan);
    assert_eq!(handle_key_event(key(KeyCode::Char('c')), &mut state), InputAction::Cancel);
    assert_eq!(handle_key_event(key(KeyCode::Char('d')), &mut state), InputAction::Download);
    assert_eq!(handle_key_event(key(KeyCode::Char('x')), &mut state), InputAction::Export);

    // A notice swallows keys until dismissed.
    state.notify("corrupt file");
    assert_eq!(handle_key_event(key(KeyCode::Char('r')), &mut state), InputAction::None);
    assert!(state.notice.is_some());
    handle_key_event(key(KeyCode::Enter), &mut state);
    assert!(state.notice.is_none());

    handle_key_event(key(KeyCode::Char('?')), &mut state);
    assert!(state.show_help);
    assert_eq!(handle_key_event(key(KeyCode::Char('q')), &mut state), InputAction::None);
    assert!(!state.show_help);

    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(handle_key_event(ctrl_c, &mut state), InputAction::Quit);
    assert!(state.should_quit);
}

#[test]
fn test_help_lists_notice_keys() {
    let notices = KEY_SECTIONS
        .iter()
        .find(|(title, _)| *title == "Notices")
        .expect("notice section");
    assert!(notices.1[0].0.contains("Enter"));
    assert!(notices.1[0].0.contains("Esc"));

    let mut buf = Buffer::empty(Rect::new(0, 0, 60, 24));
    HelpPanel.render(buf.area, &mut buf);
    let text: String = buf.content().iter().map(|cell| cell.symbol()).collect();
    assert!(text.contains("Dismiss the notice"));
    assert!(text.contains("Enter / Esc / Space"));

    // Every key the help names for a notice really dismisses it.
    let set = StageSet::default();
    let mut state = AppState::new("notes.txt".into(), DEFAULT_SERVER_URL.into(), &set);
    for code in [KeyCode::Enter, KeyCode::Esc, KeyCode::Char(' ')] {
        state.notify("corrupt file");
        handle_key_event(key(code), &mut state);
        assert!(state.notice.is_none(), "{:?} should dismiss", code);
    }
}

// ---------------------------------------------------------------------------
// 6. Export
// ---------------------------------------------------------------------------

#[test]
fn test_export_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("result.json");
    let result = sample_result();

    export_json(&result, &out).unwrap();
    let parsed: ScanResult = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(parsed, result);
}

#[test]
fn test_export_markdown() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.md");
    let result = sample_result();

    export_markdown(&result, Path::new("notes.txt"), &out).unwrap();
    let md = std::fs::read_to_string(&out).unwrap();
    assert!(md.starts_with("# Scan Report"));
    assert!(md.contains("- **File:** notes.txt"));
    assert!(md.contains("| Sensitive | 5 | 41.7% |"));
    assert!(md.contains("- **Sequential scan:** 1.2341 s"));
    // Pipes in matched text would break the table.
    assert!(md.contains("`confidential \\| internal`"));

    let mut no_samples = result.clone();
    no_samples.samples.clear();
    let md = render_markdown(&no_samples, Path::new("notes.txt")).unwrap();
    assert!(!md.contains("Sample Matches"));
}

// ---------------------------------------------------------------------------
// 7. Settings, retry and poll bookkeeping
// ---------------------------------------------------------------------------

#[test]
fn test_settings_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.server_url, DEFAULT_SERVER_URL);
    assert_eq!(settings.poll_interval, DEFAULT_POLL_INTERVAL);
    assert_eq!(settings.poll_interval, Duration::from_millis(300));
    assert!(settings.max_poll_duration.is_none());
    assert_eq!(settings.report_file_name, "scan_results.csv");
    assert_eq!(settings.endpoint("start_scan"), "http://127.0.0.1:10000/start_scan");

    let trailing = Settings {
        server_url: "http://scanner:8080/".into(),
        ..Settings::default()
    };
    assert_eq!(trailing.endpoint("/scan_progress"), "http://scanner:8080/scan_progress");
}

#[test]
fn test_retry_backoff() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 4);
    assert_eq!(policy.backoff(0), Duration::from_millis(200));
    assert_eq!(policy.backoff(1), Duration::from_millis(400));
    assert_eq!(policy.backoff(2), Duration::from_millis(800));
    assert_eq!(policy.backoff(3), Duration::from_millis(1600));
    assert_eq!(policy.backoff(10), Duration::from_millis(1600));
    assert_eq!(RetryPolicy::none().max_attempts, 1);
}

#[tokio::test]
async fn test_retry_runner_stops_on_client_error() {
    let runner = RetryRunner::new(RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    });

    let mut attempts = Vec::new();
    let outcome: Result<(), TransportError> = runner
        .run(|attempt| {
            attempts.push(attempt);
            async move {
                let status = if attempt < 2 { 503 } else { 404 };
                Err(TransportError::HttpStatus {
                    status,
                    body: String::new(),
                })
            }
        })
        .await;

    assert!(matches!(outcome, Err(TransportError::HttpStatus { status: 404, .. })));
    assert_eq!(attempts, vec![0, 1, 2]);
}

#[test]
fn test_poll_tracker_counts_retries() {
    let tracker = PollTracker::new();
    tracker.record_poll(0);
    tracker.record_poll(1);
    tracker.record_poll(0);
    let snap = tracker.snapshot();
    assert_eq!(snap.polls_issued, 3);
    assert_eq!(snap.retries, 1);
}
