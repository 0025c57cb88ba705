use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::Event;
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::config::settings::Settings;
use crate::core::client::HttpScanService;
use crate::core::controller::{
    spawn_download_report, spawn_start_scan, ScanController, SessionHandle,
};
use crate::core::events::{self, EventReceiver, EventSender};
use crate::models::request::ScanRequest;
use crate::ui::app_state::AppState;
use crate::ui::input::{self, InputAction};
use crate::ui::renderer;

type SharedController = crate::core::controller::SharedController<EventSender>;

/// Network work started from a key press. Dropping it aborts whatever is
/// still in flight.
#[derive(Default)]
struct PendingTasks {
    submit: Option<JoinHandle<Option<SessionHandle>>>,
    download: Option<JoinHandle<Option<u64>>>,
    download_path: PathBuf,
}

impl Drop for PendingTasks {
    fn drop(&mut self) {
        if let Some(task) = self.submit.take() {
            task.abort();
        }
        if let Some(task) = self.download.take() {
            task.abort();
        }
    }
}

pub struct App {
    state: AppState,
    settings: Settings,
    request: ScanRequest,
}

impl App {
    pub fn new(request: ScanRequest, settings: Settings) -> Self {
        let file_path = request.file.clone().unwrap_or_default();
        let state = AppState::new(
            file_path,
            settings.server_url.clone(),
            &crate::core::stages::StageSet::default(),
        );
        Self {
            state,
            settings,
            request,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let service = Arc::new(HttpScanService::new(&self.settings)?);
        let (event_tx, event_rx) = events::create_event_channel();
        let controller: SharedController = Arc::new(Mutex::new(ScanController::new(
            service,
            self.settings.clone(),
            event_tx,
        )));

        // Initialize terminal
        terminal::enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal, &controller, event_rx).await;
        // Pending uploads were aborted when the loop returned.
        controller.lock().await.cancel();

        // Restore terminal
        terminal::disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
        controller: &SharedController,
        mut event_rx: EventReceiver,
    ) -> anyhow::Result<()> {
        // Crossterm input is blocking; read it on its own thread and forward it.
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<Event>();
        let _input_thread = tokio::task::spawn_blocking(move || loop {
            match input::poll_event(Duration::from_millis(50)) {
                Ok(Some(event)) => {
                    if input_tx.send(event).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(_) => break,
            }
        });

        let mut tick_interval = tokio::time::interval(Duration::from_millis(100));
        let mut tasks = PendingTasks::default();
        let mut session: Option<SessionHandle> = None;
        self.spawn_submit(controller, &mut tasks, &mut session);

        loop {
            terminal.draw(|frame| {
                renderer::render(frame, &self.state);
            })?;

            tokio::select! {
                input_event = input_rx.recv() => {
                    match input_event {
                        Some(Event::Key(key)) => {
                            match input::handle_key_event(key, &mut self.state) {
                                InputAction::Quit => return Ok(()),
                                InputAction::Rescan => {
                                    self.spawn_submit(controller, &mut tasks, &mut session);
                                }
                                InputAction::Cancel => {
                                    self.handle_cancel(controller, &mut tasks, session.as_ref());
                                }
                                InputAction::Download => self.spawn_download(controller, &mut tasks),
                                InputAction::Export => self.handle_export(),
                                InputAction::None => {}
                            }
                        }
                        Some(_) => {}
                        None => return Ok(()),
                    }
                }
                scan_event = event_rx.recv() => {
                    match scan_event {
                        Some(event) => event.apply(&mut self.state),
                        None => return Ok(()),
                    }
                }
                _ = tick_interval.tick() => {
                    if let Some(handle) = session.as_ref() {
                        self.state.poll_stats = Some(handle.stats());
                    }
                }
            }

            self.collect_finished(&mut tasks, &mut session).await;

            if self.state.should_quit {
                return Ok(());
            }
        }
    }

    /// Starts a submission in the background so the loop keeps drawing
    /// (the reset included) while the file uploads.
    fn spawn_submit(
        &mut self,
        controller: &SharedController,
        tasks: &mut PendingTasks,
        session: &mut Option<SessionHandle>,
    ) {
        if let Some(task) = tasks.submit.take() {
            task.abort();
        }
        // start_scan stops the old loop; its outcome is no longer shown.
        *session = None;
        self.state.message = None;

        tasks.submit = Some(spawn_start_scan(
            Arc::clone(controller),
            self.request.clone(),
        ));
    }

    fn spawn_download(&mut self, controller: &SharedController, tasks: &mut PendingTasks) {
        if tasks.download.is_some() {
            self.state.message = Some("A download is already running".to_string());
            return;
        }
        let path = PathBuf::from(&self.settings.report_file_name);
        self.state.message = Some(format!("Downloading report to {}...", path.display()));

        tasks.download = Some(spawn_download_report(
            Arc::clone(controller),
            path.clone(),
        ));
        tasks.download_path = path;
    }

    fn handle_cancel(
        &mut self,
        controller: &SharedController,
        tasks: &mut PendingTasks,
        session: Option<&SessionHandle>,
    ) {
        if let Some(task) = tasks.submit.take() {
            task.abort();
            // The upload may have finished before the abort landed; its
            // session is then live but was never collected.
            if let Ok(mut controller) = controller.try_lock() {
                controller.cancel();
            }
            self.state.message = Some("Upload cancelled".to_string());
        } else if let Some(handle) = session.filter(|h| !h.is_stopped()) {
            handle.cancel();
            self.state.message = Some("Stopped polling".to_string());
        }
    }

    async fn collect_finished(
        &mut self,
        tasks: &mut PendingTasks,
        session: &mut Option<SessionHandle>,
    ) {
        if tasks.submit.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = tasks.submit.take() {
                match task.await {
                    Ok(handle) => *session = handle,
                    Err(e) => tracing::error!("Scan submission task failed: {}", e),
                }
            }
        }

        if tasks.download.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = tasks.download.take() {
                match task.await {
                    Ok(Some(bytes)) => {
                        self.state.message = Some(format!(
                            "Report saved to {} ({} bytes)",
                            tasks.download_path.display(),
                            bytes
                        ));
                    }
                    // The failure already went through the sink.
                    Ok(None) => self.state.message = None,
                    Err(e) => tracing::error!("Report download task failed: {}", e),
                }
            }
        }

        if session.as_ref().is_some_and(SessionHandle::is_finished) {
            if let Some(handle) = session.take() {
                match handle.wait().await {
                    Ok(outcome) => self.state.last_outcome = Some(outcome.label()),
                    Err(e) => tracing::error!("Scan session panicked: {}", e),
                }
            }
        }
    }

    fn handle_export(&mut self) {
        let Some(ref result) = self.state.result else {
            self.state.message = Some("Nothing to export yet".to_string());
            return;
        };
        let path = PathBuf::from(format!(
            "scanlens_report_{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        if let Err(e) = crate::export::json::export_json(result, &path) {
            tracing::error!("Export failed: {}", e);
            self.state.notice = Some(format!("Export failed: {}", e));
        } else {
            tracing::info!("Exported to: {}", path.display());
            self.state.message = Some(format!("Exported to {}", path.display()));
        }
    }
}
