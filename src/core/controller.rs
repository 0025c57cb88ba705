use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::settings::Settings;
use crate::core::client::ScanService;
use crate::core::progress::{PollSnapshot, PollTracker};
use crate::core::retry::RetryRunner;
use crate::core::sink::PresentationSink;
use crate::core::stages::StageSet;
use crate::error::{ControllerError, InputError};
use crate::models::progress::{ScanProgress, ScanStatus};
use crate::models::request::{ScanRequest, UploadFile};
use crate::models::scan_result::ScanResult;

/// How a scan session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed(ScanResult),
    /// The service reported `Error`, or sent a result it could not parse.
    Failed(String),
    TimedOut(Duration),
    TransportFailed(String),
    /// Stopped on the client side, by the user or by a newer session.
    Cancelled,
}

impl SessionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::Completed(_) => "completed",
            SessionOutcome::Failed(_) => "failed",
            SessionOutcome::TimedOut(_) => "timed out",
            SessionOutcome::TransportFailed(_) => "connection lost",
            SessionOutcome::Cancelled => "cancelled",
        }
    }
}

/// The sink plus the id of the only session allowed to write to it.
struct SessionGate<P> {
    live: u64,
    sink: P,
}

fn lock<P>(gate: &Mutex<SessionGate<P>>) -> MutexGuard<'_, SessionGate<P>> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the lifecycle of scan sessions: at most one polls at a time.
pub struct ScanController<P: PresentationSink + 'static> {
    service: Arc<dyn ScanService>,
    settings: Arc<Settings>,
    stages: Arc<StageSet>,
    gate: Arc<Mutex<SessionGate<P>>>,
    live: Option<CancellationToken>,
    next_id: u64,
}

impl<P: PresentationSink + 'static> ScanController<P> {
    pub fn new(service: Arc<dyn ScanService>, settings: Settings, sink: P) -> Self {
        Self {
            service,
            settings: Arc::new(settings),
            stages: Arc::new(StageSet::default()),
            gate: Arc::new(Mutex::new(SessionGate { live: 0, sink })),
            live: None,
            next_id: 0,
        }
    }

    pub fn with_stages(mut self, stages: StageSet) -> Self {
        self.stages = Arc::new(stages);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stages(&self) -> &StageSet {
        &self.stages
    }

    /// True while a session's poll loop has not been stopped.
    pub fn is_polling(&self) -> bool {
        self.live.as_ref().is_some_and(|token| !token.is_cancelled())
    }

    /// Stops client-side polling of the live session, if any. The service
    /// is not told; its scan keeps running.
    pub fn cancel(&mut self) {
        if let Some(token) = self.live.take() {
            token.cancel();
        }
    }

    /// Submits a scan and starts polling it.
    ///
    /// Input problems are reported before anything else happens. Otherwise
    /// the previous session is stopped and the sink reset before the upload,
    /// so nothing from an older run stays on screen.
    pub async fn start_scan(
        &mut self,
        request: &ScanRequest,
    ) -> Result<SessionHandle, ControllerError> {
        let upload = match load_upload(request).await {
            Ok(upload) => upload,
            Err(e) => {
                tracing::warn!("Rejected scan request: {}", e);
                lock(&self.gate).sink.notify(&e.to_string());
                return Err(e.into());
            }
        };

        self.cancel();
        self.next_id += 1;
        let id = self.next_id;
        {
            let mut gate = lock(&self.gate);
            gate.live = id;
            gate.sink.reset();
            gate.sink.highlight_stages(&self.stages.cleared());
            gate.sink.set_result_visible(false);
        }

        tracing::info!(
            session = id,
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            "Submitting scan"
        );
        if let Err(e) = self.service.start_scan(upload, request.options).await {
            tracing::error!(session = id, "Scan submission failed: {}", e);
            lock(&self.gate)
                .sink
                .notify(&format!("Could not start the scan: {}", e));
            return Err(e.into());
        }

        let token = CancellationToken::new();
        self.live = Some(token.clone());
        let tracker = Arc::new(PollTracker::new());

        let session = PollSession {
            id,
            service: Arc::clone(&self.service),
            settings: Arc::clone(&self.settings),
            stages: Arc::clone(&self.stages),
            gate: Arc::clone(&self.gate),
            token: token.clone(),
            tracker: Arc::clone(&tracker),
        };
        let task = tokio::spawn(session.run());

        Ok(SessionHandle {
            id,
            token,
            tracker,
            task,
        })
    }

    /// Saves the service's CSV report of its latest completed scan to `dest`.
    pub async fn download_report(&self, dest: &Path) -> Result<u64, ControllerError> {
        let bytes = match self.service.download_report().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Report download failed: {}", e);
                lock(&self.gate)
                    .sink
                    .notify(&format!("Could not download the report: {}", e));
                return Err(e.into());
            }
        };
        tokio::fs::write(dest, &bytes).await?;
        tracing::info!("Report saved to {} ({} bytes)", dest.display(), bytes.len());
        Ok(bytes.len() as u64)
    }
}

/// A controller shared between a UI loop and background network tasks.
pub type SharedController<P> = Arc<tokio::sync::Mutex<ScanController<P>>>;

/// Runs `start_scan` on its own task, so the caller can keep applying sink
/// events (the reset first) while the file uploads. Failures have already
/// been reported through the sink when this yields `None`.
pub fn spawn_start_scan<P: PresentationSink + 'static>(
    controller: SharedController<P>,
    request: ScanRequest,
) -> JoinHandle<Option<SessionHandle>> {
    tokio::spawn(async move {
        match controller.lock().await.start_scan(&request).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::debug!("Scan not started: {}", e);
                None
            }
        }
    })
}

/// Background `download_report`; yields the byte count on success.
pub fn spawn_download_report<P: PresentationSink + 'static>(
    controller: SharedController<P>,
    dest: PathBuf,
) -> JoinHandle<Option<u64>> {
    tokio::spawn(async move { controller.lock().await.download_report(&dest).await.ok() })
}

async fn load_upload(request: &ScanRequest) -> Result<UploadFile, InputError> {
    let path: &PathBuf = request.file.as_ref().ok_or(InputError::NoFileSelected)?;
    let unreadable = |source| InputError::Unreadable {
        path: path.clone(),
        source,
    };

    let meta = tokio::fs::metadata(path).await.map_err(unreadable)?;
    if !meta.is_file() {
        return Err(InputError::NotAFile(path.clone()));
    }
    let bytes = tokio::fs::read(path).await.map_err(unreadable)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());

    Ok(UploadFile { file_name, bytes })
}

/// Handle to a running poll loop.
#[derive(Debug)]
pub struct SessionHandle {
    id: u64,
    token: CancellationToken,
    tracker: Arc<PollTracker>,
    task: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Idempotent. No tick fires after this returns.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn stats(&self) -> PollSnapshot {
        self.tracker.snapshot()
    }

    pub async fn wait(self) -> Result<SessionOutcome, ControllerError> {
        Ok(self.task.await?)
    }
}

/// Resolves at `deadline`, or never when there is none.
async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

struct PollSession<P> {
    id: u64,
    service: Arc<dyn ScanService>,
    settings: Arc<Settings>,
    stages: Arc<StageSet>,
    gate: Arc<Mutex<SessionGate<P>>>,
    token: CancellationToken,
    tracker: Arc<PollTracker>,
}

impl<P: PresentationSink> PollSession<P> {
    async fn run(self) -> SessionOutcome {
        let period = self.settings.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let retry = RetryRunner::new(self.settings.poll_retry.clone());

        let limit = self.settings.max_poll_duration;
        let deadline = limit.map(|limit| Instant::now() + limit);

        let outcome = loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break SessionOutcome::Cancelled,
                _ = deadline_reached(deadline) => break self.timed_out(limit),
                _ = ticker.tick() => {}
            }

            let service = &self.service;
            let tracker = &self.tracker;
            let query = retry.run(move |attempt| {
                tracker.record_poll(attempt);
                service.scan_progress()
            });
            // The deadline also bounds a query that hangs or keeps retrying.
            let polled = tokio::select! {
                biased;
                _ = self.token.cancelled() => break SessionOutcome::Cancelled,
                _ = deadline_reached(deadline) => break self.timed_out(limit),
                polled = query => polled,
            };

            match polled {
                Ok(progress) => {
                    if let Some(outcome) = self.handle_progress(&progress) {
                        break outcome;
                    }
                }
                Err(e) => {
                    tracing::error!(session = self.id, "Polling gave up: {}", e);
                    let message = format!("Lost contact with the scan service: {}", e);
                    self.with_sink(|sink| {
                        sink.notify(&message);
                        sink.set_result_visible(false);
                    });
                    break SessionOutcome::TransportFailed(e.to_string());
                }
            }
        };

        self.token.cancel();
        let stats = self.tracker.snapshot();
        tracing::info!(
            session = self.id,
            outcome = outcome.label(),
            polls = stats.polls_issued,
            retries = stats.retries,
            "Scan session ended"
        );
        outcome
    }

    fn timed_out(&self, limit: Option<Duration>) -> SessionOutcome {
        let limit = limit.unwrap_or_default();
        tracing::warn!(session = self.id, ?limit, "Scan did not finish in time");
        let message = format!("Scan did not finish within {:?}; stopped polling", limit);
        self.with_sink(|sink| {
            sink.notify(&message);
            sink.set_result_visible(false);
        });
        SessionOutcome::TimedOut(limit)
    }

    /// Runs `f` against the sink unless a newer session owns it.
    fn with_sink(&self, f: impl FnOnce(&mut P)) -> bool {
        let mut gate = lock(&self.gate);
        if gate.live != self.id || self.token.is_cancelled() {
            return false;
        }
        f(&mut gate.sink);
        true
    }

    fn handle_progress(&self, progress: &ScanProgress) -> Option<SessionOutcome> {
        let partition = self.stages.classify(&progress.stage);
        let mut outcome = None;

        let applied = self.with_sink(|sink| {
            sink.update_progress(progress.percent(), &progress.status_label());
            sink.highlight_stages(&partition);

            outcome = match progress.status {
                ScanStatus::Completed => Some(match progress.completed_result() {
                    Ok(result) => {
                        if !result.is_consistent() {
                            tracing::warn!(
                                total = result.total_issues,
                                categories = result.by_category.sum(),
                                "total_issues does not match the category counts"
                            );
                        }
                        sink.render_result(&result);
                        sink.set_result_visible(true);
                        SessionOutcome::Completed(result)
                    }
                    Err(e) => {
                        tracing::error!(session = self.id, "Unreadable scan result: {}", e);
                        let message = format!("The service sent an unreadable result: {}", e);
                        sink.notify(&message);
                        sink.set_result_visible(false);
                        SessionOutcome::Failed(message)
                    }
                }),
                ScanStatus::Error => {
                    let message = progress.error_message();
                    tracing::warn!(session = self.id, "Service reported an error: {}", message);
                    sink.notify(&message);
                    sink.set_result_visible(false);
                    Some(SessionOutcome::Failed(message))
                }
                ScanStatus::Idle | ScanStatus::Running | ScanStatus::Unknown => None,
            };
        });

        if !applied {
            return Some(SessionOutcome::Cancelled);
        }
        outcome
    }
}
