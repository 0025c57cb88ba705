use std::path::PathBuf;
use std::sync::Arc;

use crate::config::settings::Settings;
use crate::core::client::ScanService;
use crate::core::controller::{ScanController, SessionOutcome};
use crate::core::sink::PresentationSink;
use crate::export::{json::export_json, markdown::export_markdown};
use crate::models::request::ScanRequest;
use crate::models::scan_result::ScanResult;

/// Files to write once a non-interactive scan completes.
#[derive(Debug, Clone, Default)]
pub struct HeadlessOutputs {
    pub json: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
    /// Where to save the service's CSV report.
    pub report: Option<PathBuf>,
}

impl HeadlessOutputs {
    pub fn is_empty(&self) -> bool {
        self.json.is_none() && self.markdown.is_none() && self.report.is_none()
    }
}

/// Scans without a terminal UI and writes the requested outputs. Any
/// outcome other than `Completed` is an error and nothing is written.
pub async fn run<P: PresentationSink + 'static>(
    service: Arc<dyn ScanService>,
    settings: Settings,
    request: &ScanRequest,
    sink: P,
    outputs: &HeadlessOutputs,
) -> anyhow::Result<ScanResult> {
    let mut controller = ScanController::new(service, settings, sink);
    let handle = controller.start_scan(request).await?;

    let result = match handle.wait().await? {
        SessionOutcome::Completed(result) => result,
        other => anyhow::bail!("scan {}", other.label()),
    };

    if let Some(ref path) = outputs.json {
        export_json(&result, path)?;
        tracing::info!("Exported to: {}", path.display());
    }
    if let Some(ref path) = outputs.markdown {
        let scanned = request.file.clone().unwrap_or_default();
        export_markdown(&result, &scanned, path)?;
        tracing::info!("Exported to: {}", path.display());
    }
    if let Some(ref path) = outputs.report {
        controller.download_report(path).await?;
    }

    Ok(result)
}
