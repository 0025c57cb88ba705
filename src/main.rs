use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use scanlens::config::settings::{Settings, DEFAULT_SERVER_URL};
use scanlens::core::client::HttpScanService;
use scanlens::headless::{self, HeadlessOutputs};
use scanlens::models::request::{ScanOptions, ScanRequest};
use scanlens::ui::console::ConsoleSink;

#[derive(Parser, Debug)]
#[command(name = "scanlens", version, about = "Scan a file with a remote audit service")]
struct Cli {
    /// File to upload and scan
    file: Option<PathBuf>,

    /// Base URL of the scan service
    #[arg(long, env = "SCANLENS_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Look for sensitive data (emails, keys, ...)
    #[arg(long)]
    sensitive: bool,

    /// Look for forbidden content
    #[arg(long)]
    forbidden: bool,

    /// Look for policy violations
    #[arg(long)]
    policy: bool,

    /// Milliseconds between progress queries
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Give up polling after this many seconds (default: never)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print progress as plain text instead of the TUI
    #[arg(long)]
    headless: bool,

    /// Export the result as JSON to file (implies --headless)
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Export the result as Markdown to file (implies --headless)
    #[arg(long)]
    export_markdown: Option<PathBuf>,

    /// Download the service's CSV report to file (implies --headless)
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (logs to stderr)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings {
        server_url: cli.server.clone(),
        ..Settings::default()
    };
    if let Some(ms) = cli.poll_interval_ms {
        settings.poll_interval = Duration::from_millis(ms.max(1));
    }
    if let Some(secs) = cli.timeout_secs {
        settings.max_poll_duration = Some(Duration::from_secs(secs));
    }

    let request = ScanRequest {
        file: cli.file.clone(),
        options: ScanOptions {
            sensitive: cli.sensitive,
            forbidden: cli.forbidden,
            policy: cli.policy,
        },
    };

    let outputs = HeadlessOutputs {
        json: cli.export_json.clone(),
        markdown: cli.export_markdown.clone(),
        report: cli.report.clone(),
    };
    if !cli.headless && outputs.is_empty() {
        let mut app = scanlens::app::App::new(request, settings);
        return app.run().await;
    }

    // Non-interactive mode: scan, then write whatever was asked for
    let service = Arc::new(HttpScanService::new(&settings)?);
    headless::run(service, settings, &request, ConsoleSink::default(), &outputs).await?;

    for path in [&outputs.json, &outputs.markdown].into_iter().flatten() {
        println!("Exported to: {}", path.display());
    }
    if let Some(ref path) = outputs.report {
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}
