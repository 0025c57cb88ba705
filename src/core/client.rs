use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::config::settings::Settings;
use crate::error::TransportError;
use crate::models::progress::ScanProgress;
use crate::models::request::{ScanOptions, UploadFile};

/// The remote file-audit service.
#[async_trait]
pub trait ScanService: Send + Sync {
    /// Submits a file. The acknowledgement carries no result.
    async fn start_scan(&self, upload: UploadFile, options: ScanOptions)
        -> Result<(), TransportError>;

    async fn scan_progress(&self) -> Result<ScanProgress, TransportError>;

    /// CSV report of the most recently completed scan on the server.
    async fn download_report(&self) -> Result<Vec<u8>, TransportError>;
}

pub struct HttpScanService {
    client: reqwest::Client,
    start_url: String,
    progress_url: String,
    report_url: String,
}

impl HttpScanService {
    pub fn new(settings: &Settings) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("scanlens/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            start_url: settings.endpoint("start_scan"),
            progress_url: settings.endpoint("scan_progress"),
            report_url: settings.endpoint("download_csv"),
        })
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(TransportError::http_status(status, body))
}

#[async_trait]
impl ScanService for HttpScanService {
    async fn start_scan(
        &self,
        upload: UploadFile,
        options: ScanOptions,
    ) -> Result<(), TransportError> {
        let part = Part::bytes(upload.bytes).file_name(upload.file_name);
        let mut form = Form::new().part("file", part);
        for field in options.form_fields() {
            form = form.text(field, "1");
        }

        let resp = self.client.post(&self.start_url).multipart(form).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn scan_progress(&self) -> Result<ScanProgress, TransportError> {
        let resp = self.client.get(&self.progress_url).send().await?;
        let resp = ensure_success(resp).await?;
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn download_report(&self) -> Result<Vec<u8>, TransportError> {
        let resp = self.client.get(&self.report_url).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}
