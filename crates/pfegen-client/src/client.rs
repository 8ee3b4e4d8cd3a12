//! HTTP client for the report generation service.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use pfegen_core::config::join_url;
use pfegen_core::controller::Operation;
use pfegen_core::preview::DownloadLink;
use pfegen_core::{ReportRequest, ReportResult};

use crate::error::{ClientError, Result};
use crate::protocol::{sanitize_filename, DEFAULT_PDF_NAME, REQUEST_ID_HEADER};

/// Client for the report service API.
pub struct ReportClient {
    client: Client,
    base_url: String,
}

impl ReportClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request a new report.
    pub async fn generate(&self, request: &ReportRequest) -> Result<ReportResult> {
        self.submit(Operation::Generate, request).await
    }

    /// Redo a report from identical input.
    pub async fn regenerate(&self, request: &ReportRequest) -> Result<ReportResult> {
        self.submit(Operation::Regenerate, request).await
    }

    /// POST `request` to the route of `operation` and read the JSON answer,
    /// whatever the HTTP status.
    #[instrument(skip(self, request), fields(subject = %request.subject))]
    pub async fn submit(
        &self,
        operation: Operation,
        request: &ReportRequest,
    ) -> Result<ReportResult> {
        let url = join_url(&self.base_url, operation.route());
        let request_id = Uuid::new_v4().to_string();
        debug!(%url, %request_id, "Sending report request");

        let resp = self
            .client
            .post(&url)
            .header(REQUEST_ID_HEADER, &request_id)
            .json(request)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        let result: ReportResult =
            serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
                status: status.as_u16(),
                source,
            })?;
        info!(
            %request_id,
            status = status.as_u16(),
            success = result.success,
            "Report service answered"
        );
        Ok(result)
    }

    /// Fetch the PDF behind `link` into `dir`, returning the written path.
    /// Relative links are resolved against the base URL.
    #[instrument(skip(self), fields(url = %link.url))]
    pub async fn download(&self, link: &DownloadLink, dir: &Path) -> Result<PathBuf> {
        let url = join_url(&self.base_url, &link.url);
        let resp = self
            .client
            .get(&url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .send()
            .await?
            .error_for_status()?;
        let bytes = resp.bytes().await?;

        let filename =
            sanitize_filename(&link.filename).unwrap_or_else(|| DEFAULT_PDF_NAME.to_string());
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(filename);
        tokio::fs::write(&path, &bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "PDF downloaded");
        Ok(path)
    }
}
