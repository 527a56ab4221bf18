//! LlamaParse-compatible document parsing client.
//!
//! Upload the PDF, poll the job until it settles, then fetch the text
//! result. Polling is bounded by `max_polls`.

use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use ringbook_shared::config::ParserConfig;
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::AttachmentError;
use super::service::PdfTextExtractor;

#[derive(Debug, Deserialize)]
struct JobResponse {
    id: String,
    #[serde(default)]
    status: JobStatus,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum JobStatus {
    #[default]
    Pending,
    Success,
    Error,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct TextResult {
    text: String,
}

/// HTTP client for the document parsing API.
#[derive(Debug, Clone)]
pub struct LlamaParseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl LlamaParseClient {
    /// Creates a client from configuration.
    #[must_use]
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls,
        }
    }

    async fn upload(&self, filename: &str, data: Bytes) -> Result<String, AttachmentError> {
        let part = Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let res = self
            .http
            .post(format!("{}/api/parsing/upload", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let job: JobResponse = Self::checked(res).await?.json().await?;
        Ok(job.id)
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, AttachmentError> {
        let res = self
            .http
            .get(format!("{}/api/parsing/job/{job_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let job: JobResponse = Self::checked(res).await?.json().await?;
        Ok(job.status)
    }

    async fn text(&self, job_id: &str) -> Result<String, AttachmentError> {
        let res = self
            .http
            .get(format!("{}/api/parsing/job/{job_id}/result/text", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let result: TextResult = Self::checked(res).await?.json().await?;
        Ok(result.text)
    }

    async fn checked(res: reqwest::Response) -> Result<reqwest::Response, AttachmentError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        Err(AttachmentError::Parser(format!("{status}: {body}")))
    }
}

impl PdfTextExtractor for LlamaParseClient {
    async fn extract_text(&self, filename: &str, data: Bytes) -> Result<String, AttachmentError> {
        let job_id = self.upload(filename, data).await?;
        debug!(job_id = %job_id, filename = %filename, "Submitted PDF for parsing");

        for _ in 0..self.max_polls {
            match self.status(&job_id).await? {
                JobStatus::Success => return self.text(&job_id).await,
                JobStatus::Error | JobStatus::Canceled => {
                    warn!(job_id = %job_id, "PDF parsing job failed");
                    return Err(AttachmentError::Parser(format!("job {job_id} failed")));
                }
                JobStatus::Pending | JobStatus::Unknown => {
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        Err(AttachmentError::ParseTimeout(self.max_polls))
    }
}
