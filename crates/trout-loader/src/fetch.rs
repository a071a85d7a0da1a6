//! Report download

use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};

/// First bytes of every PDF file.
pub const PDF_SIGNATURE: &[u8; 4] = b"%PDF";

/// Upper bound on the body buffer reserved from `Content-Length`.
const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

/// Fetches the raw report document
#[async_trait]
pub trait ReportFetcher: Send + Sync {
    /// Download the document at `url`, returning its bytes.
    ///
    /// Implementations must reject content that is not a PDF.
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>>;
}

/// Returns true when `bytes` starts with `%PDF`.
pub fn has_pdf_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_SIGNATURE)
}

/// Downloads the report over HTTP(S)
pub struct HttpReportFetcher {
    client: reqwest::Client,
}

impl HttpReportFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .deflate(true)
            .build()?;

        Ok(Self { client })
    }

    pub fn from_config(config: &LoaderConfig) -> Result<Self> {
        Self::new(
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    async fn download(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>> {
        if cancel.is_cancelled() {
            return Err(LoaderError::Cancelled);
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LoaderError::Cancelled),
            response = self.client.get(url).send() => response?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Content-Length is untrusted; the buffer still grows past the cap
        let reserve = response.content_length().unwrap_or(0).min(MAX_PREALLOCATION);
        let mut body = Vec::with_capacity(reserve as usize);
        let mut stream = response.bytes_stream();

        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(LoaderError::Cancelled),
                chunk = stream.next() => chunk,
            };

            match chunk {
                Some(chunk) => body.extend_from_slice(&chunk?),
                None => break,
            }
        }

        if !has_pdf_signature(&body) {
            return Err(LoaderError::NotPdf);
        }

        debug!(url = %url, bytes = body.len(), "PDF downloaded");

        Ok(body)
    }
}

#[async_trait]
impl ReportFetcher for HttpReportFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>> {
        self.download(url, cancel).await.inspect_err(|e| {
            if !matches!(e, LoaderError::Cancelled) {
                error!(url = %url, error = %e, "Failed to download PDF");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_signature() {
        assert!(has_pdf_signature(b"%PDF-1.7\n"));
        assert!(has_pdf_signature(b"%PDF"));
        assert!(!has_pdf_signature(b"%PD"));
        assert!(!has_pdf_signature(b"<html>%PDF"));
        assert!(!has_pdf_signature(b""));
    }
}
