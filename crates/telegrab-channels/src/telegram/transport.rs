//! HTTP transport: URL-encoded and multipart Bot API calls, and streamed downloads.

use super::types::TgResponse;
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use telegrab_core::{config::Config, error::TelegrabError};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Thin wrapper over `reqwest::Client` bound to one bot token.
pub(crate) struct Transport {
    client: reqwest::Client,
    /// `{api_url}/bot{token}`
    base_url: String,
    /// `{api_url}/file/bot{token}`
    file_base_url: String,
}

impl Transport {
    pub(crate) fn new(config: &Config) -> Result<Self, TelegrabError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| TelegrabError::Config(format!("failed to build http client: {e}")))?;
        let api_url = config.api_url.trim_end_matches('/');
        Ok(Self {
            client,
            base_url: format!("{api_url}/bot{}", config.token),
            file_base_url: format!("{api_url}/file/bot{}", config.token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// URL serving a file previously resolved through `getFile`.
    pub(crate) fn file_url(&self, file_path: &str) -> String {
        format!("{}/{file_path}", self.file_base_url)
    }

    /// Call a method with an `application/x-www-form-urlencoded` body.
    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        method: &str,
        fields: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> Result<T, TelegrabError> {
        let mut request = self.client.post(self.method_url(method)).form(fields);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let resp = request
            .send()
            .await
            .map_err(|e| TelegrabError::Transport(format!("telegram {method} failed: {e}")))?;
        decode(method, resp).await
    }

    /// Call a method with a `multipart/form-data` body.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        method: &str,
        form: Form,
    ) -> Result<T, TelegrabError> {
        let resp = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TelegrabError::Transport(format!("telegram {method} failed: {e}")))?;
        decode(method, resp).await
    }

    /// Stream `url` into `dest`, returning the number of bytes written.
    ///
    /// `dest` is created or truncated before the request is made. On failure
    /// whatever was written so far stays on disk.
    pub(crate) async fn download_to(&self, url: &str, dest: &Path) -> Result<u64, TelegrabError> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(dest)
            .await?;

        let mut resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TelegrabError::Transport(format!("file download failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TelegrabError::Protocol(format!(
                "file download returned {status}"
            )));
        }

        let mut written = 0u64;
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| TelegrabError::Transport(format!("file download interrupted: {e}")))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("wrote {written} bytes to {}", dest.display());
        Ok(written)
    }
}

/// Unwrap the `{ok, result, description}` envelope.
async fn decode<T: DeserializeOwned>(
    method: &str,
    resp: reqwest::Response,
) -> Result<T, TelegrabError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| TelegrabError::Transport(format!("telegram {method} body read failed: {e}")))?;

    let envelope: TgResponse<T> = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(e.into()),
        Err(_) => {
            return Err(TelegrabError::Protocol(format!(
                "telegram {method} failed ({status}): {body}"
            )))
        }
    };

    if !envelope.ok {
        let code = envelope
            .error_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| status.as_u16().to_string());
        return Err(TelegrabError::Protocol(format!(
            "telegram {method} rejected ({code}): {}",
            envelope.description.unwrap_or_default()
        )));
    }

    envelope
        .result
        .ok_or_else(|| TelegrabError::Protocol(format!("telegram {method} returned no result")))
}
