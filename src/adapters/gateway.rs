use std::path::Path;

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::domain::{AudioClip, DomainError, LanguagePair, StatusResponse};
use crate::ports::TranslationGateway;

/// HTTP adapter for the translation gateway.
///
/// One endpoint serves both operations: uploads POST to it, status checks
/// GET it with a jobId query parameter. Synthesized audio lives behind
/// presigned URLs on a separate host.
pub struct ApiGatewayClient {
    client: Client,
    endpoint: Url,
    api_key: Option<HeaderValue>,
}

impl ApiGatewayClient {
    pub fn new(endpoint: &str, api_key: Option<&str>) -> Result<Self, DomainError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| DomainError::Config(format!("Invalid endpoint URL: {}", e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(DomainError::Config(format!(
                "Endpoint must be http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        let api_key = api_key
            .map(|key| {
                HeaderValue::from_str(key)
                    .map_err(|e| DomainError::Config(format!("Invalid API key: {}", e)))
            })
            .transpose()?;

        let client = Client::builder()
            .use_rustls_tls()
            .user_agent(format!("Parlance/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| DomainError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Status URL for a job: the upload endpoint plus a jobId parameter.
    fn status_url(&self, job_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("jobId", job_id);
        url
    }

    fn apply_api_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("x-api-key", key.clone()),
            None => request,
        }
    }

    async fn parse_response(&self, response: reqwest::Response) -> Result<StatusResponse, DomainError> {
        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Transport {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response
            .json::<StatusResponse>()
            .await
            .map_err(|e| DomainError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl TranslationGateway for ApiGatewayClient {
    async fn submit_clip(
        &self,
        clip: &AudioClip,
        languages: &LanguagePair,
    ) -> Result<StatusResponse, DomainError> {
        let wav = clip.to_wav_bytes()?;
        debug!(
            bytes = wav.len(),
            duration_secs = clip.duration_secs(),
            source = languages.source.code,
            target = languages.target.code,
            "Uploading clip"
        );

        let audio_part = Part::bytes(wav)
            .file_name("recording.wav")
            .mime_str("audio/wav")
            .map_err(|e| DomainError::Request(format!("Failed to create audio part: {}", e)))?;

        // The multipart Content-Type and boundary are left to reqwest;
        // an explicit Content-Type header breaks the server's body parsing.
        let form = Form::new()
            .part("audio", audio_part)
            .text("sourceLanguage", languages.source.code)
            .text("targetLanguage", languages.target.code);

        let request = self.apply_api_key(self.client.post(self.endpoint.clone()).multipart(form));
        let response = request.send().await?;
        self.parse_response(response).await
    }

    async fn job_status(&self, job_id: &str) -> Result<StatusResponse, DomainError> {
        let request = self.apply_api_key(self.client.get(self.status_url(job_id)));
        let response = request.send().await?;
        self.parse_response(response).await
    }

    async fn fetch_audio(&self, url: &str, dest: &Path) -> Result<(), DomainError> {
        use futures_util::StreamExt;
        use tokio::io::AsyncWriteExt;

        // Presigned URL on the gateway's storage host; no API key here.
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Transport {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        // Create parent directory if needed
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write to temp file first, then rename atomically
        let temp_path = dest.with_extension("download");

        // Helper to clean up temp file on error
        let cleanup_temp = || {
            let temp = temp_path.clone();
            async move {
                let _ = tokio::fs::remove_file(&temp).await;
            }
        };

        let mut file = match tokio::fs::File::create(&temp_path).await {
            Ok(f) => f,
            Err(e) => {
                cleanup_temp().await;
                return Err(DomainError::Io(e.to_string()));
            }
        };

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    drop(file);
                    cleanup_temp().await;
                    return Err(DomainError::Request(e.to_string()));
                }
            };

            if let Err(e) = file.write_all(&chunk).await {
                drop(file);
                cleanup_temp().await;
                return Err(DomainError::Io(e.to_string()));
            }

            downloaded += chunk.len() as u64;
        }

        if let Err(e) = file.flush().await {
            drop(file);
            cleanup_temp().await;
            return Err(DomainError::Io(e.to_string()));
        }
        drop(file);

        // Atomic rename from temp to final path
        if let Err(e) = tokio::fs::rename(&temp_path, dest).await {
            cleanup_temp().await;
            return Err(DomainError::Io(e.to_string()));
        }

        info!(path = ?dest, size = downloaded, "Translation audio downloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        assert!(ApiGatewayClient::new("not a url", None).is_err());
        assert!(ApiGatewayClient::new("ftp://example.com/translate", None).is_err());
    }

    #[test]
    fn test_accepts_https_endpoint() {
        let client = ApiGatewayClient::new("https://gateway.example.com/translate", Some("k3y"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_rejects_invalid_api_key() {
        let client = ApiGatewayClient::new("https://gateway.example.com/translate", Some("bad\nkey"));
        assert!(client.is_err());
    }

    #[test]
    fn test_status_url_appends_job_id() {
        let client = ApiGatewayClient::new("https://gateway.example.com/translate", None).unwrap();
        let url = client.status_url("abc-123");
        assert_eq!(
            url.as_str(),
            "https://gateway.example.com/translate?jobId=abc-123"
        );
    }

    #[test]
    fn test_status_url_preserves_existing_query() {
        let client =
            ApiGatewayClient::new("https://gateway.example.com/translate?stage=prod", None).unwrap();
        let url = client.status_url("J1");
        assert_eq!(
            url.as_str(),
            "https://gateway.example.com/translate?stage=prod&jobId=J1"
        );
    }
}
