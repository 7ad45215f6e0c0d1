use async_trait::async_trait;
use std::path::Path;

use crate::domain::{AudioClip, DomainError, LanguagePair, StatusResponse};

/// Port for the remote translation gateway.
/// All network traffic must go through this interface.
#[async_trait]
pub trait TranslationGateway: Send + Sync {
    /// Upload a clip for translation. Called exactly once per recording;
    /// the caller classifies the response as a queued job or an
    /// immediate result.
    async fn submit_clip(
        &self,
        clip: &AudioClip,
        languages: &LanguagePair,
    ) -> Result<StatusResponse, DomainError>;

    /// Fetch the current status of a queued job.
    async fn job_status(&self, job_id: &str) -> Result<StatusResponse, DomainError>;

    /// Download synthesized translation audio to a local file.
    async fn fetch_audio(&self, url: &str, dest: &Path) -> Result<(), DomainError>;
}
