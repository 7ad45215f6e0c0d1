use async_trait::async_trait;
use std::path::Path;

use crate::domain::TranslationResult;

/// Port for the user-facing display surface.
///
/// One presenter instance serves one translation attempt at a time; the
/// session drives it through the record / upload / poll phases.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Clear any prior output and show the idle state.
    fn reset(&self);

    /// Show a transient status line.
    fn status(&self, message: &str);

    /// Show a terminal error line.
    fn error(&self, message: &str);

    /// Render the recording countdown with the current input level.
    fn countdown(&self, elapsed_ms: u64, limit_ms: u64, level: f32);

    /// Render processing progress (0.0 - 100.0).
    fn progress(&self, percent: f32);

    /// Render the finished translation and retire the progress display.
    /// The progress indicator completes to 100% and stays visible for a
    /// short beat before the result takes over.
    async fn present(&self, result: &TranslationResult, audio_path: Option<&Path>);
}
