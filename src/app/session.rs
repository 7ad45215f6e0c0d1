//! One recording-to-translation pass.
//!
//! A [`TranslationSession`] owns a single run through the pipeline:
//! capture a clip, upload it, ride the job to completion, and hand the
//! result to the presenter. `run` consumes the session, so a finished
//! (or failed) session cannot be restarted; the caller builds a fresh
//! one per pass.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{interval, interval_at, sleep, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::config::PollingConfig;
use crate::domain::job::{ErrorAction, PollVerdict, TickAction};
use crate::domain::{
    AudioClip, DomainError, JobTracker, LanguagePair, RecorderEvent, TranslationResult,
    UploadOutcome,
};
use crate::ports::{AudioPlayer, Presenter, Recorder, TranslationGateway};

/// Refresh rate of the elapsed-time line while recording.
const COUNTDOWN_TICK_MS: u64 = 100;

/// Cadence and step of the synthetic upload progress bar. The bar
/// creeps while the server works and parks at the cap until a real
/// outcome arrives.
const PROGRESS_TICK_MS: u64 = 500;
const PROGRESS_STEP: f32 = 0.5;
const PROGRESS_CAP: f32 = 95.0;

const STILL_PROCESSING: &str = "Still processing your audio...";

/// Per-run knobs the controller resolves from config and CLI flags.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub languages: LanguagePair,
    pub polling: PollingConfig,
    pub save_dir: PathBuf,
    pub volume: f32,
}

pub struct TranslationSession {
    recorder: Arc<dyn Recorder>,
    gateway: Arc<dyn TranslationGateway>,
    presenter: Arc<dyn Presenter>,
    player: Option<Arc<dyn AudioPlayer>>,
    options: SessionOptions,
}

impl TranslationSession {
    pub fn new(
        recorder: Arc<dyn Recorder>,
        gateway: Arc<dyn TranslationGateway>,
        presenter: Arc<dyn Presenter>,
        player: Option<Arc<dyn AudioPlayer>>,
        options: SessionOptions,
    ) -> Self {
        Self {
            recorder,
            gateway,
            presenter,
            player,
            options,
        }
    }

    /// Drives the full pass. `stop` ends the recording phase early;
    /// without it the recording stops at the configured duration cap.
    ///
    /// Errors are shown to the user through the presenter and also
    /// returned, so callers can exit nonzero.
    pub async fn run(self, stop: oneshot::Receiver<()>) -> Result<(), DomainError> {
        match self.run_inner(stop).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.presenter.error(&error_line(&err));
                Err(err)
            }
        }
    }

    async fn run_inner(&self, stop: oneshot::Receiver<()>) -> Result<(), DomainError> {
        self.presenter.reset();

        let clip = self.record(stop).await?;
        info!(
            samples = clip.len(),
            duration_secs = clip.duration_secs(),
            "Recording finished"
        );

        let animator = ProgressAnimator::start(Arc::clone(&self.presenter));
        self.presenter.status("Uploading audio...");
        let outcome = self.process(&clip).await;
        drop(animator);
        let result = outcome?;

        let audio_path = match result.audio_url() {
            Some(url) => self.download_audio(url).await,
            None => None,
        };

        self.presenter.present(&result, audio_path.as_deref()).await;

        if let (Some(player), Some(path)) = (&self.player, &audio_path) {
            if let Err(err) = player.play_file(path, self.options.volume).await {
                warn!(error = %err, "Playback failed");
            }
        }

        Ok(())
    }

    /// Captures until the duration cap or the stop signal, whichever
    /// comes first, repainting the elapsed-time line as it goes.
    async fn record(&self, mut stop: oneshot::Receiver<()>) -> Result<AudioClip, DomainError> {
        self.recorder.start_recording().await?;
        self.presenter.status("Recording...");

        let limit_ms = self.recorder.config().max_duration_ms;
        let mut events = self.recorder.subscribe();
        let started = Instant::now();
        let deadline = sleep(Duration::from_millis(limit_ms));
        tokio::pin!(deadline);
        let mut ticker = interval(Duration::from_millis(COUNTDOWN_TICK_MS));
        // Cleared once the stop sender goes away so the closed channel
        // is not polled again.
        let mut stop_armed = true;

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    debug!("Recording reached the duration cap");
                    break;
                }
                res = &mut stop, if stop_armed => {
                    match res {
                        Ok(()) => {
                            debug!("Recording stopped by the user");
                            break;
                        }
                        Err(_) => stop_armed = false,
                    }
                }
                _ = ticker.tick() => {
                    drain_events(&mut events);
                    let elapsed = started.elapsed().as_millis() as u64;
                    self.presenter
                        .countdown(elapsed.min(limit_ms), limit_ms, self.recorder.current_level());
                }
            }
        }

        let clip = self
            .recorder
            .stop_recording()
            .await?
            .ok_or_else(|| DomainError::Microphone("Recording produced no audio".to_string()))?;

        self.presenter.status("Processing audio...");
        Ok(clip)
    }

    async fn process(&self, clip: &AudioClip) -> Result<TranslationResult, DomainError> {
        let response = self
            .gateway
            .submit_clip(clip, &self.options.languages)
            .await?;

        match response.classify() {
            UploadOutcome::Immediate(result) => {
                debug!("Upload returned a finished result");
                Ok(result)
            }
            UploadOutcome::Accepted { job_id } => {
                info!(job_id = %job_id, "Job queued for processing");
                self.presenter.status("Processing your audio...");
                self.poll_job(job_id).await
            }
        }
    }

    /// Checks the job on a fixed cadence until it finishes or the
    /// tracker gives up. The first check happens one interval after
    /// the upload is acknowledged.
    async fn poll_job(&self, job_id: String) -> Result<TranslationResult, DomainError> {
        let mut tracker = JobTracker::new(job_id, &self.options.polling);
        tracker.start();

        let period = Duration::from_millis(self.options.polling.interval_ms);
        let mut ticker = interval_at(Instant::now() + period, period);

        loop {
            ticker.tick().await;

            match tracker.on_tick() {
                TickAction::GiveUp => {
                    warn!(checks = tracker.checks(), "Gave up waiting for the job");
                    return Err(DomainError::PollTimeout);
                }
                TickAction::Check => {}
            }

            match self.gateway.job_status(tracker.job_id()).await {
                Ok(response) => match tracker.on_response(response) {
                    PollVerdict::Continue { message } => {
                        let line = message.unwrap_or_else(|| STILL_PROCESSING.to_string());
                        self.presenter.status(&line);
                    }
                    PollVerdict::Complete(result) => {
                        info!(checks = tracker.checks(), "Job completed");
                        return Ok(result);
                    }
                    PollVerdict::Fail { error } => {
                        return Err(DomainError::ServerFailure(error));
                    }
                },
                Err(err) => {
                    warn!(error = %err, "Status check failed");
                    match tracker.on_transport_error() {
                        ErrorAction::Tolerate => {}
                        ErrorAction::Abort { errors } => {
                            return Err(DomainError::PollFailed {
                                errors,
                                last_error: err.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    /// Best effort: a failed download degrades to a text-only result.
    async fn download_audio(&self, url: &str) -> Option<PathBuf> {
        let dest = self.options.save_dir.join(audio_file_name(url));
        match self.gateway.fetch_audio(url, &dest).await {
            Ok(()) => {
                info!(path = %dest.display(), "Saved translated audio");
                Some(dest)
            }
            Err(err) => {
                warn!(error = %err, url = %url, "Audio download failed");
                None
            }
        }
    }
}

/// Synthetic progress that creeps toward [`PROGRESS_CAP`] while the
/// upload and polling phases run. Aborted on drop, so every exit path
/// out of the processing phase stops the repainting.
struct ProgressAnimator {
    handle: tokio::task::JoinHandle<()>,
}

impl ProgressAnimator {
    fn start(presenter: Arc<dyn Presenter>) -> Self {
        let handle = tokio::spawn(async move {
            let period = Duration::from_millis(PROGRESS_TICK_MS);
            let mut ticker = interval_at(Instant::now() + period, period);
            let mut percent = 0.0f32;
            loop {
                ticker.tick().await;
                percent += PROGRESS_STEP;
                if percent >= PROGRESS_CAP {
                    presenter.progress(PROGRESS_CAP);
                    break;
                }
                presenter.progress(percent);
            }
        });
        Self { handle }
    }
}

impl Drop for ProgressAnimator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn drain_events(events: &mut tokio::sync::broadcast::Receiver<RecorderEvent>) {
    use tokio::sync::broadcast::error::TryRecvError;

    loop {
        match events.try_recv() {
            Ok(RecorderEvent::Error { message }) => {
                warn!(message = %message, "Capture stream error")
            }
            Ok(event) => debug!(?event, "Recorder event"),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

/// The line shown to the user for a failed run.
fn error_line(err: &DomainError) -> String {
    match err {
        DomainError::Microphone(_) => {
            "Error: Could not access microphone. Please check permissions.".to_string()
        }
        DomainError::PollTimeout => "Processing timed out. Please try again.".to_string(),
        DomainError::PollFailed { last_error, .. } => {
            format!("Error checking status: {last_error}")
        }
        DomainError::ServerFailure(message) => format!("Error: {message}"),
        other => format!("Error: {other}"),
    }
}

/// Picks a local filename for a downloaded clip, preferring the name
/// the server used in the URL path.
fn audio_file_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty() && Path::new(name).extension().is_some())
        .unwrap_or_else(|| {
            let secs = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or(0);
            format!("translation-{secs}.mp3")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tempfile::TempDir;
    use tokio::sync::broadcast;

    use crate::domain::{
        AtomicRecorderState, AudioDevice, JobStatus, RecorderConfig, RecorderState, StatusResponse,
    };

    struct MockRecorder {
        config: RecorderConfig,
        state: AtomicRecorderState,
        events: broadcast::Sender<RecorderEvent>,
        starts: AtomicUsize,
        stops: AtomicUsize,
        fail_start: bool,
    }

    impl MockRecorder {
        fn new(max_duration_ms: u64) -> Self {
            let (events, _) = broadcast::channel(16);
            Self {
                config: RecorderConfig {
                    max_duration_ms,
                    sample_rate: 16_000,
                },
                state: AtomicRecorderState::new(RecorderState::Idle),
                events,
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
                fail_start: false,
            }
        }

        fn failing(max_duration_ms: u64) -> Self {
            let mut recorder = Self::new(max_duration_ms);
            recorder.fail_start = true;
            recorder
        }
    }

    #[async_trait]
    impl Recorder for MockRecorder {
        async fn start_recording(&self) -> Result<(), DomainError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if self.fail_start {
                return Err(DomainError::Microphone("permission denied".to_string()));
            }
            self.state.store(RecorderState::Recording);
            Ok(())
        }

        async fn stop_recording(&self) -> Result<Option<AudioClip>, DomainError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            if self.state.load() != RecorderState::Recording {
                return Ok(None);
            }
            self.state.store(RecorderState::Idle);
            Ok(Some(AudioClip::new(vec![0i16; 160], 16_000)))
        }

        fn state(&self) -> RecorderState {
            self.state.load()
        }

        fn config(&self) -> RecorderConfig {
            self.config.clone()
        }

        fn list_input_devices(&self) -> Result<Vec<AudioDevice>, DomainError> {
            Ok(Vec::new())
        }

        fn select_input_device(&self, _device_id: Option<&str>) -> Result<(), DomainError> {
            Ok(())
        }

        fn subscribe(&self) -> broadcast::Receiver<RecorderEvent> {
            self.events.subscribe()
        }

        fn current_level(&self) -> f32 {
            0.25
        }
    }

    #[derive(Default)]
    struct MockGateway {
        upload_response: Mutex<Option<Result<StatusResponse, DomainError>>>,
        poll_responses: Mutex<VecDeque<Result<StatusResponse, DomainError>>>,
        uploads: AtomicUsize,
        polls: AtomicUsize,
    }

    impl MockGateway {
        fn with_upload(response: Result<StatusResponse, DomainError>) -> Self {
            let gateway = Self::default();
            *gateway.upload_response.lock() = Some(response);
            gateway
        }

        fn queue_poll(&self, response: Result<StatusResponse, DomainError>) {
            self.poll_responses.lock().push_back(response);
        }
    }

    #[async_trait]
    impl TranslationGateway for MockGateway {
        async fn submit_clip(
            &self,
            _clip: &AudioClip,
            _languages: &LanguagePair,
        ) -> Result<StatusResponse, DomainError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            self.upload_response
                .lock()
                .take()
                .unwrap_or_else(|| Ok(accepted("overrun")))
        }

        async fn job_status(&self, _job_id: &str) -> Result<StatusResponse, DomainError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            self.poll_responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(processing(None)))
        }

        async fn fetch_audio(&self, _url: &str, dest: &Path) -> Result<(), DomainError> {
            std::fs::write(dest, b"audio")?;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockPresenter {
        lines: Mutex<Vec<String>>,
    }

    impl MockPresenter {
        fn lines(&self) -> Vec<String> {
            self.lines.lock().clone()
        }
    }

    #[async_trait]
    impl Presenter for MockPresenter {
        fn reset(&self) {}

        fn status(&self, message: &str) {
            self.lines.lock().push(format!("status: {message}"));
        }

        fn error(&self, message: &str) {
            self.lines.lock().push(format!("error: {message}"));
        }

        fn countdown(&self, _elapsed_ms: u64, _limit_ms: u64, _level: f32) {}

        fn progress(&self, _percent: f32) {}

        async fn present(&self, result: &TranslationResult, audio: Option<&Path>) {
            self.lines.lock().push(format!(
                "present: {} / {} / {}",
                result.original_text_display(),
                result.translated_text_display(),
                audio.is_some()
            ));
        }
    }

    #[derive(Default)]
    struct MockPlayer {
        plays: AtomicUsize,
    }

    #[async_trait]
    impl AudioPlayer for MockPlayer {
        async fn play_file(&self, _path: &Path, _volume: f32) -> Result<(), DomainError> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn accepted(job_id: &str) -> StatusResponse {
        StatusResponse {
            job_id: Some(job_id.to_string()),
            status: Some(JobStatus::Processing),
            message: Some("Processing started".to_string()),
            ..StatusResponse::default()
        }
    }

    fn processing(message: Option<&str>) -> StatusResponse {
        StatusResponse {
            status: Some(JobStatus::Processing),
            message: message.map(str::to_string),
            ..StatusResponse::default()
        }
    }

    fn completed(audio_url: Option<&str>) -> StatusResponse {
        StatusResponse {
            status: Some(JobStatus::Completed),
            original_text: Some("hola".to_string()),
            translated_text: Some("hello".to_string()),
            audio_url: audio_url.map(str::to_string),
            ..StatusResponse::default()
        }
    }

    fn failed(error: &str) -> StatusResponse {
        StatusResponse {
            status: Some(JobStatus::Failed),
            error: Some(error.to_string()),
            ..StatusResponse::default()
        }
    }

    fn options(save_dir: &Path) -> SessionOptions {
        SessionOptions {
            languages: LanguagePair::default(),
            polling: PollingConfig {
                interval_ms: 5,
                max_checks: 10,
                max_transport_errors: 3,
            },
            save_dir: save_dir.to_path_buf(),
            volume: 1.0,
        }
    }

    fn session(
        recorder: Arc<MockRecorder>,
        gateway: Arc<MockGateway>,
        presenter: Arc<MockPresenter>,
        player: Option<Arc<MockPlayer>>,
        save_dir: &Path,
    ) -> TranslationSession {
        TranslationSession::new(
            recorder,
            gateway,
            presenter,
            player.map(|p| p as Arc<dyn AudioPlayer>),
            options(save_dir),
        )
    }

    #[tokio::test]
    async fn immediate_result_skips_polling() {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(MockRecorder::new(30));
        let gateway = Arc::new(MockGateway::with_upload(Ok(completed(None))));
        let presenter = Arc::new(MockPresenter::default());
        let (_tx, rx) = oneshot::channel();

        let run = session(
            Arc::clone(&recorder),
            Arc::clone(&gateway),
            Arc::clone(&presenter),
            None,
            dir.path(),
        )
        .run(rx)
        .await;

        assert!(run.is_ok());
        assert_eq!(recorder.stops.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.uploads.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.polls.load(Ordering::SeqCst), 0);
        assert!(presenter
            .lines()
            .contains(&"present: hola / hello / false".to_string()));
    }

    #[tokio::test]
    async fn polls_until_job_completes() {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(MockRecorder::new(30));
        let gateway = Arc::new(MockGateway::with_upload(Ok(accepted("job-1"))));
        gateway.queue_poll(Ok(processing(None)));
        gateway.queue_poll(Ok(processing(Some("Transcribing"))));
        gateway.queue_poll(Ok(completed(None)));
        let presenter = Arc::new(MockPresenter::default());
        let (_tx, rx) = oneshot::channel();

        let run = session(
            Arc::clone(&recorder),
            Arc::clone(&gateway),
            Arc::clone(&presenter),
            None,
            dir.path(),
        )
        .run(rx)
        .await;

        assert!(run.is_ok());
        assert_eq!(gateway.polls.load(Ordering::SeqCst), 3);
        let lines = presenter.lines();
        assert!(lines.contains(&"status: Processing your audio...".to_string()));
        assert!(lines.contains(&format!("status: {STILL_PROCESSING}")));
        assert!(lines.contains(&"status: Transcribing".to_string()));
        assert!(lines.contains(&"present: hola / hello / false".to_string()));
    }

    #[tokio::test]
    async fn gives_up_after_check_budget() {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(MockRecorder::new(30));
        let gateway = Arc::new(MockGateway::with_upload(Ok(accepted("job-1"))));
        for _ in 0..12 {
            gateway.queue_poll(Ok(processing(None)));
        }
        let presenter = Arc::new(MockPresenter::default());
        let (_tx, rx) = oneshot::channel();

        let run = session(
            recorder,
            Arc::clone(&gateway),
            Arc::clone(&presenter),
            None,
            dir.path(),
        )
        .run(rx)
        .await;

        assert!(matches!(run, Err(DomainError::PollTimeout)));
        assert_eq!(gateway.polls.load(Ordering::SeqCst), 10);
        assert!(presenter
            .lines()
            .contains(&"error: Processing timed out. Please try again.".to_string()));
    }

    #[tokio::test]
    async fn server_failure_is_reported_with_its_message() {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(MockRecorder::new(30));
        let gateway = Arc::new(MockGateway::with_upload(Ok(accepted("job-1"))));
        gateway.queue_poll(Ok(failed("bad audio")));
        let presenter = Arc::new(MockPresenter::default());
        let (_tx, rx) = oneshot::channel();

        let run = session(recorder, gateway, Arc::clone(&presenter), None, dir.path())
            .run(rx)
            .await;

        assert!(matches!(run, Err(DomainError::ServerFailure(_))));
        assert!(presenter
            .lines()
            .contains(&"error: Error: bad audio".to_string()));
    }

    #[tokio::test]
    async fn aborts_after_four_consecutive_transport_errors() {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(MockRecorder::new(30));
        let gateway = Arc::new(MockGateway::with_upload(Ok(accepted("job-1"))));
        for _ in 0..4 {
            gateway.queue_poll(Err(DomainError::Request("boom".to_string())));
        }
        let presenter = Arc::new(MockPresenter::default());
        let (_tx, rx) = oneshot::channel();

        let run = session(
            recorder,
            Arc::clone(&gateway),
            Arc::clone(&presenter),
            None,
            dir.path(),
        )
        .run(rx)
        .await;

        assert!(matches!(run, Err(DomainError::PollFailed { errors: 4, .. })));
        assert_eq!(gateway.polls.load(Ordering::SeqCst), 4);
        assert!(presenter
            .lines()
            .contains(&"error: Error checking status: Request failed: boom".to_string()));
    }

    #[tokio::test]
    async fn tolerates_transport_errors_below_the_cap() {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(MockRecorder::new(30));
        let gateway = Arc::new(MockGateway::with_upload(Ok(accepted("job-1"))));
        gateway.queue_poll(Err(DomainError::Request("blip".to_string())));
        gateway.queue_poll(Err(DomainError::Request("blip".to_string())));
        gateway.queue_poll(Ok(completed(None)));
        let presenter = Arc::new(MockPresenter::default());
        let (_tx, rx) = oneshot::channel();

        let run = session(
            recorder,
            Arc::clone(&gateway),
            Arc::clone(&presenter),
            None,
            dir.path(),
        )
        .run(rx)
        .await;

        assert!(run.is_ok());
        assert_eq!(gateway.polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn manual_stop_ends_recording_early() {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(MockRecorder::new(60_000));
        let gateway = Arc::new(MockGateway::with_upload(Ok(completed(None))));
        let presenter = Arc::new(MockPresenter::default());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async {
            sleep(Duration::from_millis(20)).await;
            let _ = tx.send(());
        });

        let run = session(
            Arc::clone(&recorder),
            gateway,
            presenter,
            None,
            dir.path(),
        )
        .run(rx)
        .await;

        assert!(run.is_ok());
        assert_eq!(recorder.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropped_stop_channel_still_hits_the_cap() {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(MockRecorder::new(30));
        let gateway = Arc::new(MockGateway::with_upload(Ok(completed(None))));
        let presenter = Arc::new(MockPresenter::default());
        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);

        let run = session(Arc::clone(&recorder), gateway, presenter, None, dir.path())
            .run(rx)
            .await;

        assert!(run.is_ok());
        assert_eq!(recorder.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn upload_rejection_shows_server_status() {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(MockRecorder::new(30));
        let gateway = Arc::new(MockGateway::with_upload(Err(DomainError::Transport {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        })));
        let presenter = Arc::new(MockPresenter::default());
        let (_tx, rx) = oneshot::channel();

        let run = session(recorder, gateway, Arc::clone(&presenter), None, dir.path())
            .run(rx)
            .await;

        assert!(matches!(run, Err(DomainError::Transport { .. })));
        assert!(presenter.lines().contains(
            &"error: Error: Server responded with 500: Internal Server Error".to_string()
        ));
    }

    #[tokio::test]
    async fn microphone_failure_shows_permission_hint() {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(MockRecorder::failing(30));
        let gateway = Arc::new(MockGateway::with_upload(Ok(completed(None))));
        let presenter = Arc::new(MockPresenter::default());
        let (_tx, rx) = oneshot::channel();

        let run = session(
            recorder,
            Arc::clone(&gateway),
            Arc::clone(&presenter),
            None,
            dir.path(),
        )
        .run(rx)
        .await;

        assert!(matches!(run, Err(DomainError::Microphone(_))));
        assert_eq!(gateway.uploads.load(Ordering::SeqCst), 0);
        assert!(presenter.lines().contains(
            &"error: Error: Could not access microphone. Please check permissions.".to_string()
        ));
    }

    #[tokio::test]
    async fn downloads_and_plays_translated_audio() {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(MockRecorder::new(30));
        let gateway = Arc::new(MockGateway::with_upload(Ok(completed(Some(
            "https://cdn.example.com/out/job-1.mp3",
        )))));
        let presenter = Arc::new(MockPresenter::default());
        let player = Arc::new(MockPlayer::default());
        let (_tx, rx) = oneshot::channel();

        let run = session(
            recorder,
            gateway,
            Arc::clone(&presenter),
            Some(Arc::clone(&player)),
            dir.path(),
        )
        .run(rx)
        .await;

        assert!(run.is_ok());
        assert!(dir.path().join("job-1.mp3").exists());
        assert_eq!(player.plays.load(Ordering::SeqCst), 1);
        assert!(presenter
            .lines()
            .contains(&"present: hola / hello / true".to_string()));
    }

    #[test]
    fn audio_file_name_prefers_the_url_segment() {
        assert_eq!(
            audio_file_name("https://cdn.example.com/out/job-1.mp3"),
            "job-1.mp3"
        );
        assert_eq!(
            audio_file_name("https://cdn.example.com/a/b/voice.ogg?sig=abc"),
            "voice.ogg"
        );
    }

    #[test]
    fn audio_file_name_falls_back_to_a_timestamp() {
        let name = audio_file_name("https://cdn.example.com/");
        assert!(name.starts_with("translation-"));
        assert!(name.ends_with(".mp3"));

        let name = audio_file_name("not a url");
        assert!(name.starts_with("translation-"));
    }
}
