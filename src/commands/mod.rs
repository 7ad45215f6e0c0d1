use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::debug;

use crate::adapters::{ApiGatewayClient, CpalRecorder, RodioPlayer, TerminalPresenter};
use crate::app::{AppController, SessionOptions, TranslationSession};
use crate::domain::config::{ApiConfig, RecordingConfig};
use crate::domain::translation::SUPPORTED_LANGUAGES;
use crate::domain::{DomainError, LanguagePair, RecorderConfig};
use crate::ports::{AudioPlayer, Presenter, Recorder};

/// Flag overrides for a single `translate` run. Anything left `None`
/// falls back to the persisted configuration.
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    pub source: Option<String>,
    pub target: Option<String>,
    pub device: Option<String>,
    pub max_secs: Option<u64>,
    pub endpoint: Option<String>,
    pub save_dir: Option<PathBuf>,
    pub no_play: bool,
}

// ==================== Translate Command ====================

/// Record a clip, upload it, and present the translation.
pub async fn translate(
    controller: &AppController,
    options: TranslateOptions,
) -> Result<(), DomainError> {
    let config = controller.config();

    let endpoint = resolve_endpoint(&config.api, options.endpoint, &controller.config_path())?;
    let languages = resolve_languages(&config.api, options.source, options.target)?;
    let recorder_config = resolve_recorder_config(&config.recording, options.max_secs);

    let recorder = Arc::new(CpalRecorder::with_config(recorder_config)?);
    if let Some(device) = options.device.as_deref().or(config.recording.device.as_deref()) {
        recorder.select_input_device(Some(device))?;
    }

    let gateway = Arc::new(ApiGatewayClient::new(&endpoint, config.api.api_key.as_deref())?);
    let presenter = Arc::new(TerminalPresenter::new(config.ui.dark_mode));

    let player: Option<Arc<dyn AudioPlayer>> = if options.no_play || !config.output.play_audio {
        None
    } else {
        Some(Arc::new(RodioPlayer::new()))
    };

    let save_dir = options
        .save_dir
        .or(config.output.save_dir)
        .unwrap_or_else(|| controller.downloads_dir());
    std::fs::create_dir_all(&save_dir)?;

    let session = TranslationSession::new(
        recorder,
        gateway,
        Arc::clone(&presenter) as Arc<dyn Presenter>,
        player,
        SessionOptions {
            languages,
            polling: config.polling,
            save_dir,
            volume: config.output.volume,
        },
    );

    presenter.status("Press Enter to stop recording early.");

    // Detached OS thread so a never-pressed Enter cannot hold the
    // runtime open after the session finishes.
    let (stop_tx, stop_rx) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_ok() {
            let _ = stop_tx.send(());
        }
    });

    session.run(stop_rx).await
}

fn resolve_endpoint(
    api: &ApiConfig,
    flag: Option<String>,
    config_path: &str,
) -> Result<String, DomainError> {
    flag.or_else(|| {
        if api.endpoint.is_empty() {
            None
        } else {
            Some(api.endpoint.clone())
        }
    })
    .ok_or_else(|| {
        DomainError::Config(format!(
            "no API endpoint set; add api.endpoint to {config_path} or pass --endpoint"
        ))
    })
}

fn resolve_languages(
    api: &ApiConfig,
    source: Option<String>,
    target: Option<String>,
) -> Result<LanguagePair, DomainError> {
    let source = source.unwrap_or_else(|| api.source_language.clone());
    let target = target.unwrap_or_else(|| api.target_language.clone());
    LanguagePair::new(&source, &target)
}

fn resolve_recorder_config(
    recording: &RecordingConfig,
    max_secs: Option<u64>,
) -> RecorderConfig {
    RecorderConfig {
        max_duration_ms: max_secs
            .map(|secs| secs * 1_000)
            .unwrap_or(recording.max_duration_ms),
        sample_rate: recording.sample_rate,
    }
}

// ==================== Device Commands ====================

/// List available audio input devices.
pub fn devices() -> Result<(), DomainError> {
    let recorder = CpalRecorder::new()?;
    let devices = recorder.list_input_devices()?;

    if devices.is_empty() {
        println!("No input devices found.");
        return Ok(());
    }

    println!("Input devices:");
    for device in devices {
        let marker = if device.is_default { " (default)" } else { "" };
        println!("  {:<24}{}{}", device.id, device.name, marker);
    }
    Ok(())
}

// ==================== Language Commands ====================

/// List the language codes the gateway accepts.
pub fn languages(controller: &AppController) {
    let config = controller.config();
    println!(
        "Supported languages ({} -> {}):",
        config.api.source_language, config.api.target_language
    );
    for language in SUPPORTED_LANGUAGES {
        println!("  {:<6}{}", language.code, language.name);
    }
}

// ==================== Appearance Commands ====================

/// Flip the persisted terminal palette.
pub fn theme(controller: &AppController) -> Result<(), DomainError> {
    let dark = controller.toggle_dark_mode()?;
    println!(
        "Dark mode {}.",
        if dark { "enabled" } else { "disabled" }
    );
    Ok(())
}

// ==================== Paths Command ====================

/// Show where configuration, logs, and downloads live.
pub fn paths(controller: &AppController) {
    println!("Config:    {}", controller.config_path());
    println!("Data:      {}", controller.data_dir());
    println!("Logs:      {}", controller.logs_dir());
    println!("Downloads: {}", controller.downloads_dir().display());
    debug!("Printed application paths");
}
