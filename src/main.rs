use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use parlance::app::AppController;
use parlance::commands::{self, TranslateOptions};

#[derive(Parser, Debug)]
#[command(name = "parlance", about = "Record speech and translate it", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a clip, translate it, and play the result
    Translate {
        /// Source language code (see `parlance languages`)
        #[arg(long)]
        from: Option<String>,

        /// Target language code
        #[arg(long)]
        to: Option<String>,

        /// Input device id (see `parlance devices`)
        #[arg(long)]
        device: Option<String>,

        /// Recording cap in seconds
        #[arg(long)]
        max_secs: Option<u64>,

        /// Gateway endpoint URL, overriding the configured one
        #[arg(long)]
        endpoint: Option<String>,

        /// Directory for downloaded translation audio
        #[arg(long)]
        save_dir: Option<PathBuf>,

        /// Skip playing the translated audio
        #[arg(long)]
        no_play: bool,
    },

    /// List audio input devices
    Devices,

    /// List the languages the gateway accepts
    Languages,

    /// Toggle the dark terminal palette
    Theme,

    /// Show configuration, log, and download paths
    Paths,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let controller = AppController::new()?;

    match cli.command {
        Some(Command::Translate {
            from,
            to,
            device,
            max_secs,
            endpoint,
            save_dir,
            no_play,
        }) => {
            let options = TranslateOptions {
                source: from,
                target: to,
                device,
                max_secs,
                endpoint,
                save_dir,
                no_play,
            };
            commands::translate(&controller, options).await?;
        }
        Some(Command::Devices) => commands::devices()?,
        Some(Command::Languages) => commands::languages(&controller),
        Some(Command::Theme) => commands::theme(&controller)?,
        Some(Command::Paths) => commands::paths(&controller),
        // Bare `parlance` runs a translation with configured defaults.
        None => commands::translate(&controller, TranslateOptions::default()).await?,
    }

    Ok(())
}
