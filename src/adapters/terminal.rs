use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::TranslationResult;
use crate::ports::Presenter;

/// Delay before the progress line gives way to the result block.
const RESULT_SWAP_DELAY_MS: u64 = 500;

const PROGRESS_BAR_WIDTH: usize = 20;
const LEVEL_METER_WIDTH: usize = 8;

const RESET: &str = "\x1b[0m";
const ERASE_LINE: &str = "\r\x1b[2K";

/// ANSI palette selected by the persisted dark-mode preference.
struct Palette {
    accent: &'static str,
    error: &'static str,
    dim: &'static str,
}

const LIGHT: Palette = Palette {
    accent: "\x1b[34m",
    error: "\x1b[31m",
    dim: "\x1b[2m",
};

const DARK: Palette = Palette {
    accent: "\x1b[96m",
    error: "\x1b[91m",
    dim: "\x1b[90m",
};

/// Renders session progress as carriage-return lines on stdout.
///
/// Transient lines (countdown, progress) redraw in place; status lines
/// and the result block print on their own lines.
pub struct TerminalPresenter {
    palette: Palette,
    /// True while a transient line occupies the cursor row.
    line_active: Mutex<bool>,
}

impl TerminalPresenter {
    pub fn new(dark_mode: bool) -> Self {
        Self {
            palette: if dark_mode { DARK } else { LIGHT },
            line_active: Mutex::new(false),
        }
    }

    /// Finish any transient line so the next print starts clean.
    fn end_transient_line(&self) {
        let mut active = self.line_active.lock();
        if *active {
            println!();
            *active = false;
        }
    }

    fn draw_transient(&self, line: &str) {
        print!("{}{}", ERASE_LINE, line);
        std::io::stdout().flush().ok();
        *self.line_active.lock() = true;
    }

    /// Format elapsed milliseconds as mm:ss.
    fn format_clock(ms: u64) -> String {
        let total_secs = ms / 1000;
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }

    /// Render a fill bar for a 0.0-1.0 fraction.
    fn render_bar(fraction: f32, width: usize) -> String {
        let filled = (fraction.clamp(0.0, 1.0) * width as f32).round() as usize;
        let mut bar = String::with_capacity(width);
        for i in 0..width {
            bar.push(if i < filled { '#' } else { '-' });
        }
        bar
    }
}

#[async_trait]
impl Presenter for TerminalPresenter {
    fn reset(&self) {
        self.end_transient_line();
    }

    fn status(&self, message: &str) {
        self.end_transient_line();
        println!("{}{}{}", self.palette.accent, message, RESET);
    }

    fn error(&self, message: &str) {
        self.end_transient_line();
        println!("{}{}{}", self.palette.error, message, RESET);
    }

    fn countdown(&self, elapsed_ms: u64, limit_ms: u64, level: f32) {
        let line = format!(
            "{}●{} {} / {} {}[{}]{}",
            self.palette.error,
            RESET,
            Self::format_clock(elapsed_ms),
            Self::format_clock(limit_ms),
            self.palette.dim,
            Self::render_bar(level, LEVEL_METER_WIDTH),
            RESET,
        );
        self.draw_transient(&line);
    }

    fn progress(&self, percent: f32) {
        let line = format!(
            "{}[{}] {:>3.0}%{}",
            self.palette.accent,
            Self::render_bar(percent / 100.0, PROGRESS_BAR_WIDTH),
            percent.clamp(0.0, 100.0),
            RESET,
        );
        self.draw_transient(&line);
    }

    async fn present(&self, result: &TranslationResult, audio_path: Option<&Path>) {
        self.progress(100.0);
        tokio::time::sleep(tokio::time::Duration::from_millis(RESULT_SWAP_DELAY_MS)).await;
        self.end_transient_line();

        println!("{}Translation complete!{}", self.palette.accent, RESET);
        println!();
        println!("  Original:    {}", result.original_text_display());
        println!("  Translated:  {}", result.translated_text_display());
        if let Some(path) = audio_path {
            println!(
                "  Audio:       {}{}{}",
                self.palette.dim,
                path.display(),
                RESET
            );
        }
    }
}
