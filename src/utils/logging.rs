//! Logging setup and training progress lines
//!
//! Binaries call [`init_logging`] once at start-up; library code only emits
//! `tracing` events.

use std::time::Instant;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use super::format_duration;

/// Subscriber options chosen by a binary
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used when `RUST_LOG` is unset
    pub level: Level,
    /// Print the module path of each event
    pub with_target: bool,
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            with_target: false,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// `--verbose`: debug events with their module path
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            with_target: true,
            ..Self::default()
        }
    }

    pub fn quiet() -> Self {
        Self {
            level: Level::ERROR,
            ..Self::default()
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_lowercase()))
    }
}

/// Install a compact global subscriber; fails if one is already set
pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_ansi(config.ansi)
        .with_target(config.with_target)
        .compact()
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

/// Keras-style per-epoch summary lines with an ETA
pub struct TrainingLogger {
    epoch: usize,
    total_epochs: usize,
    epoch_start: Instant,
    training_start: Instant,
}

impl TrainingLogger {
    pub fn new(total_epochs: usize) -> Self {
        let now = Instant::now();
        Self {
            epoch: 0,
            total_epochs,
            epoch_start: now,
            training_start: now,
        }
    }

    /// `epoch` is 0-based
    pub fn start_epoch(&mut self, epoch: usize) {
        self.epoch = epoch;
        self.epoch_start = Instant::now();
        tracing::debug!("Epoch {}/{} started", epoch + 1, self.total_epochs);
    }

    /// `validation` is `(loss, accuracy)` on the held-out tail, if any
    pub fn end_epoch(&self, train_loss: f64, train_accuracy: f64, validation: Option<(f64, f64)>) {
        let done = self.epoch + 1;
        let elapsed = self.training_start.elapsed().as_secs_f64();
        let eta = self.total_epochs.saturating_sub(done) as f64 * elapsed / done as f64;

        let val = validation
            .map(|(loss, acc)| format!(" - val_loss: {:.4} - val_accuracy: {:.4}", loss, acc))
            .unwrap_or_default();

        tracing::info!(
            "Epoch {}/{} ({}) - loss: {:.4} - accuracy: {:.4}{} | ETA {}",
            done,
            self.total_epochs,
            format_duration(self.epoch_start.elapsed().as_secs_f64()),
            train_loss,
            train_accuracy,
            val,
            format_duration(eta)
        );
    }
}
