//! Configuration surface for the coaching pipeline (spec §6.6).
//!
//! One JSON document, loaded once by the supervisor at startup and handed
//! around as `Arc<CoachConfig>`, there is no live-reload in this scope.
//! A missing config file is not an error: a default is written in its
//! place, mirroring `SystemConfig::load_from_path`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Complete coaching pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachConfig {
    pub telemetry: TelemetryConfig,
    pub message: MessageConfig,
    pub persistence: PersistenceConfig,
    pub mode: ModeConfig,
}

/// Sampling and windowing parameters (spec §6.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub telemetry_poll_hz: u32,
    pub session_poll_s: u64,
    pub buffer_duration_s: u64,
    pub sector_boundaries: Vec<f32>,
}

/// Message Queue admission and dispatch parameters (spec §4.14, §6.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    pub message_cooldown_s: u64,
    pub combination_window_s: u64,
    pub max_messages: usize,
    pub rate_limit_per_min_remote: u32,
    pub dedup_window_frontend_s: u64,
    pub dedup_window_backend_s: u64,
}

/// Where session history and reference laps are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub persistence_dir: PathBuf,
}

/// Coaching mode (spec §4.15's `set_mode`) and the active preset it
/// selects. `beginner`/`intermediate`/`advanced`/`race` alter queue and
/// cooldown parameters; the mode named here is just the current selection,
/// not the preset table itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachingMode {
    Beginner,
    Intermediate,
    Advanced,
    Race,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeConfig {
    pub coaching_mode: CoachingMode,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            telemetry_poll_hz: 60,
            session_poll_s: 5,
            buffer_duration_s: 30,
            sector_boundaries: vec![0.0, 0.33, 0.66],
        }
    }
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            message_cooldown_s: 8,
            combination_window_s: 3,
            max_messages: 4,
            rate_limit_per_min_remote: 5,
            dedup_window_frontend_s: 12,
            dedup_window_backend_s: 8,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            persistence_dir: PathBuf::from("pit-coach-data"),
        }
    }
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            coaching_mode: CoachingMode::Intermediate,
        }
    }
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            telemetry: TelemetryConfig::default(),
            message: MessageConfig::default(),
            persistence: PersistenceConfig::default(),
            mode: ModeConfig::default(),
        }
    }
}

impl CoachConfig {
    /// Load from the default per-platform config path, writing a fresh
    /// default file if none exists yet.
    pub async fn load() -> Result<Self> {
        let path = Self::default_config_path()?;
        Self::load_from_path(&path).await
    }

    pub async fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::info!(?path, "config file not found, writing default");
            let config = Self::default();
            config.save_to_path(path).await?;
            return Ok(config);
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file: {path:?}"))?;

        let config: CoachConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {path:?}"))?;

        tracing::debug!(?path, "loaded config");
        Ok(config)
    }

    pub async fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("failed to serialize config")?;

        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("failed to write config file: {path:?}"))?;

        Ok(())
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".config/pit-coach/config.json"))
    }
}
