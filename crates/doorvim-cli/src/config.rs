//! TOML configuration for the door program.
//!
//! Every field has a default, so a missing file or a file with only a few
//! keys is valid:
//!
//! ```toml
//! [controller]
//! wait_timeout_ms = 10000
//! autostop = true
//!
//! [sounds]
//! prompt = "sounds/prompt.pcm"
//!
//! [auth]
//! users_file = "/home/door/doorvim/users.json"
//! use_token = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use doorvim_core::constants::{
    DEFAULT_DRAIN_TIMEOUT_MS, DEFAULT_DTMF_WAIT_SECS, DEFAULT_PLAY_TIMEOUT_MS,
    DEFAULT_RECEIVE_TIMEOUT_MS, DEFAULT_TOKEN_DURATION_SECS, DEFAULT_UNLOCK_SEQUENCE,
    DEFAULT_WAIT_TIMEOUT_MS,
};
use doorvim_voice::SessionConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error accessing config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DoorvimConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub dtmf: DtmfConfig,
    #[serde(default)]
    pub sounds: SoundsConfig,
    #[serde(default)]
    pub door: DoorConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Deadlines for the voice controller exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerConfig {
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
    #[serde(default = "default_play_timeout_ms")]
    pub play_timeout_ms: u64,
    /// Stop playback as soon as the caller presses a key.
    #[serde(default = "default_true")]
    pub autostop: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DtmfConfig {
    /// Inactivity window while the caller types (seconds).
    #[serde(default = "default_wait_seconds")]
    pub wait_seconds: u32,
}

/// Audio files, in the modem's format. An empty path plays nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoundsConfig {
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_unauthorized")]
    pub unauthorized: String,
    #[serde(default = "default_goodbye")]
    pub goodbye: String,
    /// Played before unlocking for a capability token.
    #[serde(default)]
    pub granted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoorConfig {
    /// In-call DTMF sequence that triggers the door opener.
    #[serde(default = "default_unlock_sequence")]
    pub unlock_sequence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    #[serde(default = "default_users_file")]
    pub users_file: PathBuf,
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
    #[serde(default = "default_token_duration_secs")]
    pub token_duration_secs: u64,
    #[serde(default = "default_true")]
    pub use_token: bool,
    #[serde(default = "default_true")]
    pub use_dtmf: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_receive_timeout_ms() -> u64 {
    DEFAULT_RECEIVE_TIMEOUT_MS
}
fn default_wait_timeout_ms() -> u64 {
    DEFAULT_WAIT_TIMEOUT_MS
}
fn default_drain_timeout_ms() -> u64 {
    DEFAULT_DRAIN_TIMEOUT_MS
}
fn default_play_timeout_ms() -> u64 {
    DEFAULT_PLAY_TIMEOUT_MS
}
fn default_true() -> bool {
    true
}
fn default_wait_seconds() -> u32 {
    DEFAULT_DTMF_WAIT_SECS
}
fn default_prompt() -> String {
    "sounds/prompt.pcm".to_string()
}
fn default_unauthorized() -> String {
    "sounds/no.pcm".to_string()
}
fn default_goodbye() -> String {
    "sounds/goodbye.pcm".to_string()
}
fn default_unlock_sequence() -> String {
    DEFAULT_UNLOCK_SEQUENCE.to_string()
}
fn default_users_file() -> PathBuf {
    PathBuf::from("users.json")
}
fn default_token_file() -> PathBuf {
    PathBuf::from("/home/door/doorvim/.auth")
}
fn default_token_duration_secs() -> u64 {
    DEFAULT_TOKEN_DURATION_SECS
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            receive_timeout_ms: default_receive_timeout_ms(),
            wait_timeout_ms: default_wait_timeout_ms(),
            drain_timeout_ms: default_drain_timeout_ms(),
            play_timeout_ms: default_play_timeout_ms(),
            autostop: default_true(),
        }
    }
}

impl Default for DtmfConfig {
    fn default() -> Self {
        Self {
            wait_seconds: default_wait_seconds(),
        }
    }
}

impl Default for SoundsConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            unauthorized: default_unauthorized(),
            goodbye: default_goodbye(),
            granted: String::new(),
        }
    }
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            unlock_sequence: default_unlock_sequence(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users_file: default_users_file(),
            token_file: default_token_file(),
            token_duration_secs: default_token_duration_secs(),
            use_token: default_true(),
            use_dtmf: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ControllerConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            receive_timeout: Duration::from_millis(self.receive_timeout_ms),
            wait_timeout: Duration::from_millis(self.wait_timeout_ms),
            drain_timeout: Duration::from_millis(self.drain_timeout_ms),
            play_timeout: Duration::from_millis(self.play_timeout_ms),
            autostop: self.autostop,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load the configuration, falling back to defaults when no path is given or
/// the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<DoorvimConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(DoorvimConfig::default());
    };

    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DoorvimConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DoorvimConfig::default();
        assert_eq!(config.controller.session_config(), SessionConfig::default());
        assert_eq!(config.dtmf.wait_seconds, 30);
        assert_eq!(config.door.unlock_sequence, "#9");
        assert_eq!(config.auth.token_duration_secs, 120);
        assert!(config.auth.use_token && config.auth.use_dtmf);
        assert_eq!(config.sounds.goodbye, "sounds/goodbye.pcm");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: DoorvimConfig = toml::from_str(
            r#"
            [controller]
            wait_timeout_ms = 2500

            [auth]
            use_token = false
            "#,
        )
        .unwrap();

        assert_eq!(config.controller.wait_timeout_ms, 2500);
        assert_eq!(config.controller.receive_timeout_ms, 1000);
        assert!(!config.auth.use_token);
        assert!(config.auth.use_dtmf);
        assert_eq!(config.sounds, SoundsConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: DoorvimConfig = toml::from_str("").unwrap();
        assert_eq!(config, DoorvimConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("doorvim.toml"))).unwrap();
        assert_eq!(config, DoorvimConfig::default());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doorvim.toml");
        std::fs::write(&path, "[dtmf\nwait_seconds = ").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Parse(_))
        ));
    }
}
