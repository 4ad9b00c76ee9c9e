//! Time-windowed, single-use capability token.
//!
//! The token is a marker file whose modification time is the instant the
//! window closes. An administrator creates it from a shell session shortly
//! before calling the door; the door program consumes it on the next call.
//!
//! # Ordering
//!
//! `check_and_consume` reads the expiry, removes the file, and only then
//! judges. Whoever loses the removal race sees the token as absent, so one
//! authorization opens the door at most once.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use doorvim_auth::{CapabilityToken, TokenDecision};
//!
//! # fn example() -> Result<(), doorvim_auth::AuthError> {
//! let token = CapabilityToken::new("/home/door/doorvim/.auth");
//! token.authorize(Duration::from_secs(60))?;
//!
//! match token.check_and_consume()? {
//!     TokenDecision::Authorized { .. } => println!("welcome"),
//!     TokenDecision::Expired { .. } | TokenDecision::Absent => println!("no token"),
//! }
//! # Ok(())
//! # }
//! ```

use std::fs::{self, OpenOptions, Permissions};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use tracing::{debug, info, warn};

use crate::error::{AuthError, AuthResult};

/// File mode of the marker: owner and group may read and write.
pub const TOKEN_MODE: u32 = 0o660;

/// Outcome of one token check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDecision {
    /// A live token was found and consumed.
    Authorized { expires_at: SystemTime },
    /// A stale token was found and removed.
    Expired { expired_at: SystemTime },
    /// No token, or another check consumed it first.
    Absent,
}

impl TokenDecision {
    pub fn is_authorized(&self) -> bool {
        matches!(self, TokenDecision::Authorized { .. })
    }
}

/// Marker file granting one door opening until its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityToken {
    path: PathBuf,
}

impl CapabilityToken {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a window of `duration` from now, replacing any previous one.
    ///
    /// Returns the expiry instant.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidDuration` for a zero duration
    /// - `AuthError::DurationTooLarge` if the expiry overflows the clock
    /// - `AuthError::Io` if the marker cannot be created or stamped
    pub fn authorize(&self, duration: Duration) -> AuthResult<SystemTime> {
        if duration.is_zero() {
            return Err(AuthError::InvalidDuration);
        }
        let expires_at = SystemTime::now()
            .checked_add(duration)
            .ok_or(AuthError::DurationTooLarge {
                seconds: duration.as_secs(),
            })?;
        self.authorize_until(expires_at)?;
        Ok(expires_at)
    }

    /// Open a window that closes at `expires_at`.
    pub fn authorize_until(&self, expires_at: SystemTime) -> AuthResult<()> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        fs::set_permissions(&self.path, Permissions::from_mode(TOKEN_MODE))
            .map_err(|e| self.io_error(e))?;

        let stamp = FileTime::from_system_time(expires_at);
        filetime::set_file_times(&self.path, stamp, stamp).map_err(|e| self.io_error(e))?;

        info!("Capability token written to {}", self.path.display());
        Ok(())
    }

    /// Remove the marker.
    ///
    /// Returns whether a token existed. An absent marker is not an error.
    pub fn revoke(&self) -> AuthResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Capability token revoked");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No capability token to revoke");
                Ok(false)
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Expiry of the outstanding token, if any, without consuming it.
    pub fn status(&self) -> AuthResult<Option<SystemTime>> {
        match fs::metadata(&self.path) {
            Ok(metadata) => metadata.modified().map(Some).map_err(|e| self.io_error(e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Check the token against the current time and consume it.
    pub fn check_and_consume(&self) -> AuthResult<TokenDecision> {
        self.check_and_consume_at(SystemTime::now())
    }

    /// Check the token against `now` and consume it.
    ///
    /// Authorized only if the recorded expiry is strictly after `now`.
    pub fn check_and_consume_at(&self, now: SystemTime) -> AuthResult<TokenDecision> {
        let Some(expiry) = self.status()? else {
            return Ok(TokenDecision::Absent);
        };

        if !self.revoke()? {
            debug!("Capability token consumed by another check");
            return Ok(TokenDecision::Absent);
        }

        if expiry > now {
            info!("Capability token accepted");
            Ok(TokenDecision::Authorized { expires_at: expiry })
        } else {
            warn!("Capability token expired, removed");
            Ok(TokenDecision::Expired { expired_at: expiry })
        }
    }

    fn io_error(&self, source: io::Error) -> AuthError {
        AuthError::io(&self.path, source)
    }
}
