//! Administrative commands, run from a shell on the door host.
//!
//! Each command returns the report printed on success; the caller prints
//! `Doorvim Error` and the cause when one fails.

use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};

use doorvim_auth::{AuthResult, CapabilityToken, UserDirectory};

/// Open a token window of `seconds` from now.
pub fn authenticate(token: &CapabilityToken, seconds: u64) -> AuthResult<String> {
    token.authorize(Duration::from_secs(seconds))?;
    Ok(format!("Success\nDoorvim authenticated for {seconds} seconds"))
}

pub fn revoke(token: &CapabilityToken) -> AuthResult<String> {
    token.revoke()?;
    Ok("Success\nDoorvim no longer authenticated".to_string())
}

/// Describe the outstanding token without consuming it.
pub fn status(token: &CapabilityToken) -> AuthResult<String> {
    status_at(token, SystemTime::now())
}

fn status_at(token: &CapabilityToken, now: SystemTime) -> AuthResult<String> {
    let report = match token.status()? {
        Some(expiry) if expiry > now => {
            let local: DateTime<Local> = expiry.into();
            format!(
                "Doorvim authenticated until {}",
                local.format("%Y-%m-%d %H:%M:%S")
            )
        }
        Some(_) => "Doorvim token expired".to_string(),
        None => "Doorvim not authenticated".to_string(),
    };
    Ok(report)
}

/// Add a user to the directory at `path`.
pub fn enroll(path: &Path, name: &str, password: &str, store_hash: bool) -> AuthResult<String> {
    let user = UserDirectory::enroll(path, name, password, store_hash)?;
    Ok(format!("Success\nUser {} enrolled", user.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorvim_auth::AuthError;

    fn token_in(dir: &tempfile::TempDir) -> CapabilityToken {
        CapabilityToken::new(dir.path().join(".auth"))
    }

    #[test]
    fn test_authenticate_then_status() {
        let dir = tempfile::tempdir().unwrap();
        let token = token_in(&dir);

        let report = authenticate(&token, 90).unwrap();
        assert_eq!(report, "Success\nDoorvim authenticated for 90 seconds");
        assert!(status(&token).unwrap().starts_with("Doorvim authenticated until "));
    }

    #[test]
    fn test_status_does_not_consume() {
        let dir = tempfile::tempdir().unwrap();
        let token = token_in(&dir);

        authenticate(&token, 60).unwrap();
        status(&token).unwrap();
        assert!(token.check_and_consume().unwrap().is_authorized());
    }

    #[test]
    fn test_status_of_stale_token() {
        let dir = tempfile::tempdir().unwrap();
        let token = token_in(&dir);

        authenticate(&token, 60).unwrap();
        let later = SystemTime::now() + Duration::from_secs(3600);
        assert_eq!(status_at(&token, later).unwrap(), "Doorvim token expired");
    }

    #[test]
    fn test_revoke_reports_success_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let token = token_in(&dir);

        assert_eq!(
            revoke(&token).unwrap(),
            "Success\nDoorvim no longer authenticated"
        );
        assert_eq!(status(&token).unwrap(), "Doorvim not authenticated");
    }

    #[test]
    fn test_zero_seconds_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            authenticate(&token_in(&dir), 0),
            Err(AuthError::InvalidDuration)
        ));
    }

    #[test]
    fn test_huge_window_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let token = token_in(&dir);

        let err = authenticate(&token, u64::MAX).unwrap_err();
        assert!(matches!(err, AuthError::DurationTooLarge { .. }));
        assert_eq!(status(&token).unwrap(), "Doorvim not authenticated");
    }

    #[test]
    fn test_enroll_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        let report = enroll(&path, "alice", "door", true).unwrap();
        assert_eq!(report, "Success\nUser alice enrolled");
        let users = UserDirectory::load(&path).unwrap();
        assert!(users.authenticate("3667").is_some());
    }
}
