//! The door call: decide who is calling and open the door for them.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use doorvim_auth::{CapabilityToken, UserDirectory};
use doorvim_core::DtmfResult;
use doorvim_voice::{DtmfCollector, Notifier, SessionChannel, VoiceError};

use crate::config::DoorvimConfig;

/// Pause after the refusal message so the caller hears it before goodbye.
const UNAUTHORIZED_PAUSE: Duration = Duration::from_millis(500);

/// How a call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// A capability token opened the door.
    TokenGranted,
    /// The named user's code opened the door.
    UserGranted(String),
    /// The caller entered a code that matches nobody.
    Denied,
    /// The caller never pressed a key.
    Silence,
    /// Neither authentication path is enabled.
    NoMethod,
}

impl CallOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, CallOutcome::TokenGranted | CallOutcome::UserGranted(_))
    }
}

/// Run one call on an open session.
///
/// The capability token is checked first; a token failure is logged and the
/// call falls through to keypad entry. The session is left open for the
/// caller to close.
pub async fn answer_call<R, W, N>(
    session: &mut SessionChannel<R, W, N>,
    config: &DoorvimConfig,
    token: &CapabilityToken,
    users: &UserDirectory,
) -> Result<CallOutcome, VoiceError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    N: Notifier,
{
    if config.auth.use_token && token_is_valid(token) {
        info!("Door opened by capability token");
        session.play(&config.sounds.granted).await?;
        session.dial(&config.door.unlock_sequence).await?;
        session.play(&config.sounds.goodbye).await?;
        return Ok(CallOutcome::TokenGranted);
    }

    if !config.auth.use_dtmf {
        info!("No authentication method left to try");
        session.play(&config.sounds.goodbye).await?;
        return Ok(CallOutcome::NoMethod);
    }

    let collector = DtmfCollector::new(config.dtmf.wait_seconds).with_prompt(&config.sounds.prompt);
    let outcome = match collector.collect(session).await? {
        DtmfResult::Silence => {
            info!("Caller stayed silent");
            CallOutcome::Silence
        }
        DtmfResult::Code(code) => match users.authenticate(&code) {
            Some(user) => {
                info!(user = user.name(), "Door opened by user code");
                session.play(user.greeting().unwrap_or_default()).await?;
                session.dial(&config.door.unlock_sequence).await?;
                CallOutcome::UserGranted(user.name().to_string())
            }
            None => {
                // never log the code itself
                warn!(digits = code.len(), "Code matches no user");
                session.play(&config.sounds.unauthorized).await?;
                tokio::time::sleep(UNAUTHORIZED_PAUSE).await;
                CallOutcome::Denied
            }
        },
    };

    session.play(&config.sounds.goodbye).await?;
    Ok(outcome)
}

fn token_is_valid(token: &CapabilityToken) -> bool {
    match token.check_and_consume() {
        Ok(decision) => {
            debug!(?decision, "Capability token checked");
            decision.is_authorized()
        }
        Err(e) => {
            warn!("Capability token check failed: {e}");
            false
        }
    }
}
