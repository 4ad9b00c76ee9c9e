//! Common fixtures for call flow tests.
//!
//! Each test gets a temporary directory holding the capability token and a
//! user directory, a configuration pointing at them, and a scripted
//! controller on its own task.

#![allow(dead_code)]

use std::fs;
use std::io;

use tempfile::TempDir;
use tokio::task::JoinHandle;

use doorvim_auth::{CapabilityToken, UserDirectory};
use doorvim_cli::DoorvimConfig;
use doorvim_voice::mock::{MockController, MockLink, Script};

pub mod test_data {
    pub const PROMPT: &str = "sounds/prompt.pcm";
    pub const GRANTED: &str = "sounds/welcome.pcm";
    pub const UNAUTHORIZED: &str = "sounds/no.pcm";
    pub const GOODBYE: &str = "sounds/goodbye.pcm";
    pub const ALICE_GREETING: &str = "sounds/alice.pcm";
    /// `door` on the keypad.
    pub const ALICE_CODE: &str = "3667";
    pub const UNLOCK: &str = "#9";
    pub const WAIT_SECS: u32 = 30;
}

use test_data::*;

/// Everything a call needs besides the session.
pub struct Fixture {
    pub dir: TempDir,
    pub config: DoorvimConfig,
    pub token: CapabilityToken,
    pub users: UserDirectory,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();

        let users_file = dir.path().join("users.json");
        fs::write(
            &users_file,
            format!(r#"{{"alice": {{"pass": "door", "greeting": "{ALICE_GREETING}"}}}}"#),
        )
        .unwrap();

        let mut config = DoorvimConfig::default();
        config.auth.users_file = users_file;
        config.auth.token_file = dir.path().join(".auth");
        config.sounds.prompt = PROMPT.to_string();
        config.sounds.granted = GRANTED.to_string();
        config.sounds.unauthorized = UNAUTHORIZED.to_string();
        config.sounds.goodbye = GOODBYE.to_string();
        config.dtmf.wait_seconds = WAIT_SECS;

        let token = CapabilityToken::new(config.auth.token_file.clone());
        let users = UserDirectory::load(&config.auth.users_file).unwrap();

        Self {
            dir,
            config,
            token,
            users,
        }
    }
}

pub type ControllerTask = JoinHandle<io::Result<Vec<String>>>;

pub fn spawn_controller(script: Script) -> (ControllerTask, MockLink) {
    let (controller, link) = MockController::new();
    (tokio::spawn(controller.run(script)), link)
}

pub async fn commands_seen(task: ControllerTask) -> Vec<String> {
    task.await
        .expect("controller task panicked")
        .expect("controller script failed")
}

/// Controller side of a completed playback.
pub fn played(script: Script, path: &str) -> Script {
    script.reply(&format!("PLAY {path}"), &["PLAYING", "READY"])
}

/// Controller side of the unlock sequence.
pub fn unlocked(script: Script) -> Script {
    script.reply(&format!("DIAL {UNLOCK}"), &["DIALING", "READY"])
}

/// Controller side of keypad entry up to the first key event.
pub fn prompted(script: Script) -> Script {
    script
        .reply("AUTOSTOP ON", &["READY"])
        .reply("ENABLE EVENTS", &["READY"])
        .reply(&format!("PLAY {PROMPT}"), &["PLAYING"])
        .reply(&format!("WAIT {WAIT_SECS}"), &["WAITING"])
}

/// Keys followed by the `STOP` the terminating `#` triggers.
pub fn typed(script: Script, keys: &str) -> Script {
    keys.chars()
        .fold(script, |script, key| {
            script.say("RECEIVED_DTMF").say(key.to_string())
        })
        .reply("STOP", &["READY"])
}

/// Controller side of the collector's closing exchange.
pub fn collected(script: Script) -> Script {
    script
        .reply("DISABLE EVENTS", &["READY"])
        .reply("AUTOSTOP ON", &["READY"])
}
