//! Common test utilities for voice session integration tests.
//!
//! Every test pairs a real [`SessionChannel`] with a scripted
//! [`MockController`] running on its own task. The helpers here build the
//! controller side of the recurring exchanges so individual tests only spell
//! out the part they care about.
//!
//! # Usage
//!
//! ```ignore
//! let script = Script::new().handshake().reply("DIAL #9", &["DIALING", "READY"]).goodbye();
//! let (controller, link) = common::spawn_controller(script);
//! let mut session = SessionChannel::open(link, SessionConfig::default()).await.unwrap();
//! ```

#![allow(dead_code)]

use std::io;

use tokio::task::JoinHandle;
use doorvim_voice::mock::{MockController, MockLink, Script};

/// Handle to the controller task; resolves to every command line it saw.
pub type ControllerTask = JoinHandle<io::Result<Vec<String>>>;

/// Start a mock controller playing `script`.
pub fn spawn_controller(script: Script) -> (ControllerTask, MockLink) {
    let (controller, link) = MockController::new();
    (tokio::spawn(controller.run(script)), link)
}

/// Wait for the controller task and return the commands it saw.
pub async fn commands_seen(task: ControllerTask) -> Vec<String> {
    task.await
        .expect("controller task panicked")
        .expect("controller script failed")
}

/// Controller side of the collector's opening exchange.
pub fn collect_prelude(script: Script, wait_secs: u32) -> Script {
    script
        .reply("AUTOSTOP ON", &["READY"])
        .reply("ENABLE EVENTS", &["READY"])
        .reply(&format!("WAIT {wait_secs}"), &["WAITING"])
}

/// Controller side of the collector's closing exchange.
pub fn collect_epilogue(script: Script, autostop: bool) -> Script {
    let autostop = if autostop { "AUTOSTOP ON" } else { "AUTOSTOP OFF" };
    script
        .reply("DISABLE EVENTS", &["READY"])
        .reply(autostop, &["READY"])
}

/// Report the given keys, one `RECEIVED_DTMF` event each.
pub fn press(script: Script, keys: &str) -> Script {
    keys.chars()
        .fold(script, |script, key| script.say("RECEIVED_DTMF").say(key.to_string()))
}

pub mod test_data {
    pub const PROMPT: &str = "sounds/prompt.pcm";
    pub const UNLOCK: &str = "#9";
    pub const WAIT_SECS: u32 = 30;
}
