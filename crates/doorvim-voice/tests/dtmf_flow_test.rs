//! Integration tests for DTMF code collection.
//!
//! The controller scripts reproduce what vgetty reports while a caller types
//! on the keypad: a `RECEIVED_DTMF` token followed by a one-character key
//! line, `SILENCE_DETECTED` when the inactivity window elapses, and `READY`
//! once a `STOP` was honoured.

mod common;

use std::time::Duration;

use common::test_data::*;
use common::{collect_epilogue, collect_prelude, press};
use doorvim_core::{DtmfResult, SessionState};
use doorvim_voice::mock::Script;
use doorvim_voice::{DtmfCollector, SessionChannel, SessionConfig, VoiceError};

/// Script for a collection where the caller ends entry with `#`.
fn keypad_script(keys: &str) -> Script {
    let script = collect_prelude(Script::new().handshake(), WAIT_SECS);
    let script = press(script, keys).reply("STOP", &["READY"]);
    collect_epilogue(script, true).goodbye()
}

async fn collect_with(script: Script, collector: DtmfCollector) -> (DtmfResult, Vec<String>) {
    let (controller, link) = common::spawn_controller(script);
    let result = SessionChannel::with_session(link, SessionConfig::default(), async |session| {
        collector.collect(session).await
    })
    .await
    .unwrap();
    (result, common::commands_seen(controller).await)
}

#[tokio::test]
async fn test_star_clears_and_hash_terminates() {
    let (result, seen) = collect_with(keypad_script("12*34#"), DtmfCollector::new(WAIT_SECS)).await;

    assert_eq!(result, DtmfResult::Code("34".to_string()));
    assert_eq!(
        seen,
        vec![
            "HELLO VOICE PROGRAM",
            "AUTOSTOP ON",
            "AUTOSTOP ON",
            "ENABLE EVENTS",
            "WAIT 30",
            "STOP",
            "DISABLE EVENTS",
            "AUTOSTOP ON",
            "GOODBYE",
        ]
    );
}

#[tokio::test]
async fn test_immediate_hash_yields_empty_code() {
    let (result, _) = collect_with(keypad_script("#"), DtmfCollector::new(WAIT_SECS)).await;

    assert_eq!(result, DtmfResult::Code(String::new()));
    assert!(!result.is_silence());
}

#[tokio::test]
async fn test_silence_before_any_digit() {
    let script = collect_prelude(Script::new().handshake(), WAIT_SECS)
        .say("SILENCE_DETECTED")
        .reply("STOP", &["READY"]);
    let script = collect_epilogue(script, true).goodbye();

    let (result, _) = collect_with(script, DtmfCollector::new(WAIT_SECS)).await;
    assert_eq!(result, DtmfResult::Silence);
}

#[tokio::test]
async fn test_silence_discards_partial_code() {
    let script = collect_prelude(Script::new().handshake(), WAIT_SECS);
    let script = press(script, "42")
        .say("SILENCE_DETECTED")
        .reply("STOP", &["READY"]);
    let script = collect_epilogue(script, true).goodbye();

    let (result, _) = collect_with(script, DtmfCollector::new(WAIT_SECS)).await;
    assert_eq!(result, DtmfResult::Silence);
}

#[tokio::test]
async fn test_extended_keys_are_ignored() {
    let (result, _) = collect_with(keypad_script("1A2D3#"), DtmfCollector::new(WAIT_SECS)).await;
    assert_eq!(result, DtmfResult::Code("123".to_string()));
}

#[tokio::test]
async fn test_malformed_key_line_is_skipped() {
    let script = collect_prelude(Script::new().handshake(), WAIT_SECS);
    let script = press(script, "7")
        .say("RECEIVED_DTMF")
        .say("99")
        .say("RECEIVED_DTMF")
        .say("#")
        .reply("STOP", &["READY"]);
    let script = collect_epilogue(script, true).goodbye();

    let (result, _) = collect_with(script, DtmfCollector::new(WAIT_SECS)).await;
    assert_eq!(result, DtmfResult::Code("7".to_string()));
}

#[tokio::test]
async fn test_controller_ready_ends_collection() {
    let script = collect_prelude(Script::new().handshake(), WAIT_SECS);
    let script = press(script, "55").say("READY");
    let script = collect_epilogue(script, true).goodbye();

    let (result, seen) = collect_with(script, DtmfCollector::new(WAIT_SECS)).await;
    assert_eq!(result, DtmfResult::Code("55".to_string()));
    assert!(!seen.contains(&"STOP".to_string()));
}

#[tokio::test]
async fn test_prompt_is_played_before_waiting() {
    let script = Script::new()
        .handshake()
        .reply("AUTOSTOP ON", &["READY"])
        .reply("ENABLE EVENTS", &["READY"])
        .reply(&format!("PLAY {PROMPT}"), &["VCON", "PLAYING"])
        .reply("WAIT 30", &["WAITING"]);
    let script = press(script, "9#").reply("STOP", &["READY"]);
    let script = collect_epilogue(script, true).goodbye();

    let collector = DtmfCollector::new(WAIT_SECS).with_prompt(PROMPT);
    let (result, seen) = collect_with(script, collector).await;

    assert_eq!(result, DtmfResult::Code("9".to_string()));
    assert!(seen.contains(&"PLAY sounds/prompt.pcm".to_string()));
}

#[tokio::test]
async fn test_prompt_finished_without_playing_notice() {
    let script = Script::new()
        .handshake()
        .reply("AUTOSTOP ON", &["READY"])
        .reply("ENABLE EVENTS", &["READY"])
        .reply(&format!("PLAY {PROMPT}"), &["READY"])
        .reply("WAIT 30", &["WAITING"]);
    let script = press(script, "42#").reply("STOP", &["READY"]);
    let script = collect_epilogue(script, true).goodbye();

    let collector = DtmfCollector::new(WAIT_SECS).with_prompt(PROMPT);
    let (result, seen) = collect_with(script, collector).await;

    assert_eq!(result, DtmfResult::Code("42".to_string()));
    let play = seen.iter().position(|line| line == "PLAY sounds/prompt.pcm").unwrap();
    assert_eq!(seen[play + 1], "WAIT 30");
}

#[tokio::test]
async fn test_autostop_restored_to_configured_mode() {
    let script = Script::new()
        .handshake_without_autostop()
        .reply("AUTOSTOP ON", &["READY"])
        .reply("ENABLE EVENTS", &["READY"])
        .reply("WAIT 10", &["WAITING"]);
    let script = press(script, "#").reply("STOP", &["READY"]);
    let script = collect_epilogue(script, false).goodbye();

    let (controller, link) = common::spawn_controller(script);
    let config = SessionConfig {
        autostop: false,
        ..SessionConfig::default()
    };
    let collector = DtmfCollector::new(10);

    let mut session = SessionChannel::open(link, config).await.unwrap();
    let result = collector.collect(&mut session).await.unwrap();
    assert_eq!(result, DtmfResult::Code(String::new()));
    assert_eq!(session.state(), SessionState::Ready);
    session.close().await;

    let seen = common::commands_seen(controller).await;
    assert_eq!(seen[seen.len() - 2], "AUTOSTOP OFF");
}

#[tokio::test]
async fn test_code_is_bounded() {
    let (result, _) = collect_with(
        keypad_script("123456#"),
        DtmfCollector::new(WAIT_SECS).with_max_digits(4),
    )
    .await;
    assert_eq!(result, DtmfResult::Code("1234".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_inactivity_window_elapses() {
    let script = collect_prelude(Script::new().handshake(), 5)
        .pause(Duration::from_secs(60));
    let (controller, link) = common::spawn_controller(script);

    let mut session = SessionChannel::open(link, SessionConfig::default()).await.unwrap();
    let result = DtmfCollector::new(5).collect(&mut session).await;
    assert!(matches!(result, Err(VoiceError::Timeout { duration_ms: 5000 })));
    assert_eq!(session.state(), SessionState::Waiting);

    session.close().await;
    common::commands_seen(controller).await;
}

#[tokio::test]
async fn test_error_during_collection() {
    let script = collect_prelude(Script::new().handshake(), WAIT_SECS).say("ERROR");
    let (controller, link) = common::spawn_controller(script);

    let outcome = SessionChannel::with_session(link, SessionConfig::default(), async |session| {
        DtmfCollector::new(WAIT_SECS).collect(session).await
    })
    .await;
    assert!(matches!(outcome, Err(VoiceError::Controller)));

    let seen = common::commands_seen(controller).await;
    assert!(!seen.contains(&"GOODBYE".to_string()));
}
