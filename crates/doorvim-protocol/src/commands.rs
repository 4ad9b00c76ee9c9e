//! Outbound command definitions for the voice shell protocol.
//!
//! Every command is serialized as one ASCII line: the verb, then the
//! positional arguments separated by single spaces, then `\n`.
//!
//! # Wire Format Examples
//!
//! ```text
//! HELLO VOICE PROGRAM
//! AUTOSTOP ON
//! PLAY sounds/prompt.pcm
//! BEEP 1000 500
//! DIAL #9
//! WAIT 30
//! ```
//!
//! # Usage Examples
//!
//! ```
//! use doorvim_protocol::{Command, Tone};
//!
//! let play = Command::play("sounds/prompt.pcm").unwrap();
//! assert_eq!(play.to_line(), "PLAY sounds/prompt.pcm");
//!
//! let beep = Command::Beep(Some(Tone::new(1000).with_duration_ms(500)));
//! assert_eq!(beep.to_line(), "BEEP 1000 500");
//!
//! let parsed: Command = "WAIT 30".parse().unwrap();
//! assert_eq!(parsed, Command::Wait(30));
//! ```

use std::fmt;
use std::str::FromStr;

use doorvim_core::constants::{
    VERB_AUTOSTOP, VERB_BEEP, VERB_DIAL, VERB_DISABLE, VERB_ENABLE, VERB_GOODBYE, VERB_HELLO,
    VERB_PLAY, VERB_STOP, VERB_WAIT,
};
use doorvim_core::{Error, Result};

/// Characters accepted in a `DIAL` argument.
///
/// Digits, the star and hash keys, the extended DTMF letters and the comma
/// pause used by most modems.
const DIAL_CHARS: &str = "0123456789*#ABCD,";

/// Frequency and optional length of a `BEEP`.
///
/// The controller only accepts a duration after a frequency, so the duration
/// lives inside the tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    /// Tone frequency in Hz.
    pub frequency_hz: u32,
    /// Tone length in milliseconds; controller default when `None`.
    pub duration_ms: Option<u32>,
}

impl Tone {
    pub fn new(frequency_hz: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms: None,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Commands sent to the voice controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `HELLO VOICE PROGRAM`: identification after the greeting.
    Hello,
    /// `AUTOSTOP ON|OFF`
    Autostop(bool),
    /// `ENABLE EVENTS`
    EnableEvents,
    /// `DISABLE EVENTS`
    DisableEvents,
    /// `PLAY <path>`
    Play(String),
    /// `BEEP [freq [duration_ms]]`
    Beep(Option<Tone>),
    /// `DIAL <digits>`
    Dial(String),
    /// `WAIT <seconds>`
    Wait(u32),
    /// `STOP`
    Stop,
    /// `GOODBYE`
    Goodbye,
}

impl Command {
    /// Build a `PLAY` command for an audio file.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the path is empty, contains a line
    /// break, or is not ASCII.
    pub fn play(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        validate_argument(VERB_PLAY, &path)?;
        Ok(Command::Play(path))
    }

    /// Build a `DIAL` command.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the number is empty or contains a
    /// character outside `0-9 * # A-D ,`.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorvim_protocol::Command;
    ///
    /// assert!(Command::dial("#9").is_ok());
    /// assert!(Command::dial("9; rm").is_err());
    /// ```
    pub fn dial(number: impl Into<String>) -> Result<Self> {
        let number = number.into();
        if number.is_empty() {
            return Err(Error::invalid_argument(VERB_DIAL, "number is empty"));
        }
        if let Some(bad) = number.chars().find(|c| !DIAL_CHARS.contains(*c)) {
            return Err(Error::invalid_argument(
                VERB_DIAL,
                format!("unsupported dial character {bad:?}"),
            ));
        }
        Ok(Command::Dial(number))
    }

    /// The leading verb of this command.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Hello => VERB_HELLO,
            Command::Autostop(_) => VERB_AUTOSTOP,
            Command::EnableEvents => VERB_ENABLE,
            Command::DisableEvents => VERB_DISABLE,
            Command::Play(_) => VERB_PLAY,
            Command::Beep(_) => VERB_BEEP,
            Command::Dial(_) => VERB_DIAL,
            Command::Wait(_) => VERB_WAIT,
            Command::Stop => VERB_STOP,
            Command::Goodbye => VERB_GOODBYE,
        }
    }

    /// Positional arguments following the verb.
    pub fn args(&self) -> Vec<String> {
        match self {
            Command::Hello => vec!["VOICE".to_string(), "PROGRAM".to_string()],
            Command::Autostop(on) => vec![if *on { "ON" } else { "OFF" }.to_string()],
            Command::EnableEvents | Command::DisableEvents => vec!["EVENTS".to_string()],
            Command::Play(path) => vec![path.clone()],
            Command::Beep(None) => Vec::new(),
            Command::Beep(Some(tone)) => {
                let mut args = vec![tone.frequency_hz.to_string()];
                if let Some(ms) = tone.duration_ms {
                    args.push(ms.to_string());
                }
                args
            }
            Command::Dial(number) => vec![number.clone()],
            Command::Wait(secs) => vec![secs.to_string()],
            Command::Stop | Command::Goodbye => Vec::new(),
        }
    }

    /// Serialize to a protocol line, without the trailing newline.
    pub fn to_line(&self) -> String {
        let mut line = self.verb().to_string();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match (verb, rest) {
            (VERB_HELLO, "VOICE PROGRAM") => Ok(Command::Hello),
            (VERB_AUTOSTOP, "ON") => Ok(Command::Autostop(true)),
            (VERB_AUTOSTOP, "OFF") => Ok(Command::Autostop(false)),
            (VERB_ENABLE, "EVENTS") => Ok(Command::EnableEvents),
            (VERB_DISABLE, "EVENTS") => Ok(Command::DisableEvents),
            (VERB_PLAY, path) => Command::play(path),
            (VERB_BEEP, args) => parse_beep(args),
            (VERB_DIAL, number) => Command::dial(number),
            (VERB_WAIT, secs) => secs
                .parse()
                .map(Command::Wait)
                .map_err(|_| Error::invalid_argument(VERB_WAIT, format!("bad seconds {secs:?}"))),
            (VERB_STOP, "") => Ok(Command::Stop),
            (VERB_GOODBYE, "") => Ok(Command::Goodbye),
            _ => Err(Error::InvalidCommand(line.to_string())),
        }
    }
}

fn parse_beep(args: &str) -> Result<Command> {
    let parse = |value: &str| {
        value
            .parse::<u32>()
            .map_err(|_| Error::invalid_argument(VERB_BEEP, format!("bad number {value:?}")))
    };

    let parts: Vec<&str> = args.split_whitespace().collect();
    match parts.as_slice() {
        [] => Ok(Command::Beep(None)),
        [freq] => Ok(Command::Beep(Some(Tone::new(parse(freq)?)))),
        [freq, ms] => Ok(Command::Beep(Some(
            Tone::new(parse(freq)?).with_duration_ms(parse(ms)?),
        ))),
        _ => Err(Error::invalid_argument(VERB_BEEP, "too many arguments")),
    }
}

/// Reject arguments that would break line framing.
pub(crate) fn validate_argument(verb: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_argument(verb, "argument is empty"));
    }
    if value.contains(['\n', '\r']) {
        return Err(Error::invalid_argument(verb, "argument contains a line break"));
    }
    if !value.is_ascii() {
        return Err(Error::invalid_argument(verb, "argument is not ASCII"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Command::Hello, "HELLO VOICE PROGRAM")]
    #[case(Command::Autostop(true), "AUTOSTOP ON")]
    #[case(Command::Autostop(false), "AUTOSTOP OFF")]
    #[case(Command::EnableEvents, "ENABLE EVENTS")]
    #[case(Command::DisableEvents, "DISABLE EVENTS")]
    #[case(Command::Play("sounds/no.pcm".to_string()), "PLAY sounds/no.pcm")]
    #[case(Command::Beep(None), "BEEP")]
    #[case(Command::Beep(Some(Tone::new(880))), "BEEP 880")]
    #[case(Command::Beep(Some(Tone::new(880).with_duration_ms(1500))), "BEEP 880 1500")]
    #[case(Command::Dial("#9".to_string()), "DIAL #9")]
    #[case(Command::Wait(30), "WAIT 30")]
    #[case(Command::Stop, "STOP")]
    #[case(Command::Goodbye, "GOODBYE")]
    fn test_wire_format(#[case] command: Command, #[case] line: &str) {
        assert_eq!(command.to_line(), line);
        assert_eq!(line.parse::<Command>().unwrap(), command);
    }

    #[test]
    fn test_play_rejects_line_break() {
        let result = Command::play("a.pcm\nGOODBYE");
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_play_rejects_empty_path() {
        assert!(Command::play("").is_err());
    }

    #[test]
    fn test_dial_rejects_letters_outside_dtmf() {
        assert!(Command::dial("12E").is_err());
        assert!(Command::dial("").is_err());
        assert!(Command::dial("555,123#").is_ok());
    }

    #[test]
    fn test_parse_unknown_verb() {
        assert!(matches!(
            "LAUNCH ROCKETS".parse::<Command>(),
            Err(Error::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_parse_beep_too_many_args() {
        assert!("BEEP 1 2 3".parse::<Command>().is_err());
    }
}
