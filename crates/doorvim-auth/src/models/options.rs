use serde::{Deserialize, Serialize};

/// On/off flag as written in the directory file.
///
/// Accepts `true`/`false` as well as integers, where any non-zero value is
/// on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle {
    Flag(bool),
    Number(i64),
}

impl Toggle {
    pub fn is_on(self) -> bool {
        match self {
            Toggle::Flag(flag) => flag,
            Toggle::Number(n) => n != 0,
        }
    }
}

/// One user record of the directory file, exactly as stored.
///
/// Unknown keys are rejected so a typo such as `"pasword"` does not silently
/// produce a user nobody can authenticate as.
///
/// # Examples
///
/// ```
/// use doorvim_auth::UserOptions;
///
/// let options: UserOptions = serde_json::from_str(r#"{"pass": "door", "disable": 0}"#).unwrap();
/// assert_eq!(options.pass.as_deref(), Some("door"));
/// assert!(options.is_enabled());
///
/// assert!(serde_json::from_str::<UserOptions>(r#"{"pasword": "door"}"#).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserOptions {
    /// Hex SHA-256 of salt followed by the keypad digits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Hex salt prepended before hashing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,

    /// Plaintext password (letters and digits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,

    /// Audio file played when this user is recognized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<Toggle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<Toggle>,
}

impl UserOptions {
    /// Users are enabled unless `disable` is on or `enable` is off.
    pub fn is_enabled(&self) -> bool {
        is_enabled(self.enable, self.disable)
    }
}

/// Only the on/off switches of a record; other keys are ignored.
///
/// Read before [`UserOptions`] so dormant records are never validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Activation {
    #[serde(default)]
    pub enable: Option<Toggle>,

    #[serde(default)]
    pub disable: Option<Toggle>,
}

impl Activation {
    pub fn is_enabled(&self) -> bool {
        is_enabled(self.enable, self.disable)
    }
}

fn is_enabled(enable: Option<Toggle>, disable: Option<Toggle>) -> bool {
    let disabled = disable.is_some_and(Toggle::is_on);
    let enabled = enable.is_none_or(Toggle::is_on);
    !disabled && enabled
}
