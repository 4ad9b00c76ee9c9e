//! JSON directory of known users.
//!
//! The file maps user names to their options:
//!
//! ```json
//! {
//!   "alice": {
//!     "greeting": "sounds/alice.pcm",
//!     "hash": "5d1b...",
//!     "salt": "9f2c..."
//!   },
//!   "bob": {
//!     "pass": "door",
//!     "disable": 1
//!   }
//! }
//! ```
//!
//! Users are matched in the order they appear in the file, so when two
//! users share a code the earlier one wins. Enrollment rewrites the file
//! with names sorted.
//!
//! Only enabled records are validated; a disabled record may carry keys
//! the current schema no longer knows.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::RngCore;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::{AuthError, AuthResult};
use crate::keypad::encode_as_digits;
use crate::models::user::salted_digest;
use crate::models::{Activation, User, UserOptions};

/// Salt length for newly enrolled users (bytes).
pub const SALT_LEN: usize = 16;

/// Raw file contents in file order, before records are validated.
///
/// A name repeated in the file keeps its first position and its last
/// value.
#[derive(Debug, Default)]
struct RawDirectory(Vec<(String, Value)>);

impl RawDirectory {
    fn insert(&mut self, name: String, value: Value) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    fn into_sorted(self) -> BTreeMap<String, Value> {
        self.0.into_iter().collect()
    }
}

impl<'de> Deserialize<'de> for RawDirectory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawVisitor;

        impl<'de> Visitor<'de> for RawVisitor {
            type Value = RawDirectory;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object mapping user names to options")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawDirectory, A::Error> {
                let mut raw = RawDirectory::default();
                while let Some((name, value)) = map.next_entry::<String, serde_json::Value>()? {
                    raw.insert(name, value);
                }
                Ok(raw)
            }
        }

        deserializer.deserialize_map(RawVisitor)
    }
}

/// Enabled users loaded from a directory file.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    path: PathBuf,
    users: Vec<User>,
}

impl UserDirectory {
    /// Load and validate every enabled user.
    ///
    /// A missing, unreadable or malformed file is logged and treated as an
    /// empty directory, so the door still answers.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUser` if a record is not an object, or if
    /// an enabled record has unknown options or fails validation.
    pub fn load(path: impl AsRef<Path>) -> AuthResult<Self> {
        let path = path.as_ref();
        debug!("Attempting to read users from {}", path.display());

        let raw = match read_raw(path) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Could not load users: {}", e);
                RawDirectory::default()
            }
        };

        let mut users = Vec::new();
        for (name, value) in raw.0 {
            let activation = Activation::deserialize(&value)
                .map_err(|e| AuthError::invalid_user(&name, e.to_string()))?;
            if !activation.is_enabled() {
                debug!("Skipping disabled user {}", name);
                continue;
            }
            let options = UserOptions::deserialize(&value)
                .map_err(|e| AuthError::invalid_user(&name, e.to_string()))?;
            debug!("Loading user {} from {}", name, path.display());
            users.push(User::from_options(&name, &options)?);
        }

        Ok(Self {
            path: path.to_path_buf(),
            users,
        })
    }

    /// Add or replace a user and rewrite the file.
    ///
    /// A fresh random salt is generated. With `store_hash` the file keeps
    /// only the digest, otherwise the plaintext password is stored next to
    /// the salt.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidPassword` if the password has non-keypad
    ///   characters
    /// - `AuthError::Directory` if the existing file is not valid JSON
    /// - `AuthError::Io` if the file cannot be written
    pub fn enroll(
        path: impl AsRef<Path>,
        name: &str,
        password: &str,
        store_hash: bool,
    ) -> AuthResult<User> {
        let path = path.as_ref();
        let digits = encode_as_digits(password)?;
        if digits.is_empty() {
            return Err(AuthError::invalid_user(name, "Password must be non-empty."));
        }

        let mut raw = match read_raw(path) {
            Ok(raw) => raw,
            Err(AuthError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                RawDirectory::default()
            }
            Err(e) => return Err(e),
        }
        .into_sorted();

        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);

        let mut options = UserOptions {
            salt: Some(hex::encode(salt)),
            ..UserOptions::default()
        };
        if store_hash {
            options.hash = Some(hex::encode(salted_digest(&salt, &digits)));
        } else {
            options.pass = Some(password.to_string());
        }

        let user = User::from_options(name, &options)?;
        let value = serde_json::to_value(&options).map_err(|source| AuthError::Directory {
            path: path.to_path_buf(),
            source,
        })?;
        raw.insert(name.to_string(), value);

        write_raw(path, &raw)?;
        info!("Enrolled user {} in {}", name, path.display());
        Ok(user)
    }

    /// First user whose password matches the caller's code.
    pub fn authenticate(&self, code: &str) -> Option<&User> {
        authenticate(code, &self.users)
    }

    pub fn find(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|user| user.name() == name)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Match a caller's code against `users`.
///
/// Letters in the code are encoded like passwords; codes that cannot be
/// encoded match nobody.
pub fn authenticate<'a>(code: &str, users: &'a [User]) -> Option<&'a User> {
    let digits = encode_as_digits(code).ok()?;
    users.iter().find(|user| user.check_digits(&digits))
}

fn read_raw(path: &Path) -> AuthResult<RawDirectory> {
    let text = fs::read_to_string(path).map_err(|e| AuthError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| AuthError::Directory {
        path: path.to_path_buf(),
        source,
    })
}

fn write_raw(path: &Path, raw: &BTreeMap<String, Value>) -> AuthResult<()> {
    let mut text = serde_json::to_string_pretty(raw).map_err(|source| AuthError::Directory {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');
    fs::write(path, text).map_err(|e| AuthError::io(path, e))
}
