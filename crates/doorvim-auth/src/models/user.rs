use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::UserOptions;
use crate::error::{AuthError, AuthResult};
use crate::keypad::encode_as_digits;

/// Size of a SHA-256 digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// A known user who may open the door with a keypad code.
///
/// Only the salted digest of the code is kept in memory, whether the record
/// stored a plaintext password or a hash.
///
/// # Examples
///
/// ```
/// use doorvim_auth::{User, UserOptions};
///
/// let options = UserOptions {
///     pass: Some("door".to_string()),
///     greeting: Some("sounds/hello.pcm".to_string()),
///     ..UserOptions::default()
/// };
/// let user = User::from_options("alice", &options).unwrap();
///
/// assert!(user.check_digits("3667"));
/// assert!(!user.check_digits("3668"));
/// assert_eq!(user.greeting(), Some("sounds/hello.pcm"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    name: String,
    greeting: Option<String>,
    salt: Vec<u8>,
    digest: [u8; DIGEST_LEN],
}

impl User {
    /// Validate a stored record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUser` when not exactly one of `hash` and
    /// `pass` is given, the password has non-keypad characters, or the hash
    /// or salt are not valid hex of the right length.
    pub fn from_options(name: &str, options: &UserOptions) -> AuthResult<Self> {
        let hash = options.hash.as_deref().map(str::trim).unwrap_or_default();
        let pass = options.pass.as_deref().map(str::trim).unwrap_or_default();
        let salt_hex = options.salt.as_deref().map(str::trim).unwrap_or_default();

        let salt = hex::decode(salt_hex)
            .map_err(|e| AuthError::invalid_user(name, format!("Salt must be hex-encoded ({e}).")))?;

        let digest = match (pass.is_empty(), hash.is_empty()) {
            (false, true) => {
                let digits = encode_as_digits(pass).map_err(|_| {
                    AuthError::invalid_user(
                        name,
                        "Password must consist of only letters and numbers.",
                    )
                })?;
                salted_digest(&salt, &digits)
            }
            (true, false) => parse_digest(name, hash)?,
            _ => {
                return Err(AuthError::invalid_user(
                    name,
                    "Exactly one of {hash, pass} must be specified.",
                ));
            }
        };

        Ok(Self {
            name: name.to_string(),
            greeting: options.greeting.clone().filter(|g| !g.is_empty()),
            salt,
            digest,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn greeting(&self) -> Option<&str> {
        self.greeting.as_deref()
    }

    pub fn salt_hex(&self) -> String {
        hex::encode(&self.salt)
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Check keypad digits against the stored digest.
    ///
    /// # Security
    ///
    /// The digest comparison is constant-time via the `subtle` crate.
    pub fn check_digits(&self, digits: &str) -> bool {
        let candidate = salted_digest(&self.salt, digits);
        candidate[..].ct_eq(&self.digest[..]).into()
    }
}

/// SHA-256 over the salt followed by the digits.
pub(crate) fn salted_digest(salt: &[u8], digits: &str) -> [u8; DIGEST_LEN] {
    Sha256::new()
        .chain_update(salt)
        .chain_update(digits.as_bytes())
        .finalize()
        .into()
}

fn parse_digest(name: &str, hash: &str) -> AuthResult<[u8; DIGEST_LEN]> {
    let bytes = hex::decode(hash).map_err(|_| {
        AuthError::invalid_user(
            name,
            format!("Hash must be exactly {DIGEST_LEN} hex-encoded bytes (not hex)."),
        )
    })?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        AuthError::invalid_user(
            name,
            format!("Hash must be exactly {DIGEST_LEN} hex-encoded bytes (got {len})."),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn options(json: &str) -> UserOptions {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_hash_and_pass_agree() {
        let salt = "00112233445566778899aabbccddeeff";
        let digest = hex::encode(salted_digest(&hex::decode(salt).unwrap(), "4242"));

        let by_pass = User::from_options("a", &options(&format!(
            r#"{{"pass": "gaga", "salt": "{salt}"}}"#
        )))
        .unwrap();
        let by_hash = User::from_options("a", &options(&format!(
            r#"{{"hash": "{digest}", "salt": "{salt}"}}"#
        )))
        .unwrap();

        assert_eq!(by_pass.digest_hex(), by_hash.digest_hex());
        assert!(by_hash.check_digits("4242"));
        assert!(!by_hash.check_digits("4243"));
    }

    #[test]
    fn test_unsalted_password() {
        let user = User::from_options("bob", &options(r#"{"pass": " 1234 "}"#)).unwrap();
        assert!(user.check_digits("1234"));
        assert_eq!(user.salt_hex(), "");
    }

    #[rstest]
    #[case(r#"{}"#, "Exactly one of {hash, pass}")]
    #[case(r#"{"pass": "   "}"#, "Exactly one of {hash, pass}")]
    #[case(r#"{"pass": "1", "hash": "00"}"#, "Exactly one of {hash, pass}")]
    #[case(r#"{"pass": "no way"}"#, "only letters and numbers")]
    #[case(r#"{"hash": "abcd"}"#, "(got 2)")]
    #[case(r#"{"hash": "xyz"}"#, "not hex")]
    #[case(r#"{"pass": "1", "salt": "zz"}"#, "Salt must be hex-encoded")]
    fn test_invalid_records(#[case] json: &str, #[case] message: &str) {
        let err = User::from_options("carol", &options(json)).unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("(In user carol): "), "{text}");
        assert!(text.contains(message), "{text}");
    }

    #[test]
    fn test_empty_greeting_is_none() {
        let user =
            User::from_options("dan", &options(r#"{"pass": "1", "greeting": ""}"#)).unwrap();
        assert_eq!(user.greeting(), None);
    }
}
