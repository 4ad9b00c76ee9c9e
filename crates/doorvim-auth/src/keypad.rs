//! Letters to telephone keypad digits.
//!
//! Passwords may be written as words; callers type them on a phone where
//! each digit key carries three or four letters:
//!
//! ```text
//! 2 ABC   3 DEF   4 GHI   5 JKL
//! 6 MNO   7 PQRS  8 TUV   9 WXYZ
//! ```

use crate::error::{AuthError, AuthResult};

/// Keypad digit for one character, case-insensitive.
fn keypad_digit(c: char) -> Option<char> {
    let digit = match c.to_ascii_uppercase() {
        d @ '0'..='9' => d,
        'A'..='C' => '2',
        'D'..='F' => '3',
        'G'..='I' => '4',
        'J'..='L' => '5',
        'M'..='O' => '6',
        'P'..='S' => '7',
        'T'..='V' => '8',
        'W'..='Z' => '9',
        _ => return None,
    };
    Some(digit)
}

/// Encode a password as the digits a caller would type.
///
/// Idempotent: digit strings encode to themselves.
///
/// # Errors
///
/// Returns `AuthError::InvalidPassword` for the first character that is not
/// an ASCII letter or digit.
///
/// # Examples
///
/// ```
/// use doorvim_auth::encode_as_digits;
///
/// assert_eq!(encode_as_digits("Door").unwrap(), "3667");
/// assert_eq!(encode_as_digits("3667").unwrap(), "3667");
/// assert!(encode_as_digits("#9").is_err());
/// ```
pub fn encode_as_digits(plain: &str) -> AuthResult<String> {
    plain
        .chars()
        .map(|c| keypad_digit(c).ok_or(AuthError::InvalidPassword(c)))
        .collect()
}
