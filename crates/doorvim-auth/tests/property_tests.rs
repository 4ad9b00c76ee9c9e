//! Property-based tests for keypad encoding and code matching.

use proptest::prelude::*;

use doorvim_auth::{User, UserOptions, authenticate, encode_as_digits};

/// Strategy for passwords users may choose.
fn password() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9A-Za-z]{1,16}")
        .expect("Failed to create password regex strategy")
}

proptest! {
    /// Property: encoding is idempotent and yields only digits.
    #[test]
    fn prop_encoding_is_idempotent(plain in password()) {
        let digits = encode_as_digits(&plain).unwrap();
        prop_assert_eq!(digits.len(), plain.len());
        prop_assert!(digits.chars().all(|c| c.is_ascii_digit()));
        prop_assert_eq!(encode_as_digits(&digits).unwrap(), digits);
    }

    /// Property: a user is matched by the password itself and by its digits.
    #[test]
    fn prop_user_matches_own_password(plain in password(), salt in prop::collection::vec(any::<u8>(), 0..16)) {
        let options = UserOptions {
            pass: Some(plain.clone()),
            salt: Some(hex::encode(&salt)),
            ..UserOptions::default()
        };
        let users = vec![User::from_options("u", &options).unwrap()];

        prop_assert!(authenticate(&plain, &users).is_some());
        prop_assert!(authenticate(&plain.to_lowercase(), &users).is_some());
        let digits = encode_as_digits(&plain).unwrap();
        prop_assert!(authenticate(&digits, &users).is_some());
        let longer = format!("{digits}0");
        prop_assert!(authenticate(&longer, &users).is_none());
    }
}
