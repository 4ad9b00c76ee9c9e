//! Authentication for the Doorvim door answering machine.
//!
//! Two independent ways to let a caller in:
//!
//! - [`CapabilityToken`] - a time-windowed, single-use marker file an
//!   administrator creates from a shell session before calling the door.
//! - [`UserDirectory`] - known users with keypad passwords, matched against
//!   the code a caller typed on the phone.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use doorvim_auth::{CapabilityToken, UserDirectory};
//!
//! # fn example() -> Result<(), doorvim_auth::AuthError> {
//! let token = CapabilityToken::new("/home/door/doorvim/.auth");
//! token.authorize(Duration::from_secs(120))?;
//! assert!(token.check_and_consume()?.is_authorized());
//! assert!(!token.check_and_consume()?.is_authorized());
//!
//! let users = UserDirectory::load("users.json")?;
//! if let Some(user) = users.authenticate("4242") {
//!     println!("recognized {}", user.name());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! Codes are compared as salted SHA-256 digests in constant time via the
//! `subtle` crate. A token is removed before its expiry is judged, so two
//! concurrent checks can never both succeed.

pub mod directory;
pub mod error;
pub mod keypad;
pub mod models;
pub mod token;

pub use directory::{UserDirectory, authenticate};
pub use error::{AuthError, AuthResult};
pub use keypad::encode_as_digits;
pub use models::{Toggle, User, UserOptions};
pub use token::{CapabilityToken, TokenDecision};
