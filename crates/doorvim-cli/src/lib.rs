//! Door host program: configuration, administrative commands and the call
//! flow that ties the voice session to the authentication paths.

pub mod admin;
pub mod answer;
pub mod config;

pub use answer::{CallOutcome, answer_call};
pub use config::{ConfigError, DoorvimConfig, load_config};
