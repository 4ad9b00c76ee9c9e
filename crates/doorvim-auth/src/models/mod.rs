pub mod options;
pub mod user;

pub use options::{Activation, Toggle, UserOptions};
pub use user::User;
