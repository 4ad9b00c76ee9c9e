use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Wire format errors
    #[error("Line exceeds maximum length of {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("Line is not valid ASCII: {0:?}")]
    NonAscii(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid argument for {verb}: {reason}")]
    InvalidArgument { verb: String, reason: String },

    // Keypad errors
    #[error("Invalid DTMF key: {0:?}")]
    InvalidKey(char),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid argument error for the given verb.
    pub fn invalid_argument(verb: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            verb: verb.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let error = Error::invalid_argument("PLAY", "path contains a line break");
        assert_eq!(
            error.to_string(),
            "Invalid argument for PLAY: path contains a line break"
        );
    }

    #[test]
    fn test_line_too_long_display() {
        let error = Error::LineTooLong { limit: 1024 };
        assert_eq!(
            error.to_string(),
            "Line exceeds maximum length of 1024 bytes"
        );
    }
}
