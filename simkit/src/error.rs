use std::fmt::{self, Display};

/// Result returning Error
pub type Result<T> = std::result::Result<T, Error>;

/// Simulator errors. Everything except `Internal` is caused by the caller's
/// input; `Internal` means a simulator invariant broke and the run was aborted.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    UnknownPolicy(String),
    MalformedToken { token: String, expected: &'static str },
    Underflow(String),
    InvalidInput(String),
    Internal(String),
    Config(String),
    Io(String),
}

impl Error {
    /// Shorthand for a token that failed to parse.
    pub fn malformed(token: &str, expected: &'static str) -> Self {
        Error::MalformedToken { token: token.to_string(), expected }
    }

    /// True for programming errors, false for input or environment errors.
    pub fn is_defect(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownPolicy(name) => write!(f, "unknown policy: {}", name),
            Error::MalformedToken { token, expected } => {
                write!(f, "malformed token {:?}: expected {}", token, expected)
            }
            Error::Underflow(s) => write!(f, "incomplete input: {}", s),
            Error::InvalidInput(s) => write!(f, "invalid input: {}", s),
            Error::Internal(s) => write!(f, "internal error: {}", s),
            Error::Config(s) => write!(f, "config error: {}", s),
            Error::Io(s) => write!(f, "io error: {}", s),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Error::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_internal_is_a_defect() {
        assert!(Error::Internal("queue empty".into()).is_defect());
        assert!(!Error::UnknownPolicy("XYZ".into()).is_defect());
        assert!(!Error::malformed("4x", "an integer").is_defect());
    }

    #[test]
    fn malformed_token_names_the_token() {
        let err = Error::malformed("12a", "an integer");
        assert_eq!(err.to_string(), "malformed token \"12a\": expected an integer");
    }
}
