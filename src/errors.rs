use thiserror::Error;

/// Main crate error type
#[derive(Error, Debug)]
pub enum Error {
    /// Construction parameters rejected by validation
    #[error("Invalid {component} config: {reason}")]
    InvalidConfig {
        component: &'static str,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed tick or sweep CSV data
    #[error("CSV error: {0}")]
    Csv(String),

    /// TOML parse or serialize failure
    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown trade side: {0:?}")]
    UnknownSide(String),
}

impl Error {
    pub(crate) fn invalid_config(component: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            component,
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
