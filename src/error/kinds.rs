use std::{fmt, io};

/// Crate-wide `Result` type using [`LookupError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, LookupError>;

/// Top-level error type for typeahead operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum LookupError {
    /// Remote page source errors.
    Source(SourceError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// JSON encoding or decoding errors.
    Json(serde_json::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Errors reported by a [`crate::source::PageSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The request reached the source but failed.
    RequestFailed(String),

    /// The source is not reachable.
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Named lookup is not defined.
    UnknownLookup(String),

    /// Generic configuration error.
    Generic(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Source(e) => write!(f, "Source error: {e}"),
            LookupError::Config(e) => write!(f, "Configuration error: {e}"),
            LookupError::Io(e) => write!(f, "I/O error: {e}"),
            LookupError::Json(e) => write!(f, "JSON error: {e}"),
            LookupError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::RequestFailed(msg) => write!(f, "Request failed: {msg}"),
            SourceError::Unavailable(msg) => write!(f, "Source unavailable: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::UnknownLookup(name) => write!(f, "Lookup not defined: {name}"),
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for LookupError {}
impl std::error::Error for SourceError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to LookupError ========================= */

impl From<io::Error> for LookupError {
    fn from(err: io::Error) -> Self {
        LookupError::Io(err)
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        LookupError::Json(err)
    }
}

impl From<SourceError> for LookupError {
    fn from(err: SourceError) -> Self {
        LookupError::Source(err)
    }
}

impl From<ConfigError> for LookupError {
    fn from(err: ConfigError) -> Self {
        LookupError::Config(err)
    }
}

impl From<toml::de::Error> for LookupError {
    fn from(err: toml::de::Error) -> Self {
        LookupError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for LookupError {
    fn from(err: toml::ser::Error) -> Self {
        LookupError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err: LookupError = SourceError::RequestFailed("timeout".to_string()).into();
        assert_eq!(err.to_string(), "Source error: Request failed: timeout");
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let parse = toml::from_str::<toml::Table>("= nope").unwrap_err();
        let err = LookupError::from(parse);
        assert!(matches!(err, LookupError::Config(ConfigError::InvalidFormat(_))));
    }
}
