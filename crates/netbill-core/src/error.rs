use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetbillError {
    #[error("Invalid argument: {field} — {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Unknown scenario: track '{track}' has no variant '{name}'")]
    Lookup { track: String, name: String },

    #[error("Configuration error in {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl NetbillError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        NetbillError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn lookup(track: &str, name: &str) -> Self {
        NetbillError::Lookup {
            track: track.into(),
            name: name.into(),
        }
    }
}

impl From<serde_json::Error> for NetbillError {
    fn from(e: serde_json::Error) -> Self {
        NetbillError::Serialization(e.to_string())
    }
}
