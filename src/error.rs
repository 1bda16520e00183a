use std::path::PathBuf;

/// Errors surfaced by the credential store.
///
/// Filesystem variants carry the path and the operation that failed so the
/// CLI can print them verbatim.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{var} is not set")]
    KeyMissing { var: String },

    #[error("{var} must be exactly 32 bytes, got {len}")]
    InvalidKeyLength { var: String, len: usize },

    #[error("Failed to open sealed password: authentication failed")]
    AuthenticationFailure,

    #[error("Failed to seal password")]
    SealFailure,

    #[error("Connection {name:?} does not exist, run `psqlcm ls`")]
    NotFound { name: String },

    #[error("Current connection points at {name:?}, which no longer exists")]
    DanglingCurrentPointer { name: String },

    #[error("Malformed connection record {}: {reason}", path.display())]
    MalformedRecord { path: PathBuf, reason: String },

    #[error("Failed to create store directory {}", path.display())]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid connection name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Failed to {op} {}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// True for the plain "profile is absent" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
