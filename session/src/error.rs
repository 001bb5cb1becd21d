use thiserror::Error;

/// Errors returned when loading a mode table from disk.
///
/// Resolution itself ([`crate::ModeTable::resolve`]) raises nothing — only
/// table construction can fail.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session: read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session: parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("session: unsupported table extension: {0}")]
    UnsupportedExtension(String),

    #[error("session: table has no profile for its default mode {0:?}")]
    MissingDefault(String),

    #[error("session: table has no modes")]
    Empty,
}
