use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the playlist pipeline.
///
/// Directives without a location and failed liveness probes are not errors:
/// the former are skipped, the latter are reported as [`crate::Status::Bad`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unable to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fetching playlist failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Fetching {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Invalid field key `{0}`, expected `name` or `group-name`")]
    InvalidKey(String),

    #[error("Don't know how to export to {}, use .json, .m3u or .m3u8", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Serializing playlist failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
