use std::path::PathBuf;
use thiserror::Error;

/// Core errors for the sensor monitor
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unparseable value {value:?} in {}", path.display())]
    Parse { path: PathBuf, value: String },

    #[error("GPU query failed: {0}")]
    Query(String),

    #[error("GPU vendor tool unavailable: {0}")]
    CapabilityAbsent(String),

    #[error("Command error: {0}")]
    Command(String),

    #[error("Sampling loop error: {0}")]
    Sampling(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "linux_procfs")]
    #[error("Procfs error: {0}")]
    Procfs(#[from] procfs::ProcError),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn read<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn parse<P: Into<PathBuf>, S: Into<String>>(path: P, value: S) -> Self {
        Self::Parse {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn query<S: Into<String>>(msg: S) -> Self {
        Self::Query(msg.into())
    }

    pub fn capability_absent<S: Into<String>>(msg: S) -> Self {
        Self::CapabilityAbsent(msg.into())
    }

    pub fn command<S: Into<String>>(msg: S) -> Self {
        Self::Command(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// True for per-sensor read failures (missing file or non-numeric text)
    pub fn is_read_failure(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Parse { .. })
    }
}
