use std::path::PathBuf;

use thiserror::Error;

/// Top-level error returned from `app::run`, carrying the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the reconcile/align pipeline.
///
/// Only `RegistryLoadFailure` stops a run. Everything else is scoped to one
/// file or one movie and is reported next to that item.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no registry title matches '{label}'")]
    UnmatchedTitle { label: String },

    #[error("malformed export '{}': {reason}", path.display())]
    MalformedExport { path: PathBuf, reason: String },

    #[error("series file not found: {}", path.display())]
    MissingSeriesFile { path: PathBuf },

    #[error("failed to load registry '{}': {reason}", path.display())]
    RegistryLoadFailure { path: PathBuf, reason: String },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PipelineError::MalformedExport {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::RegistryLoadFailure { .. })
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let code = match err {
            PipelineError::Io { .. } => 4,
            _ => 2,
        };
        AppError::new(code, err.to_string())
    }
}
