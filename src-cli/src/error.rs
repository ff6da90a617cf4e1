//! Error type for the terminal front-end

use studio_engine::StudioError;
use studio_store::StoreError;
use studio_upload::UploadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Studio(#[from] StudioError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad command line
    #[error("{0}")]
    Usage(String),
}
