use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransferError>;

/// Why a single file upload did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadFailure {
    /// The receiver answered with something other than 200.
    Rejected { status: u16 },
    /// The request never produced a response (connect, reset, timeout,
    /// local read error while streaming).
    Transport(String),
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadFailure::Rejected { status } => {
                write!(f, "receiver responded with status {}", status)
            }
            UploadFailure::Transport(cause) => {
                write!(f, "transport error: {}", cause)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Cannot connect to {address}:{port}. Make sure the device is reachable and accepting connections. {cause}")]
    Unreachable {
        address: String,
        port: u16,
        cause: String,
    },
    #[error("Invalid request body")]
    InvalidRequest,
    #[error("Transfer rejected by receiver")]
    TransferRejected,
    #[error("Unknown error by receiver")]
    ReceiverError,
    #[error("No file transfer needed")]
    NoTransferNeeded,
    #[error("Failed to upload {file_name} (id {file_id}): {failure}")]
    UploadFailed {
        file_id: String,
        file_name: String,
        failure: UploadFailure,
    },
    #[error("Transfer cancelled")]
    Cancelled { file_id: Option<String> },
    #[error("Cannot send an empty list of files")]
    EmptyBatch,
    #[error("HTTP client error: {0}")]
    ClientSetup(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    /// Outcomes a UI should not present as an error.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            TransferError::NoTransferNeeded | TransferError::Cancelled { .. }
        )
    }

    /// Whether restarting the whole batch later has a chance to succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransferError::Unreachable { .. } | TransferError::ReceiverError => {
                true
            }
            TransferError::UploadFailed { failure, .. } => {
                matches!(failure, UploadFailure::Transport(_))
            }
            _ => false,
        }
    }
}
