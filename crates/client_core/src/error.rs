use thiserror::Error;

use crate::state::UploadState;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no file is staged for upload")]
    NothingStaged,
    #[error("file {file_name} is {size} bytes, over the {limit} byte limit")]
    FileTooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },
    #[error("an upload is already in flight for this session")]
    UploadInFlight,
    #[error("the file transfer is still running; cancel becomes available once it is acknowledged")]
    TransmissionInProgress,
    #[error("polling cannot resume while the session is {0:?}")]
    NotPolling(UploadState),
    #[error("transmission failed: {0:#}")]
    Transmission(anyhow::Error),
    #[error("metadata update failed: {0:#}")]
    Update(anyhow::Error),
}
