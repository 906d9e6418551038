//! Events broadcast by the controller to whatever renders the page.

use serde::Serialize;
use shared::domain::{Percentage, VideoId};

use crate::state::UploadState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ControllerEvent {
    StateChanged {
        from: UploadState,
        to: UploadState,
    },
    NavigationGuard {
        armed: bool,
    },
    TransmissionStarted {
        file_name: String,
        size: u64,
    },
    TransmissionFinished {
        succeeded: bool,
    },
    Progress(Percentage),
    ProcessingComplete,
    PollFailed(String),
    VideoReady(VideoId),
    CancelSettled {
        confirmed: bool,
    },
    NothingToCancel,
    UpdateFinished {
        succeeded: bool,
    },
}

/// Result of a cancel click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelOutcome {
    /// The cancel request was sent; `confirmed` is false when it errored.
    Cancelled { confirmed: bool },
    NothingToCancel,
}
