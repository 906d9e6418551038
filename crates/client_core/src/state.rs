//! Session-scoped state shared by UI actions and the polling task.

use serde::Serialize;
use shared::domain::VideoId;

use crate::{metadata::VideoMetadataForm, page::PageModel, staging::StagingArea};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    Idle,
    Sending,
    Uploaded,
    Cancelled,
}

/// Everything the controller mutates, behind a single lock so each
/// transition reads and writes it atomically.
#[derive(Debug)]
pub(crate) struct SessionState {
    pub upload_state: UploadState,
    pub cancel_requested: bool,
    /// A cancel request is out; its settlement resets the page unless a new
    /// transmission started meanwhile.
    pub cancel_pending: bool,
    /// Navigation guard: armed only while the browser-side transfer runs.
    pub transmitting: bool,
    pub video_id: Option<VideoId>,
    /// Bumped whenever a polling chain starts or is invalidated.
    pub poll_generation: u64,
    pub poll_failed: bool,
    pub staging: StagingArea,
    pub form: VideoMetadataForm,
    pub page: PageModel,
}

impl SessionState {
    pub fn new(max_file_size: u64) -> Self {
        Self {
            upload_state: UploadState::Idle,
            cancel_requested: false,
            cancel_pending: false,
            transmitting: false,
            video_id: None,
            poll_generation: 0,
            poll_failed: false,
            staging: StagingArea::new(max_file_size),
            form: VideoMetadataForm::default(),
            page: PageModel::default(),
        }
    }

    /// Remote processing is cancellable once the transfer has been acknowledged.
    pub fn processing_active(&self) -> bool {
        self.upload_state == UploadState::Sending && !self.transmitting
    }

    pub fn begin_poll_chain(&mut self) -> u64 {
        self.poll_generation += 1;
        self.poll_failed = false;
        self.poll_generation
    }

    pub fn invalidate_poll_chain(&mut self) {
        self.poll_generation += 1;
    }

    /// Checked before each request and before acting on each response.
    pub fn poll_chain_live(&self, generation: u64) -> bool {
        !self.cancel_requested
            && self.poll_generation == generation
            && self.upload_state == UploadState::Sending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_kills_live_chain() {
        let mut state = SessionState::new(1024);
        state.upload_state = UploadState::Sending;
        let generation = state.begin_poll_chain();
        assert!(state.poll_chain_live(generation));

        state.cancel_requested = true;
        assert!(!state.poll_chain_live(generation));
    }

    #[test]
    fn newer_chain_supersedes_older_one() {
        let mut state = SessionState::new(1024);
        state.upload_state = UploadState::Sending;
        let first = state.begin_poll_chain();
        let second = state.begin_poll_chain();
        assert!(!state.poll_chain_live(first));
        assert!(state.poll_chain_live(second));

        state.invalidate_poll_chain();
        assert!(!state.poll_chain_live(second));
    }

    #[test]
    fn processing_is_not_cancellable_during_transfer() {
        let mut state = SessionState::new(1024);
        state.upload_state = UploadState::Sending;
        state.transmitting = true;
        assert!(!state.processing_active());
        state.transmitting = false;
        assert!(state.processing_active());
    }
}
