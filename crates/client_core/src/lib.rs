use std::{sync::Arc, time::Duration};

use shared::{
    domain::{SessionId, VideoId},
    protocol::embed_url,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{error, info, warn};

pub mod error;
pub mod events;
pub mod metadata;
pub mod page;
mod polling;
pub mod staging;
pub mod state;
pub mod transport;

pub use error::ControllerError;
pub use events::{CancelOutcome, ControllerEvent};
pub use metadata::VideoMetadataForm;
pub use page::PageModel;
pub use staging::{FileSource, StagedFile, DEFAULT_MAX_FILE_SIZE};
pub use state::UploadState;
pub use transport::{HttpVideoHost, MissingVideoHost, VideoHost};

use state::SessionState;

pub const LEAVE_PAGE_WARNING: &str = "The file upload is still going on. If you leave the page now \
     your upload will be cancelled. Are you sure you want to leave the page?";

const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Delay between progress polls; zero polls back-to-back.
    pub poll_interval: Duration,
    pub max_file_size: u64,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::ZERO,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Drives one upload session page: staging, transmission, progress polling,
/// cancellation and metadata updates.
pub struct UploadSessionController {
    session_id: SessionId,
    host: Arc<dyn VideoHost>,
    settings: ControllerSettings,
    inner: Mutex<SessionState>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<ControllerEvent>,
}

impl UploadSessionController {
    pub fn new(session_id: SessionId, host: Arc<dyn VideoHost>) -> Arc<Self> {
        Self::with_settings(session_id, host, ControllerSettings::default())
    }

    pub fn with_settings(
        session_id: SessionId,
        host: Arc<dyn VideoHost>,
        settings: ControllerSettings,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            inner: Mutex::new(SessionState::new(settings.max_file_size)),
            session_id,
            host,
            settings,
            poll_task: Mutex::new(None),
            events,
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> UploadState {
        self.inner.lock().await.upload_state
    }

    pub async fn page(&self) -> PageModel {
        self.inner.lock().await.page.clone()
    }

    pub async fn navigation_guard(&self) -> bool {
        self.inner.lock().await.transmitting
    }

    /// Text for the unload confirmation prompt, present only while a transfer runs.
    pub async fn leave_page_warning(&self) -> Option<&'static str> {
        self.navigation_guard().await.then_some(LEAVE_PAGE_WARNING)
    }

    pub async fn video_id(&self) -> Option<VideoId> {
        self.inner.lock().await.video_id.clone()
    }

    pub async fn form(&self) -> VideoMetadataForm {
        self.inner.lock().await.form.clone()
    }

    pub async fn set_form(&self, form: VideoMetadataForm) {
        self.inner.lock().await.form = form;
    }

    pub async fn staged_file_name(&self) -> Option<String> {
        self.inner
            .lock()
            .await
            .staging
            .staged()
            .map(|file| file.file_name().to_string())
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }

    fn transition(&self, inner: &mut SessionState, to: UploadState) {
        let from = inner.upload_state;
        if from == to {
            return;
        }
        inner.upload_state = to;
        info!(session_id = %self.session_id, ?from, ?to, "upload state changed");
        self.emit(ControllerEvent::StateChanged { from, to });
    }

    /// Page-load resync: if the server already reports progress for this
    /// session, show the progress view and follow it instead of starting idle.
    pub async fn load(self: &Arc<Self>) -> UploadState {
        let probe = self.host.progress(&self.session_id).await;
        {
            let mut inner = self.inner.lock().await;
            if inner.upload_state != UploadState::Idle {
                return inner.upload_state;
            }
            match probe {
                Ok(progress) => {
                    info!(
                        session_id = %self.session_id,
                        progress = progress.value(),
                        "resuming existing upload"
                    );
                    inner.page.show_processing();
                    self.transition(&mut inner, UploadState::Sending);
                }
                Err(err) => {
                    info!(session_id = %self.session_id, "no upload in flight: {err:#}");
                    return inner.upload_state;
                }
            }
        }
        self.start_polling().await;
        self.state().await
    }

    pub async fn stage_file(&self, file: StagedFile) -> Result<(), ControllerError> {
        let mut inner = self.inner.lock().await;
        if inner.upload_state == UploadState::Sending {
            return Err(ControllerError::UploadInFlight);
        }
        inner.staging.stage(file)?;
        Ok(())
    }

    /// The explicit upload click. Resolves once the transfer is acknowledged
    /// (or fails); processing progress continues on the polling task.
    pub async fn commit_upload(self: &Arc<Self>) -> Result<(), ControllerError> {
        let (file, form) = {
            let mut inner = self.inner.lock().await;
            if inner.upload_state == UploadState::Sending {
                return Err(ControllerError::UploadInFlight);
            }
            let file = inner
                .staging
                .take()
                .ok_or(ControllerError::NothingStaged)?;
            let form = inner.form.clone();
            inner.cancel_pending = false;
            inner.transmitting = true;
            inner.page.transmission_started();
            self.transition(&mut inner, UploadState::Sending);
            self.emit(ControllerEvent::NavigationGuard { armed: true });
            self.emit(ControllerEvent::TransmissionStarted {
                file_name: file.file_name().to_string(),
                size: file.size(),
            });
            (file, form)
        };

        info!(
            session_id = %self.session_id,
            file_name = file.file_name(),
            size = file.size(),
            "transmitting file"
        );
        let result = self.host.upload(&self.session_id, &file, &form).await;

        {
            let mut inner = self.inner.lock().await;
            inner.transmitting = false;
            inner.page.transmission_completed();
            self.emit(ControllerEvent::NavigationGuard { armed: false });
            match result {
                Ok(()) => {
                    info!(session_id = %self.session_id, "transmission acknowledged");
                    inner.cancel_requested = false;
                    inner.page.show_processing();
                    self.emit(ControllerEvent::TransmissionFinished { succeeded: true });
                }
                Err(err) => {
                    error!(session_id = %self.session_id, "transmission failed: {err:#}");
                    inner.page.transmission_failed();
                    inner.staging.restore(file);
                    self.transition(&mut inner, UploadState::Idle);
                    self.emit(ControllerEvent::TransmissionFinished { succeeded: false });
                    return Err(ControllerError::Transmission(err));
                }
            }
        }

        self.start_polling().await;
        Ok(())
    }

    /// Best-effort cancel: the page returns to "ready to retry" whether or
    /// not the server confirms.
    pub async fn cancel(self: &Arc<Self>) -> Result<CancelOutcome, ControllerError> {
        {
            let mut inner = self.inner.lock().await;
            if inner.upload_state == UploadState::Sending && inner.transmitting {
                return Err(ControllerError::TransmissionInProgress);
            }
            if !inner.processing_active() {
                info!(session_id = %self.session_id, "cancel requested with nothing in flight");
                inner.page.nothing_to_cancel();
                // A finished upload keeps its state; a settled cancel returns to Idle.
                if inner.upload_state == UploadState::Cancelled {
                    self.transition(&mut inner, UploadState::Idle);
                }
                self.emit(ControllerEvent::NothingToCancel);
                return Ok(CancelOutcome::NothingToCancel);
            }
            inner.cancel_requested = true;
            inner.cancel_pending = true;
            inner.invalidate_poll_chain();
            inner.page.upload_success_visible = false;
            self.transition(&mut inner, UploadState::Cancelled);
        }

        let confirmed = match self.host.cancel(&self.session_id).await {
            Ok(()) => {
                info!(session_id = %self.session_id, "cancel acknowledged");
                true
            }
            Err(err) => {
                warn!(session_id = %self.session_id, "cancel request failed: {err:#}");
                false
            }
        };

        let mut inner = self.inner.lock().await;
        if std::mem::take(&mut inner.cancel_pending) {
            inner.page.reset_after_cancel();
        }
        self.emit(ControllerEvent::CancelSettled { confirmed });
        Ok(CancelOutcome::Cancelled { confirmed })
    }

    /// User-initiated restart of a polling chain that stopped on an error.
    pub async fn resume_polling(self: &Arc<Self>) -> Result<(), ControllerError> {
        {
            let mut inner = self.inner.lock().await;
            if !inner.processing_active() {
                return Err(ControllerError::NotPolling(inner.upload_state));
            }
            if !inner.poll_failed {
                return Ok(());
            }
            inner.page.poll_failure_visible = false;
        }
        info!(session_id = %self.session_id, "resuming progress polling");
        self.start_polling().await;
        Ok(())
    }

    pub async fn update_metadata(&self) -> Result<(), ControllerError> {
        let metadata = {
            let mut inner = self.inner.lock().await;
            inner.page.clear_update_messages();
            inner.form.to_metadata()
        };

        let result = self.host.update(&self.session_id, &metadata).await;

        let mut inner = self.inner.lock().await;
        inner.page.update_finished(result.is_ok());
        self.emit(ControllerEvent::UpdateFinished {
            succeeded: result.is_ok(),
        });
        match result {
            Ok(()) => {
                info!(session_id = %self.session_id, "metadata updated");
                Ok(())
            }
            Err(err) => {
                warn!(session_id = %self.session_id, "metadata update failed: {err:#}");
                Err(ControllerError::Update(err))
            }
        }
    }

    /// Writes the embeddable URL of the finished video into the page's URL field.
    pub async fn attach_video_link(&self) -> Option<String> {
        let mut inner = self.inner.lock().await;
        let url = embed_url(inner.video_id.as_ref()?);
        inner.page.video_url_field = Some(url.clone());
        Some(url)
    }

    /// Waits for the current polling chain, including any chain started while waiting.
    pub async fn wait_for_polling(&self) {
        loop {
            let handle = self.poll_task.lock().await.take();
            let Some(handle) = handle else {
                return;
            };
            if let Err(err) = handle.await {
                error!(session_id = %self.session_id, "polling task failed: {err}");
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
