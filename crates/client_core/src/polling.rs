//! Single-flight progress polling for a session.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{ControllerEvent, UploadSessionController, UploadState};

impl UploadSessionController {
    /// Starts a new polling chain, superseding any previous one.
    pub(crate) async fn start_polling(self: &Arc<Self>) {
        let generation = self.inner.lock().await.begin_poll_chain();
        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move { controller.run_poll_chain(generation).await });
        // A superseded chain sees the new generation and exits on its own.
        let _ = self.poll_task.lock().await.replace(handle);
    }

    async fn run_poll_chain(&self, generation: u64) {
        debug!(session_id = %self.session_id, generation, "poll chain started");
        loop {
            if !self.inner.lock().await.poll_chain_live(generation) {
                debug!(session_id = %self.session_id, generation, "poll chain stopped");
                return;
            }

            let result = self.host.progress(&self.session_id).await;

            let mut inner = self.inner.lock().await;
            if !inner.poll_chain_live(generation) {
                debug!(
                    session_id = %self.session_id,
                    generation,
                    "dropping progress response for a stopped chain"
                );
                return;
            }
            match result {
                Ok(progress) if progress.is_complete() => {
                    inner.page.processing_complete();
                    self.transition(&mut inner, UploadState::Uploaded);
                    self.emit(ControllerEvent::ProcessingComplete);
                    drop(inner);
                    info!(session_id = %self.session_id, "remote processing complete");
                    self.fetch_video_id().await;
                    return;
                }
                Ok(progress) => {
                    debug!(session_id = %self.session_id, progress = progress.value(), "progress");
                    inner.page.set_progress(progress);
                    self.emit(ControllerEvent::Progress(progress));
                }
                Err(err) => {
                    warn!(session_id = %self.session_id, "progress poll failed: {err:#}");
                    inner.poll_failed = true;
                    inner.page.poll_failed();
                    self.emit(ControllerEvent::PollFailed(format!("{err:#}")));
                    return;
                }
            }
            drop(inner);

            if self.settings.poll_interval.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.settings.poll_interval).await;
            }
        }
    }

    async fn fetch_video_id(&self) {
        match self.host.video_id(&self.session_id).await {
            Ok(video_id) => {
                info!(session_id = %self.session_id, %video_id, "video id received");
                let mut inner = self.inner.lock().await;
                inner.video_id = Some(video_id.clone());
                inner.page.attach_video_visible = true;
                self.emit(ControllerEvent::VideoReady(video_id));
            }
            Err(err) => {
                warn!(session_id = %self.session_id, "failed to fetch video id: {err:#}");
            }
        }
    }
}
