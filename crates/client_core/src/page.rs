//! View-model of the upload page: which affordances are visible and what the
//! progress bar and video-URL field currently show.

use serde::Serialize;
use shared::domain::Percentage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageModel {
    pub staging_widget_visible: bool,
    pub upload_button_visible: bool,
    pub progress_visible: bool,
    pub progress: Percentage,
    pub cancel_button_visible: bool,
    pub upload_success_visible: bool,
    pub upload_failure_visible: bool,
    pub cancel_message_visible: bool,
    pub nothing_to_cancel_visible: bool,
    pub poll_failure_visible: bool,
    pub update_success_visible: bool,
    pub update_failure_visible: bool,
    pub attach_video_visible: bool,
    pub video_url_field: Option<String>,
}

impl Default for PageModel {
    fn default() -> Self {
        Self {
            staging_widget_visible: true,
            upload_button_visible: true,
            progress_visible: false,
            progress: Percentage::ZERO,
            cancel_button_visible: false,
            upload_success_visible: false,
            upload_failure_visible: false,
            cancel_message_visible: false,
            nothing_to_cancel_visible: false,
            poll_failure_visible: false,
            update_success_visible: false,
            update_failure_visible: false,
            attach_video_visible: false,
            video_url_field: None,
        }
    }
}

impl PageModel {
    pub fn progress_text(&self) -> String {
        self.progress.to_string()
    }

    pub(crate) fn transmission_started(&mut self) {
        self.upload_button_visible = false;
        self.upload_failure_visible = false;
        self.nothing_to_cancel_visible = false;
    }

    pub(crate) fn transmission_completed(&mut self) {
        self.cancel_message_visible = false;
    }

    /// Progress UI shown after the transfer is acknowledged or on resync.
    pub(crate) fn show_processing(&mut self) {
        self.upload_success_visible = false;
        self.nothing_to_cancel_visible = false;
        self.cancel_message_visible = false;
        self.poll_failure_visible = false;
        self.progress_visible = true;
        self.cancel_button_visible = true;
        self.staging_widget_visible = false;
    }

    pub(crate) fn transmission_failed(&mut self) {
        self.upload_failure_visible = true;
        self.staging_widget_visible = true;
        self.upload_button_visible = true;
    }

    pub(crate) fn set_progress(&mut self, progress: Percentage) {
        self.progress = progress;
    }

    pub(crate) fn processing_complete(&mut self) {
        self.upload_success_visible = true;
        self.progress_visible = false;
        self.progress = Percentage::ZERO;
        self.staging_widget_visible = true;
        self.upload_button_visible = true;
        self.cancel_button_visible = false;
    }

    pub(crate) fn poll_failed(&mut self) {
        self.poll_failure_visible = true;
    }

    /// Applied once the cancel request settles, whatever its outcome.
    pub(crate) fn reset_after_cancel(&mut self) {
        self.upload_success_visible = false;
        self.upload_failure_visible = false;
        self.poll_failure_visible = false;
        self.progress_visible = false;
        self.progress = Percentage::ZERO;
        self.cancel_message_visible = true;
        self.nothing_to_cancel_visible = false;
        self.staging_widget_visible = true;
        self.cancel_button_visible = false;
        self.upload_button_visible = true;
    }

    pub(crate) fn nothing_to_cancel(&mut self) {
        self.upload_success_visible = false;
        self.cancel_message_visible = false;
        self.nothing_to_cancel_visible = true;
    }

    pub(crate) fn clear_update_messages(&mut self) {
        self.update_success_visible = false;
        self.update_failure_visible = false;
    }

    pub(crate) fn update_finished(&mut self, succeeded: bool) {
        self.update_success_visible = succeeded;
        self.update_failure_visible = !succeeded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_page_offers_only_staging() {
        let page = PageModel::default();
        assert!(page.staging_widget_visible);
        assert!(page.upload_button_visible);
        assert!(!page.cancel_button_visible);
        assert!(!page.upload_success_visible);
        assert_eq!(page.progress_text(), "0%");
    }

    #[test]
    fn completion_resets_bar_and_hides_cancel() {
        let mut page = PageModel::default();
        page.show_processing();
        page.set_progress(Percentage::new(80).expect("pct"));
        page.processing_complete();
        assert!(page.upload_success_visible);
        assert!(!page.progress_visible);
        assert!(!page.cancel_button_visible);
        assert_eq!(page.progress_text(), "0%");
    }

    #[test]
    fn cancel_settlement_replaces_nothing_to_cancel() {
        let mut page = PageModel::default();
        page.show_processing();
        page.nothing_to_cancel();
        page.reset_after_cancel();
        assert!(page.cancel_message_visible);
        assert!(!page.nothing_to_cancel_visible);
        assert!(!page.progress_visible);
    }

    #[test]
    fn update_messages_are_exclusive() {
        let mut page = PageModel::default();
        page.update_finished(true);
        page.update_finished(false);
        assert!(!page.update_success_visible);
        assert!(page.update_failure_visible);
        page.clear_update_messages();
        assert!(!page.update_success_visible && !page.update_failure_visible);
    }
}
