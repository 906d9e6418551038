//! Terminal rendering of controller events.

use client_core::{ControllerEvent, PageModel, UploadState};
use tokio::sync::broadcast::{self, error::RecvError};

pub fn describe(event: &ControllerEvent) -> String {
    match event {
        ControllerEvent::StateChanged { from, to } => format!("state: {from:?} -> {to:?}"),
        ControllerEvent::NavigationGuard { armed: true } => {
            "transfer running; keep this process open".to_string()
        }
        ControllerEvent::NavigationGuard { armed: false } => "transfer finished".to_string(),
        ControllerEvent::TransmissionStarted { file_name, size } => {
            format!("uploading {file_name} ({size} bytes)")
        }
        ControllerEvent::TransmissionFinished { succeeded: true } => {
            "file received by server; processing".to_string()
        }
        ControllerEvent::TransmissionFinished { succeeded: false } => {
            "upload failed; fix the problem and run the upload again".to_string()
        }
        ControllerEvent::Progress(progress) => format!("processing: {progress}"),
        ControllerEvent::ProcessingComplete => "video uploaded successfully".to_string(),
        ControllerEvent::PollFailed(reason) => format!("lost track of processing: {reason}"),
        ControllerEvent::VideoReady(video_id) => format!("video id: {video_id}"),
        ControllerEvent::CancelSettled { confirmed: true } => "upload cancelled".to_string(),
        ControllerEvent::CancelSettled { confirmed: false } => {
            "upload cancelled locally; the server did not confirm".to_string()
        }
        ControllerEvent::NothingToCancel => "there is no upload to cancel".to_string(),
        ControllerEvent::UpdateFinished { succeeded: true } => {
            "video details updated".to_string()
        }
        ControllerEvent::UpdateFinished { succeeded: false } => {
            "video details could not be updated".to_string()
        }
    }
}

/// Prints events until the controller is dropped.
pub async fn render_events(mut events: broadcast::Receiver<ControllerEvent>, json: bool) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if json {
                    match serde_json::to_string(&event) {
                        Ok(line) => println!("{line}"),
                        Err(err) => tracing::warn!("failed to encode event: {err}"),
                    }
                } else {
                    println!("{}", describe(&event));
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "renderer lagged behind controller events");
            }
            Err(RecvError::Closed) => return,
        }
    }
}

pub fn summary(state: UploadState, page: &PageModel) -> String {
    let mut lines = vec![format!("session state: {state:?}")];
    if page.progress_visible {
        lines.push(format!("progress: {}", page.progress_text()));
    }
    if page.poll_failure_visible {
        lines.push("progress polling stopped; run `uploader status` to resume".to_string());
    }
    if let Some(url) = &page.video_url_field {
        lines.push(format!("embed url: {url}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::Percentage;

    #[test]
    fn progress_is_described_with_percent_text() {
        let event = ControllerEvent::Progress(Percentage::new(45).expect("pct"));
        assert_eq!(describe(&event), "processing: 45%");
    }

    #[test]
    fn summary_lists_embed_url_and_poll_failure() {
        let mut page = PageModel::default();
        page.poll_failure_visible = true;
        page.video_url_field = Some("www.youtube.com/embed/abc".to_string());
        let text = summary(UploadState::Uploaded, &page);
        assert!(text.contains("Uploaded"));
        assert!(text.contains("uploader status"));
        assert!(text.contains("www.youtube.com/embed/abc"));
    }

    #[test]
    fn events_encode_as_tagged_json() {
        let json = serde_json::to_value(ControllerEvent::CancelSettled { confirmed: false })
            .expect("json");
        assert_eq!(
            json,
            serde_json::json!({ "type": "cancel_settled", "payload": { "confirmed": false } })
        );
    }
}
