// ABOUTME: Canned response stream used when mock responses are enabled
// ABOUTME: Paces tokens like a real backend so the UI can be exercised without a CLI installed

use crate::supervisor::Outcome;
use crate::types::{PromptRequest, StreamEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const TOKEN_DELAY: Duration = Duration::from_millis(80);
const ECHO_CHARS: usize = 120;

/// Lines streamed for `request`.
pub fn mock_lines(request: &PromptRequest) -> Vec<String> {
    let attachment_note = if request.has_attachment() {
        " with screenshot context"
    } else {
        ""
    };
    let echoed: String = request.text.chars().take(ECHO_CHARS).collect();

    vec![
        "Mock mode is enabled.".to_string(),
        format!("I received your prompt{attachment_note}: \"{echoed}\"."),
        "This is a simulated streaming response for checking layout, sizing, and animation."
            .to_string(),
        "Turn off mock_responses in the config to get real backend output again.".to_string(),
    ]
}

pub(crate) async fn stream_mock(
    request: &PromptRequest,
    cancel: &CancellationToken,
    events: &mpsc::Sender<StreamEvent>,
) -> Outcome {
    for line in mock_lines(request) {
        if cancel.is_cancelled() {
            return Outcome::Cancelled;
        }
        if events.send(StreamEvent::Token(line)).await.is_err() {
            return Outcome::Cancelled;
        }
        tokio::select! {
            _ = cancel.cancelled() => return Outcome::Cancelled,
            _ = events.closed() => return Outcome::Cancelled,
            _ = tokio::time::sleep(TOKEN_DELAY) => {}
        }
    }
    Outcome::Finished
}
