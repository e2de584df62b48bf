use super::Transcriber;
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// Transcriber fed with ready-made transcripts, e.g. lines typed on stdin
pub struct QueuedTranscriber {
    receiver: Mutex<mpsc::UnboundedReceiver<String>>,
    timeout: Duration,
}

impl QueuedTranscriber {
    /// Create the transcriber and the sender used to feed it
    pub fn new(timeout: Duration) -> (Self, mpsc::UnboundedSender<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                receiver: Mutex::new(rx),
                timeout,
            },
            tx,
        )
    }
}

#[async_trait]
impl Transcriber for QueuedTranscriber {
    async fn transcribe(&self) -> Result<String> {
        let mut receiver = self.receiver.lock().await;
        match tokio::time::timeout(self.timeout, receiver.recv()).await {
            Ok(Some(text)) => {
                log::info!("📝 Transcript: '{}'", text);
                Ok(text)
            }
            Ok(None) => Err(ScoutError::Transcription(
                "transcript source closed".to_string(),
            )),
            Err(_) => Err(ScoutError::Transcription(format!(
                "no utterance within {:?}",
                self.timeout
            ))),
        }
    }
}
