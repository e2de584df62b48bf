use super::SpeechPlayer;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Notify;

/// Speech player for terminals: prints the text instead of playing audio.
///
/// An optional per-word pacing makes "playback" take roughly as long as
/// speaking would, so turn timing behaves like it does on a device.
pub struct LogSpeechPlayer {
    per_word: Duration,
    interrupt: Notify,
}

impl Default for LogSpeechPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSpeechPlayer {
    pub fn new() -> Self {
        Self::with_pacing(Duration::ZERO)
    }

    pub fn with_pacing(per_word: Duration) -> Self {
        Self {
            per_word,
            interrupt: Notify::new(),
        }
    }
}

#[async_trait]
impl SpeechPlayer for LogSpeechPlayer {
    async fn speak(&self, text: &str) -> Result<()> {
        log::info!("🔊 Speaking text: '{}'", text);
        println!("🗣️  {}", text);

        let words = text.split_whitespace().count() as u32;
        let playback = self.per_word * words;
        if !playback.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(playback) => {}
                _ = self.interrupt.notified() => {
                    log::info!("🛑 Speech interrupted");
                }
            }
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.interrupt.notify_waiters();
        Ok(())
    }
}
