//! Collaborator interfaces consumed by the turn controller.
//!
//! Every collaborator is injected as a trait object so the controller can be
//! driven by real devices, the desktop stand-ins in this module, or test fakes.

pub mod camera;
pub mod inference;
pub mod stt;
pub mod tts;
pub mod wakeword;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use inference::{InferenceRequest, InferenceResponse};

/// Invoked by a wake-word engine each time the wake word is heard.
///
/// Returns whether the detection started a turn; `false` means it was
/// dropped (a turn is already in flight or the listener is gone).
pub type WakeCallback = Arc<dyn Fn() -> bool + Send + Sync>;

/// Service trait for wake-word detection
#[async_trait]
pub trait WakeWordDetector: Send + Sync {
    /// Register the detection callback. Replaces any previous callback.
    fn set_callback(&self, callback: WakeCallback);

    /// Prepare the engine (load keyword models, acquire the microphone)
    async fn initialize(&self) -> Result<()>;

    /// Arm detection
    async fn start(&self) -> Result<()>;

    /// Disarm detection
    async fn stop(&self) -> Result<()>;
}

/// Service trait for speech-to-text of the utterance following a wake word
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self) -> Result<String>;
}

/// Service trait for camera capture
#[async_trait]
pub trait ImageCapture: Send + Sync {
    /// Make sure the camera is usable (permissions granted, device open)
    async fn prepare(&self) -> Result<()> {
        Ok(())
    }

    /// Capture a picture and return it base64 encoded
    async fn capture(&self) -> Result<String>;
}

/// Service trait for the remote inference server
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn send(&self, request: &InferenceRequest) -> Result<InferenceResponse>;
}

/// Service trait for text-to-speech playback
#[async_trait]
pub trait SpeechPlayer: Send + Sync {
    /// Speak the given text, resolving once playback has finished
    async fn speak(&self, text: &str) -> Result<()>;

    /// Interrupt any ongoing playback
    async fn stop(&self) -> Result<()>;
}
