use super::handlers::Responder;
use super::state::{StatusBoard, Transition, TurnState, TurnStatus};
use crate::config::ScoutConfig;
use crate::error::{Result, ScoutError};
use crate::intent::{Intent, IntentClassifier};
use crate::services::{
    ImageCapture, InferenceClient, InferenceRequest, SpeechPlayer, Transcriber, WakeCallback,
    WakeWordDetector,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

pub const LISTENING_TEXT: &str = "Listening for the wake word...";
pub const CAPTURING_TEXT: &str = "Capturing image...";
pub const SENDING_TEXT: &str = "Sending to Professor...";
pub const DETECTOR_PARKED_TEXT: &str =
    "Wake word detection stopped. Restart the assistant to continue.";

/// Fixed utterances spoken when a turn fails
#[derive(Debug, Clone)]
pub struct Apologies {
    pub unknown_intent: String,
    pub capture_failed: String,
    pub server_failed: String,
    pub general: String,
}

impl Default for Apologies {
    fn default() -> Self {
        Self {
            unknown_intent: "Sorry, I didn't understand that. Say help to hear what I can do."
                .to_string(),
            capture_failed: "Camera is not ready. Please wait a moment.".to_string(),
            server_failed: "Sorry, I couldn't connect to the Professor server.".to_string(),
            general: "Sorry, something went wrong.".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Pause between playback finishing and re-arming the detector
    pub resume_delay: Duration,
    pub apologies: Apologies,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            resume_delay: Duration::from_millis(crate::config::DEFAULT_RESUME_DELAY_MS),
            apologies: Apologies::default(),
        }
    }
}

impl From<&ScoutConfig> for ControllerConfig {
    fn from(config: &ScoutConfig) -> Self {
        Self {
            resume_delay: config.resume_delay,
            ..Self::default()
        }
    }
}

/// The external services a controller drives
#[derive(Clone)]
pub struct Collaborators {
    pub detector: Arc<dyn WakeWordDetector>,
    pub transcriber: Arc<dyn Transcriber>,
    pub camera: Arc<dyn ImageCapture>,
    pub inference: Arc<dyn InferenceClient>,
    pub speech: Arc<dyn SpeechPlayer>,
}

/// What a completed turn did
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// `None` when the utterance could not be transcribed
    pub intent: Option<Intent>,
    /// `Speaking` or `Error`
    pub state: TurnState,
    pub response_text: String,
}

/// Why a turn ended in the error state
#[derive(Debug)]
enum TurnFailure {
    UnknownIntent,
    Capture(ScoutError),
    Server(ScoutError),
    EmptyResult,
    Other(ScoutError),
}

/// Drives the listening -> processing -> speaking/error -> listening cycle.
///
/// Only one turn runs at a time. The wake callback claims the
/// `processing_wake_word` flag; detections arriving while it is held are
/// dropped. The flag is released once the detector is re-armed.
pub struct TurnController {
    services: Collaborators,
    classifier: IntentClassifier,
    config: ControllerConfig,
    responder: Responder,
    board: StatusBoard,
    processing_wake_word: Arc<AtomicBool>,
    wake_rx: mpsc::UnboundedReceiver<()>,
}

impl TurnController {
    pub fn new(
        services: Collaborators,
        classifier: IntentClassifier,
        config: ControllerConfig,
    ) -> Self {
        // held until the first successful initialize()
        let processing_wake_word = Arc::new(AtomicBool::new(true));
        let (wake_tx, wake_rx) = mpsc::unbounded_channel();

        services
            .detector
            .set_callback(Self::wake_callback(Arc::clone(&processing_wake_word), wake_tx));

        Self {
            services,
            classifier,
            config,
            responder: Responder::new(),
            board: StatusBoard::new(),
            processing_wake_word,
            wake_rx,
        }
    }

    fn wake_callback(flag: Arc<AtomicBool>, wake_tx: mpsc::UnboundedSender<()>) -> WakeCallback {
        Arc::new(move || {
            if flag
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                log::debug!("🔁 Wake word ignored, a turn is already in flight");
                return false;
            }
            log::info!("🎤 Wake word detected!");
            if wake_tx.send(()).is_err() {
                log::warn!("Wake word detected but the controller has shut down");
                return false;
            }
            true
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<TurnStatus> {
        self.board.subscribe()
    }

    pub fn transitions(&self) -> broadcast::Receiver<Transition> {
        self.board.transitions()
    }

    pub fn status(&self) -> TurnStatus {
        self.board.current()
    }

    pub fn state(&self) -> TurnState {
        self.board.state()
    }

    pub fn is_processing_wake_word(&self) -> bool {
        self.processing_wake_word.load(Ordering::SeqCst)
    }

    pub fn home_city(&self) -> Option<&str> {
        self.responder.home_city()
    }

    /// Prepare the camera and arm the detector, then start listening.
    ///
    /// Also the external recovery path once the detector has been parked.
    pub async fn initialize(&mut self) -> Result<()> {
        self.board.set_state(TurnState::Initializing);
        self.board.set_response_text(super::state::INITIAL_RESPONSE_TEXT);

        let setup = async {
            self.services.camera.prepare().await?;
            self.services.detector.initialize().await?;
            self.services.detector.start().await
        };

        let setup_result = setup.await;
        match setup_result {
            Ok(()) => {
                log::info!("👂 Ready for wakeword");
                self.enter_listening();
                Ok(())
            }
            Err(e) => {
                log::error!("Setup failed: {}", e);
                self.board.set_state(TurnState::Error);
                self.board.set_response_text(format!("Setup failed: {}", e));
                Err(e)
            }
        }
    }

    /// Wait for the next wake word and run that turn to completion.
    ///
    /// Returns `None` once the detector has dropped the callback.
    pub async fn next_turn(&mut self) -> Option<TurnOutcome> {
        self.wake_rx.recv().await?;
        Some(self.run_turn().await)
    }

    /// Process turns until `shutdown` is cancelled
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<()> {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    log::info!("Shutting down turn controller");
                    break;
                }
                event = self.wake_rx.recv() => {
                    if event.is_none() {
                        log::error!("Wake word detector released its callback");
                        break;
                    }
                    let outcome = self.run_turn().await;
                    log::debug!("Turn finished: {:?}", outcome);
                }
            }
        }

        if let Err(e) = self.services.detector.stop().await {
            log::warn!("Failed to stop wake word detector: {}", e);
        }
        if let Err(e) = self.services.speech.stop().await {
            log::warn!("Failed to stop speech playback: {}", e);
        }
        Ok(())
    }

    async fn run_turn(&mut self) -> TurnOutcome {
        self.board.set_state(TurnState::Processing);

        if let Err(e) = self.services.detector.stop().await {
            log::warn!("Failed to stop wake word detector: {}", e);
        }

        let (intent, result) = self.process().await;

        let outcome = match result {
            Ok(text) => self.speak_response(intent, text).await,
            Err(failure) => self.speak_apology(intent, failure).await,
        };

        tokio::time::sleep(self.config.resume_delay).await;
        self.resume_listening().await;
        outcome
    }

    async fn process(&mut self) -> (Option<Intent>, std::result::Result<String, TurnFailure>) {
        let utterance = match self.services.transcriber.transcribe().await {
            Ok(text) => text,
            Err(e) => return (None, Err(TurnFailure::Other(e))),
        };

        let intent = self.classifier.classify(&utterance);
        let result = if intent.is_unknown() {
            Err(TurnFailure::UnknownIntent)
        } else if intent.is_visual() {
            self.handle_visual(&intent).await
        } else {
            self.responder
                .respond(&intent)
                .ok_or(TurnFailure::UnknownIntent)
        };
        (Some(intent), result)
    }

    async fn handle_visual(&self, intent: &Intent) -> std::result::Result<String, TurnFailure> {
        self.board.set_response_text(CAPTURING_TEXT);
        let image_data = self
            .services
            .camera
            .capture()
            .await
            .map_err(TurnFailure::Capture)?;

        self.board.set_response_text(SENDING_TEXT);
        let request = InferenceRequest::for_intent(intent, image_data);
        let response = self
            .services
            .inference
            .send(&request)
            .await
            .map_err(TurnFailure::Server)?;

        let result_text = response.result_text.trim();
        if result_text.is_empty() {
            return Err(TurnFailure::EmptyResult);
        }
        Ok(result_text.to_string())
    }

    async fn speak_response(&mut self, intent: Option<Intent>, text: String) -> TurnOutcome {
        self.board.set_state(TurnState::Speaking);
        self.board.set_response_text(text.clone());
        log::info!("🗣️  Response: {}", text);

        match self.services.speech.speak(&text).await {
            Ok(()) => TurnOutcome {
                intent,
                state: TurnState::Speaking,
                response_text: text,
            },
            Err(e) => self.speak_apology(intent, TurnFailure::Other(e)).await,
        }
    }

    async fn speak_apology(&mut self, intent: Option<Intent>, failure: TurnFailure) -> TurnOutcome {
        let apologies = &self.config.apologies;
        let apology = match &failure {
            TurnFailure::UnknownIntent => {
                log::info!("🤷 Could not classify the utterance");
                &apologies.unknown_intent
            }
            TurnFailure::Capture(e) => {
                log::error!("Image capture failed: {}", e);
                &apologies.capture_failed
            }
            TurnFailure::Server(e) => {
                log::error!("Failed to process image: {}", e);
                &apologies.server_failed
            }
            TurnFailure::EmptyResult => {
                log::error!("Server returned an empty result");
                &apologies.server_failed
            }
            TurnFailure::Other(e) => {
                log::error!("Turn failed: {}", e);
                &apologies.general
            }
        }
        .clone();

        self.board.set_state(TurnState::Error);
        self.board.set_response_text(apology.clone());

        if let Err(e) = self.services.speech.speak(&apology).await {
            log::error!("Failed to speak apology: {}", e);
        }

        TurnOutcome {
            intent,
            state: TurnState::Error,
            response_text: apology,
        }
    }

    /// Re-arm the detector. One full re-initialise is attempted if starting
    /// fails; after that the controller stays in the error state.
    async fn resume_listening(&mut self) {
        let detector = Arc::clone(&self.services.detector);

        let first = match detector.start().await {
            Ok(()) => {
                self.enter_listening();
                return;
            }
            Err(e) => e,
        };
        log::warn!("🔄 Failed to restart wake word detector ({}), re-initializing", first);

        let retry = async {
            detector.initialize().await?;
            detector.start().await
        };

        match retry.await {
            Ok(()) => self.enter_listening(),
            Err(e) => {
                log::error!(
                    "Wake word detector could not be restarted: {}. Waiting for re-initialization",
                    e
                );
                self.board.set_state(TurnState::Error);
                self.board.set_response_text(DETECTOR_PARKED_TEXT);
            }
        }
    }

    fn enter_listening(&mut self) {
        self.board.set_state(TurnState::Listening);
        self.board.set_response_text(LISTENING_TEXT);
        self.processing_wake_word.store(false, Ordering::SeqCst);
    }
}
