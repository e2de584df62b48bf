//! The main library for the `scout-assistant` voice assistant.
//!
//! This library provides the intent classifier, the turn controller that
//! sequences wake word, transcription, dispatch and speech, and the
//! collaborator interfaces (plus desktop stand-ins) it is driven through.

pub mod config;
pub mod error;
pub mod intent;
pub mod services;
pub mod turn;

// Re-export common types
pub use error::{Result, ScoutError};
pub use intent::{Intent, IntentClassifier, IntentTag};
pub use turn::{Collaborators, ControllerConfig, TurnController, TurnState, TurnStatus};
