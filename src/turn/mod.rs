//! The dialogue-turn state machine and the answers it computes locally.

pub mod controller;
pub mod handlers;
pub mod state;

pub use controller::{Apologies, Collaborators, ControllerConfig, TurnController, TurnOutcome};
pub use state::{StatusBoard, Transition, TurnState, TurnStatus};
