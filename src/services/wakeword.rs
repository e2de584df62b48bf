use super::{WakeCallback, WakeWordDetector};
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A wake-word detector fired from code instead of a microphone.
///
/// The desktop binary triggers it for every line typed on stdin.
#[derive(Default)]
pub struct ManualWakeWord {
    callback: Mutex<Option<WakeCallback>>,
    initialized: AtomicBool,
    armed: AtomicBool,
}

impl ManualWakeWord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Simulate a detection. Returns true only when the callback accepted it,
    /// false when disarmed, without a callback, or when the detection was dropped.
    pub fn trigger(&self) -> bool {
        if !self.is_armed() {
            log::debug!("👂 Trigger ignored, detector is disarmed");
            return false;
        }

        let callback = match self.callback.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        match callback {
            Some(callback) => {
                let accepted = callback();
                if !accepted {
                    log::debug!("👂 Detection dropped by the listener");
                }
                accepted
            }
            None => {
                log::warn!("Wake word triggered with no callback registered");
                false
            }
        }
    }
}

#[async_trait]
impl WakeWordDetector for ManualWakeWord {
    fn set_callback(&self, callback: WakeCallback) {
        match self.callback.lock() {
            Ok(mut guard) => *guard = Some(callback),
            Err(poisoned) => *poisoned.into_inner() = Some(callback),
        }
    }

    async fn initialize(&self) -> Result<()> {
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(ScoutError::Wakeword(
                "detector started before initialize".to_string(),
            ));
        }
        self.armed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.armed.store(false, Ordering::SeqCst);
        Ok(())
    }
}
