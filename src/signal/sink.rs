use super::types::Signal;
use crate::error::SignalError;
use std::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::info;

/// Backend side of the signal channel.
pub trait SignalSink: Send + Sync {
    fn send(&self, signal: &Signal) -> Result<(), SignalError>;
}

/// Forwards signals into an in-process channel read by the UI side.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<Signal>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<Signal>) -> Self {
        Self { tx }
    }
}

/// Creates a connected sink/receiver pair.
pub fn channel() -> (ChannelSink, UnboundedReceiver<Signal>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink::new(tx), rx)
}

impl SignalSink for ChannelSink {
    fn send(&self, signal: &Signal) -> Result<(), SignalError> {
        self.tx
            .send(signal.clone())
            .map_err(|_| SignalError::ChannelClosed)
    }
}

/// Writes signals to the log instead of delivering them, for running without an editor.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SignalSink for LogSink {
    fn send(&self, signal: &Signal) -> Result<(), SignalError> {
        let payload = serde_json::to_string(signal).map_err(|e| SignalError::Encode {
            event: signal.event_name().to_string(),
            message: e.to_string(),
        })?;
        info!(event = signal.event_name(), %payload, "signal (no editor attached)");
        Ok(())
    }
}

/// Keeps every signal it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<Signal>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> Vec<Signal> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        match self.sent.lock() {
            Ok(mut sent) => sent.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl SignalSink for MemorySink {
    fn send(&self, signal: &Signal) -> Result<(), SignalError> {
        match self.sent.lock() {
            Ok(mut sent) => sent.push(signal.clone()),
            Err(poisoned) => poisoned.into_inner().push(signal.clone()),
        }
        Ok(())
    }
}
