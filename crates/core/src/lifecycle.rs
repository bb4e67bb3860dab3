//! Host lifecycle signals consumed by background maintenance.

use tokio::sync::broadcast;

/// Events emitted by the hosting application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Fired once when the application finishes loading.
    Start,
    /// Fired each time the application returns to the foreground.
    Foreground,
}

/// Source of lifecycle events.
///
/// The shell owns the concrete source and wires it to its own load and
/// visibility hooks; consumers only ever see a subscription.
pub trait LifecycleSource: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent>;
}

/// Channel-backed lifecycle source.
#[derive(Debug, Clone)]
pub struct LifecycleEvents {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl LifecycleEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    pub fn emit_start(&self) {
        // Send only fails when nobody is subscribed, which is fine.
        let _ = self.sender.send(LifecycleEvent::Start);
    }

    pub fn emit_foreground(&self) {
        let _ = self.sender.send(LifecycleEvent::Foreground);
    }
}

impl Default for LifecycleEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleSource for LifecycleEvents {
    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }
}
