//! Background purging of expired entries.

use crate::store::{DurableStore, EphemeralStore};
use parking_lot::Mutex;
use safar_core::{LifecycleEvent, LifecycleSource};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Recurring sweep plus lifecycle-driven sweeps over both cache tiers.
///
/// Sweeps remove only entries that are provably expired or unreadable;
/// valid data is never evicted. Foreground signals are debounced so focus
/// flapping does not fire a sweep per flap.
pub struct Janitor {
    durable: DurableStore,
    ephemeral: EphemeralStore,
    lifecycle: Arc<dyn LifecycleSource>,
    sweep_interval: Duration,
    debounce: Duration,
    running: AtomicBool,
    handles: Mutex<Vec<JoinHandle<()>>>,
    sweeps: Arc<AtomicU64>,
}

impl Janitor {
    pub fn new(
        durable: DurableStore,
        ephemeral: EphemeralStore,
        lifecycle: Arc<dyn LifecycleSource>,
        sweep_interval: Duration,
        debounce: Duration,
    ) -> Self {
        Self {
            durable,
            ephemeral,
            lifecycle,
            sweep_interval,
            debounce,
            running: AtomicBool::new(false),
            handles: Mutex::new(Vec::new()),
            sweeps: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Spawn the recurring timer and the lifecycle listener.
    ///
    /// Idempotent: calling this again while running is a no-op, so a
    /// re-entrant bootstrap cannot stack duplicate timers or listeners.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::debug!("janitor already running");
            return;
        }

        // Subscribe before spawning so no event emitted after `start`
        // returns can be missed.
        let mut events = self.lifecycle.subscribe();

        let timer = {
            let durable = self.durable.clone();
            let ephemeral = self.ephemeral.clone();
            let sweeps = Arc::clone(&self.sweeps);
            let period = self.sweep_interval;
            tokio::spawn(async move {
                // First tick lands one full period out; the start-of-life
                // sweep comes from the lifecycle Start event instead.
                let mut ticker =
                    tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    run_sweep(&durable, &ephemeral, &sweeps);
                }
            })
        };

        let listener = {
            let durable = self.durable.clone();
            let ephemeral = self.ephemeral.clone();
            let sweeps = Arc::clone(&self.sweeps);
            let debounce = self.debounce;
            tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(LifecycleEvent::Start) => run_sweep(&durable, &ephemeral, &sweeps),
                        Ok(LifecycleEvent::Foreground) => {
                            // Trailing-edge debounce: every further
                            // foreground signal restarts the quiet window.
                            loop {
                                tokio::select! {
                                    _ = tokio::time::sleep(debounce) => {
                                        run_sweep(&durable, &ephemeral, &sweeps);
                                        break;
                                    }
                                    next = events.recv() => match next {
                                        Ok(LifecycleEvent::Foreground) => continue,
                                        Ok(LifecycleEvent::Start) => {
                                            run_sweep(&durable, &ephemeral, &sweeps);
                                            break;
                                        }
                                        Err(RecvError::Lagged(_)) => continue,
                                        Err(RecvError::Closed) => return,
                                    },
                                }
                            }
                        }
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => return,
                    }
                }
            })
        };

        *self.handles.lock() = vec![timer, listener];
        tracing::debug!(
            interval_secs = self.sweep_interval.as_secs(),
            "janitor started"
        );
    }

    /// Cancel the timer and detach the listener. Returns how many sweeps
    /// ran while the janitor was up. Safe to call when not running, and
    /// `start` may be called again afterwards.
    pub fn shutdown(&self) -> u64 {
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }
        if self.running.swap(false, Ordering::SeqCst) {
            tracing::debug!("janitor stopped");
        }
        self.sweeps.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of completed sweeps since construction.
    pub fn sweeps_completed(&self) -> u64 {
        self.sweeps.load(Ordering::SeqCst)
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }
    }
}

fn run_sweep(durable: &DurableStore, ephemeral: &EphemeralStore, sweeps: &AtomicU64) {
    let removed = durable.sweep_expired() + ephemeral.sweep_expired();
    sweeps.fetch_add(1, Ordering::SeqCst);
    tracing::debug!(removed, "janitor sweep complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyCodec, Namespace};
    use crate::store::MemoryBackend;
    use safar_core::{LifecycleEvents, ManualClock};
    use serde_json::{json, Value};

    struct Fixture {
        janitor: Janitor,
        lifecycle: LifecycleEvents,
        clock: Arc<ManualClock>,
        durable: DurableStore,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(0));
        let lifecycle = LifecycleEvents::new();
        let durable = DurableStore::new(
            Arc::new(MemoryBackend::new()),
            KeyCodec::default(),
            clock.clone(),
            Duration::from_secs(600),
        );
        let ephemeral = EphemeralStore::new(
            Arc::new(MemoryBackend::new()),
            KeyCodec::default(),
            clock.clone(),
            Duration::from_secs(86_400),
        );
        let janitor = Janitor::new(
            durable.clone(),
            ephemeral,
            Arc::new(lifecycle.clone()),
            Duration::from_secs(300),
            Duration::from_millis(800),
        );
        Fixture {
            janitor,
            lifecycle,
            clock,
            durable,
        }
    }

    async fn settle() {
        // Let spawned tasks run; auto-advancing paused time drives timers.
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let f = fixture();
        f.janitor.start();
        f.janitor.start();

        f.lifecycle.emit_start();
        settle().await;

        // One listener, one sweep. A duplicated listener would count two.
        assert_eq!(f.janitor.sweeps_completed(), 1);
        assert_eq!(f.janitor.shutdown(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_event_sweeps_immediately() {
        let f = fixture();
        let ns = Namespace::new("leads").unwrap();
        let stale = f.durable.codec().build(&ns, "stale");
        let fresh = f.durable.codec().build(&ns, "fresh");
        f.durable
            .write(&stale, &json!([1]), Some(Duration::from_millis(10)));
        f.durable.write(&fresh, &json!([2]), None);
        f.clock.set(1_000);

        f.janitor.start();
        f.lifecycle.emit_start();
        settle().await;

        assert_eq!(f.durable.read::<Value>(&stale), None);
        assert_eq!(f.durable.read::<Value>(&fresh), Some(json!([2])));
        f.janitor.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn foreground_flapping_debounces_to_one_sweep() {
        let f = fixture();
        f.janitor.start();
        settle().await;

        f.lifecycle.emit_foreground();
        f.lifecycle.emit_foreground();
        f.lifecycle.emit_foreground();

        // Inside the quiet window nothing has fired yet.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(f.janitor.sweeps_completed(), 0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(f.janitor.sweeps_completed(), 1);
        f.janitor.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn recurring_timer_sweeps_every_interval() {
        let f = fixture();
        f.janitor.start();
        settle().await;
        assert_eq!(f.janitor.sweeps_completed(), 0);

        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(f.janitor.sweeps_completed(), 1);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(f.janitor.sweeps_completed(), 2);
        f.janitor.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_detaches_timer_and_listener() {
        let f = fixture();
        f.janitor.start();
        settle().await;
        assert!(f.janitor.is_running());

        assert_eq!(f.janitor.shutdown(), 0);
        assert!(!f.janitor.is_running());

        // Neither signals nor elapsed time sweep after teardown.
        f.lifecycle.emit_start();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(f.janitor.sweeps_completed(), 0);

        // The janitor can be brought back afterwards.
        f.janitor.start();
        f.lifecycle.emit_start();
        settle().await;
        assert_eq!(f.janitor.sweeps_completed(), 1);
        f.janitor.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_never_removes_valid_entries() {
        let f = fixture();
        let ns = Namespace::new("customers").unwrap();
        let key = f.durable.codec().build(&ns, "all");
        f.durable.write(&key, &json!({"rows": [1, 2]}), None);

        f.janitor.start();
        f.lifecycle.emit_start();
        tokio::time::sleep(Duration::from_secs(1_000)).await;

        assert_eq!(f.durable.read::<Value>(&key), Some(json!({"rows": [1, 2]})));
        f.janitor.shutdown();
    }
}
