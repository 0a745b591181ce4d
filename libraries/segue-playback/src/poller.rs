//! Position poller
//!
//! Samples the transport at a fixed period. Each sample drives the
//! time-based transitions (`Transport::tick`: natural end, sleep deadline)
//! and publishes a `PositionSnapshot`. Events queued by the transport are
//! forwarded to subscribers on the same beat.

use std::sync::PoisonError;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::events::PlaybackEvent;
use crate::transport::{SharedTransport, Transport};
use crate::types::{PlaybackConfig, PositionSnapshot};

/// Capacity of the event channel; slow subscribers lag rather than block
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Synchronous poller for callers that own their own loop
///
/// The period is measured on the transport's clock, so an offline render
/// loop driving a virtual clock gets one sample per interval of rendered
/// time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionPoller {
    interval: Duration,
    next_due: Option<f64>,
}

impl PositionPoller {
    /// Poller with the given period (at least 1 ms)
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    /// Poller using `config.poll_interval_ms`
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(config.poll_interval())
    }

    /// Sampling period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sample if a full interval has passed on the transport clock
    ///
    /// The first call always samples.
    pub fn poll(&mut self, transport: &mut Transport) -> Option<PositionSnapshot> {
        let now = transport.now();
        if self.next_due.is_some_and(|due| now < due) {
            return None;
        }
        self.next_due = Some(now + self.interval.as_secs_f64());
        Some(Self::sample(transport))
    }

    /// Sample unconditionally: advance time-based transitions, then snapshot
    pub fn sample(transport: &mut Transport) -> PositionSnapshot {
        transport.tick();
        transport.snapshot()
    }

    /// Forget the schedule; the next `poll` samples immediately
    pub fn reset(&mut self) {
        self.next_due = None;
    }
}

/// Handle to a running background poller
///
/// Dropping the handle stops the poller at its next wake-up.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    snapshots: watch::Receiver<PositionSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Most recent snapshot
    pub fn latest(&self) -> PositionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch snapshots as they are published
    pub fn snapshots(&self) -> watch::Receiver<PositionSnapshot> {
        self.snapshots.clone()
    }

    /// Receive transport events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Stop the poller and wait for it to exit
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Spawn a poller on the current tokio runtime
///
/// The first sample is taken immediately.
pub fn spawn_position_poller(transport: SharedTransport, interval: Duration) -> PollerHandle {
    let interval = interval.max(Duration::from_millis(1));
    let initial = lock(&transport).snapshot();

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let (snapshot_tx, snapshots) = watch::channel(initial);
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    let event_tx = events.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        debug!(interval_ms = interval.as_millis(), "position poller started");

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let (snapshot, drained) = {
                        let mut guard = lock(&transport);
                        let snapshot = PositionPoller::sample(&mut guard);
                        (snapshot, guard.drain_events())
                    };
                    trace!(
                        position = snapshot.position,
                        status = ?snapshot.status,
                        "position sample"
                    );

                    for event in drained {
                        // No subscribers is fine
                        let _ = event_tx.send(event);
                    }
                    if snapshot_tx.send(snapshot).is_err() {
                        break;
                    }
                }
            }
        }

        debug!("position poller stopped");
    });

    PollerHandle {
        shutdown_tx,
        snapshots,
        events,
        task: Some(task),
    }
}

/// A panic in another holder must not take playback down with it
fn lock(transport: &SharedTransport) -> std::sync::MutexGuard<'_, Transport> {
    transport.lock().unwrap_or_else(PoisonError::into_inner)
}
