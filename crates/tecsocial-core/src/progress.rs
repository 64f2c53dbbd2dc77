//! Progress reporting for the server wake-up retry loop.
//!
//! The retry loop pushes a [`ProgressState`] to a [`ProgressObserver`] before
//! each attempt. Observers can be plain closures, channel senders, or a
//! `watch` slot the caller polls. [`Mounted`] lets a caller withdraw interest
//! while the loop keeps running.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

/// Where a retry sequence currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub attempts_made: u32,
    pub attempts_total: u32,
}

impl ProgressState {
    pub fn new(attempts_made: u32, attempts_total: u32) -> Self {
        Self {
            attempts_made,
            attempts_total,
        }
    }

    /// Display text, e.g. "Attempt 3 of 12"
    pub fn display(&self) -> String {
        format!("Attempt {} of {}", self.attempts_made, self.attempts_total)
    }
}

pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: ProgressState);
}

impl<F> ProgressObserver for F
where
    F: Fn(ProgressState) + Send + Sync,
{
    fn on_progress(&self, progress: ProgressState) {
        self(progress)
    }
}

impl ProgressObserver for mpsc::UnboundedSender<ProgressState> {
    fn on_progress(&self, progress: ProgressState) {
        // Receiver gone means nobody is listening any more
        let _ = self.send(progress);
    }
}

impl ProgressObserver for watch::Sender<Option<ProgressState>> {
    fn on_progress(&self, progress: ProgressState) {
        self.send_replace(Some(progress));
    }
}

/// Observer that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _progress: ProgressState) {}
}

/// Shared "caller still cares" flag.
///
/// Cancelling does not stop in-flight work. It only makes [`Mounted`]
/// observers and [`Interest::deliver`] discard what arrives afterwards.
#[derive(Debug, Clone)]
pub struct Interest {
    mounted: Arc<AtomicBool>,
}

impl Default for Interest {
    fn default() -> Self {
        Self::new()
    }
}

impl Interest {
    pub fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    /// Wrap an observer so it only fires while this interest is mounted.
    pub fn guard<O: ProgressObserver>(&self, observer: O) -> Mounted<O> {
        Mounted {
            interest: self.clone(),
            inner: observer,
        }
    }

    /// Hand back an outcome only if the caller is still mounted.
    pub fn deliver<T>(&self, outcome: T) -> Option<T> {
        self.is_mounted().then_some(outcome)
    }
}

pub struct Mounted<O> {
    interest: Interest,
    inner: O,
}

impl<O: ProgressObserver> ProgressObserver for Mounted<O> {
    fn on_progress(&self, progress: ProgressState) {
        if self.interest.is_mounted() {
            self.inner.on_progress(progress);
        }
    }
}
