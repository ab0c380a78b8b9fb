//! Rotation runtime
//!
//! One task owns the [`RotationManager`], the media surface, the interstitial
//! timer, the refresh timer and every in-flight catalog fetch. Inputs are
//! handled one at a time to completion, so engine state needs no locks:
//!
//! 1. `select!` picks the next input (surface signal, timer, fetch result).
//! 2. The manager turns it into [`Command`]s.
//! 3. Commands are applied to the surface, the fetch set and the timer.
//! 4. A fresh [`DisplaySnapshot`] is published.

use crate::catalog::{CatalogProvider, FetchError};
use crate::playback::SurfaceCommand;
use crate::queue::Item;
use crate::refresh::RefreshScheduler;
use crate::rotation::{Command, RotationManager};
use crate::snapshot::DisplaySnapshot;
use crate::surface::{MediaSurface, ProgressObserver, SurfaceSignal};
use futures::FutureExt;
use kiosk_common::events::FetchKind;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{sleep_until, Instant, Sleep};
use tracing::{debug, error, info};

/// Result of one catalog fetch task
#[derive(Debug)]
pub struct FetchOutcome {
    pub group: usize,
    pub kind: FetchKind,
    pub result: Result<Vec<Item>, FetchError>,
}

enum Input {
    Shutdown,
    Surface(SurfaceSignal),
    InterstitialExpired,
    Refresh,
    Fetched(FetchOutcome),
    FetchTaskFailed(JoinError),
}

/// Event loop driving a [`RotationManager`]
pub struct RotationRuntime {
    manager: RotationManager,
    provider: Arc<dyn CatalogProvider>,
    surface: Box<dyn MediaSurface>,
    refresh: RefreshScheduler,
    signal_tx: mpsc::UnboundedSender<SurfaceSignal>,
    signal_rx: mpsc::UnboundedReceiver<SurfaceSignal>,
    fetches: JoinSet<FetchOutcome>,
    interstitial: Option<Pin<Box<Sleep>>>,
    snapshot_tx: watch::Sender<DisplaySnapshot>,
}

impl RotationRuntime {
    pub fn new(
        manager: RotationManager,
        provider: Arc<dyn CatalogProvider>,
        surface: Box<dyn MediaSurface>,
        refresh_period: Duration,
    ) -> Self {
        let now = Instant::now();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(manager.snapshot(now));

        Self {
            manager,
            provider,
            surface,
            refresh: RefreshScheduler::new(refresh_period, now),
            signal_tx,
            signal_rx,
            fetches: JoinSet::new(),
            interstitial: None,
            snapshot_tx,
        }
    }

    /// Receiver for display snapshots; always holds the latest one
    pub fn snapshots(&self) -> watch::Receiver<DisplaySnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Run until `shutdown` resolves, then detach the surface and cancel
    /// outstanding fetches
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);

        info!(
            "Rotation runtime started (catalog: {}, refresh every {:?})",
            self.provider.name(),
            self.refresh.period()
        );
        let commands = self.manager.start(Instant::now());
        self.execute(commands);
        self.publish(Instant::now());

        loop {
            let input = tokio::select! {
                _ = &mut shutdown => Input::Shutdown,
                Some(signal) = self.signal_rx.recv() => Input::Surface(signal),
                _ = wait_interstitial(&mut self.interstitial) => Input::InterstitialExpired,
                _ = self.refresh.tick() => Input::Refresh,
                Some(joined) = self.fetches.join_next() => match joined {
                    Ok(outcome) => Input::Fetched(outcome),
                    Err(e) => Input::FetchTaskFailed(e),
                },
            };

            let now = Instant::now();
            let commands = match input {
                Input::Shutdown => break,
                Input::Surface(signal) => self.manager.on_surface(signal, now),
                Input::InterstitialExpired => {
                    self.interstitial = None;
                    self.manager.on_interstitial_timer(now)
                }
                Input::Refresh => self.manager.request_refresh(),
                Input::Fetched(FetchOutcome {
                    group,
                    kind,
                    result,
                }) => self.manager.on_fetch_result(group, kind, result),
                Input::FetchTaskFailed(e) => {
                    // Only reachable through cancellation
                    error!("Catalog fetch task failed: {}", e);
                    Vec::new()
                }
            };

            self.execute(commands);
            self.publish(now);
        }

        info!("Rotation runtime shutting down");
        let commands = self.manager.shutdown(Instant::now());
        self.execute(commands);
        self.interstitial = None;
        self.fetches.abort_all();
        self.publish(Instant::now());
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Surface(command) => self.apply_surface(command),
                Command::Fetch {
                    group,
                    source,
                    kind,
                    delay,
                } => self.spawn_fetch(group, source, kind, delay),
                Command::ArmInterstitial { deadline } => {
                    // Replaces any earlier deadline
                    self.interstitial = Some(Box::pin(sleep_until(deadline)));
                }
            }
        }
    }

    fn apply_surface(&mut self, command: SurfaceCommand) {
        match command {
            SurfaceCommand::Attach { binding, item } => {
                let observer = ProgressObserver::new(binding, self.signal_tx.clone());
                self.surface.attach(binding, &item.media, &item.meta, observer);
            }
            SurfaceCommand::Play(binding) => self.surface.play(binding),
            SurfaceCommand::Pause(binding) => self.surface.pause(binding),
            SurfaceCommand::Detach(binding) => self.surface.detach(binding),
        }
    }

    fn spawn_fetch(&mut self, group: usize, source: String, kind: FetchKind, delay: Duration) {
        let provider = Arc::clone(&self.provider);
        self.fetches.spawn(async move {
            // Everything fallible stays inside the guard so the outcome always
            // carries its group back to the manager
            let attempt = async {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                debug!("Fetching '{}' from {} ({})", source, provider.name(), kind);
                provider.fetch_queue(&source).await
            };

            let result = AssertUnwindSafe(attempt)
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(FetchError::Internal(panic_message(&*panic))));

            FetchOutcome {
                group,
                kind,
                result,
            }
        });
    }

    fn publish(&self, now: Instant) {
        self.snapshot_tx.send_replace(self.manager.snapshot(now));
    }
}

async fn wait_interstitial(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "provider panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_extracts_text() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*boxed), "boom");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*boxed), "bang");

        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(&*boxed), "provider panicked");
    }
}
