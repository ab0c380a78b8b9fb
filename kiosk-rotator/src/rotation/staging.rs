//! Staged queue contents
//!
//! Fetch results land here and are read only when a group is about to be
//! activated. Nothing in the active playback path looks at this holder, so a
//! late or unexpected result can never change what is playing.

use crate::queue::Item;
use kiosk_common::events::FetchKind;

#[derive(Debug, Default)]
pub struct StagedQueue {
    staged: Option<Vec<Item>>,
    pending: usize,
    last_issued: Option<FetchKind>,
    unavailable: Option<FetchKind>,
}

impl StagedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a fetch of `kind` is in flight
    pub fn begin_fetch(&mut self, kind: FetchKind) {
        self.pending += 1;
        self.last_issued = Some(kind);
    }

    /// Store fresh items, replacing anything staged earlier
    pub fn resolve_ok(&mut self, items: Vec<Item>) {
        self.pending = self.pending.saturating_sub(1);
        self.staged = Some(items);
        self.unavailable = None;
    }

    /// Record a failed fetch
    ///
    /// Refresh failures leave the existing content usable; prefetch and
    /// activation failures force a synchronous fetch before activation.
    pub fn resolve_err(&mut self, kind: FetchKind) {
        self.pending = self.pending.saturating_sub(1);
        if kind != FetchKind::Refresh {
            self.unavailable = Some(kind);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    /// Kind of the most recently issued fetch
    pub fn last_issued(&self) -> Option<FetchKind> {
        self.last_issued
    }

    /// Kind of the fetch whose failure left no usable content
    pub fn unavailable(&self) -> Option<FetchKind> {
        self.unavailable
    }

    pub fn has_staged(&self) -> bool {
        self.staged.is_some()
    }

    /// Consume the staged items
    pub fn take(&mut self) -> Option<Vec<Item>> {
        self.staged.take()
    }
}
