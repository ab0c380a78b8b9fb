//! Rotation-related type definitions
//!
//! Supporting enums carried by rotation events.

use serde::{Deserialize, Serialize};

/// How an item's playback came to an end
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum CompletionOutcome {
    /// Progress reached the full duration
    Finished,
    /// The surface sent an explicit end-of-media notification
    Ended,
    /// The asset failed to load and was skipped
    LoadFailed,
}

impl std::fmt::Display for CompletionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionOutcome::Finished => write!(f, "Finished"),
            CompletionOutcome::Ended => write!(f, "Ended"),
            CompletionOutcome::LoadFailed => write!(f, "LoadFailed"),
        }
    }
}

/// Why the interstitial outlasted its deadline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum InterstitialReason {
    /// The next group's prefetch has not resolved yet
    AwaitingPrefetch,
    /// A synchronous fetch is in flight or scheduled for retry
    AwaitingFetch,
    /// The freshest queue for the group has no items
    EmptyQueue,
}

impl std::fmt::Display for InterstitialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterstitialReason::AwaitingPrefetch => write!(f, "AwaitingPrefetch"),
            InterstitialReason::AwaitingFetch => write!(f, "AwaitingFetch"),
            InterstitialReason::EmptyQueue => write!(f, "EmptyQueue"),
        }
    }
}

/// Why a catalog fetch was issued
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub enum FetchKind {
    /// Blocking fetch the engine waits on before activating a group
    Activation,
    /// Speculative fetch of the next group during the interstitial
    Prefetch,
    /// Periodic refresh, staged until a safe transition point
    Refresh,
}

impl std::fmt::Display for FetchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchKind::Activation => write!(f, "Activation"),
            FetchKind::Prefetch => write!(f, "Prefetch"),
            FetchKind::Refresh => write!(f, "Refresh"),
        }
    }
}
