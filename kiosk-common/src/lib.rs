//! # Kiosk Common Library
//!
//! Shared code for the kiosk rotation engine and its status surface:
//! - Error type
//! - Bootstrap configuration loading and config file resolution
//! - Event types (KioskEvent enum) and the EventBus
//! - SSE stream helpers
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod sse;
pub mod time;

pub use error::{Error, Result};
