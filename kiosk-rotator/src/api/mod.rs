//! HTTP status surface
//!
//! Read-only endpoints for the rendering shell and operators. Nothing here
//! can steer the rotation.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};
