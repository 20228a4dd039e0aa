//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call:
//!     → timeouts.rs (per-call deadline, cancellation on expiry)
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - Failed calls are never retried; the caller decides what to do

pub mod timeouts;

pub use timeouts::with_deadline;
