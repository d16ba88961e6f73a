//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Carrier fetch attempt fails:
//!     → retries.rs (is the error retryable, is budget left?)
//!     → backoff.rs (linear pause before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Timeouts are per attempt and per wait stage; they live with the client
//! - Retries happen in exactly one place (the browser tracking client)

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
