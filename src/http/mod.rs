//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → track.rs (validate `ref`, call the tracking service)
//!     → response.rs (map failures to status + JSON error body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod track;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{build_router, AppState, HttpServer};
