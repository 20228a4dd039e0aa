//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, routing)
//!     → request.rs (request ID)
//!     → relay pipeline (POST /proxify)
//!     → response.rs (error bodies for rejected calls and misses)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::{error_response, ErrorBody};
pub use server::{AppState, HttpServer};
