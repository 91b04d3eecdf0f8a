//! HTTP delivery subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, layers, sweep task)
//!     → middleware.rs (extract request facts, call the guard)
//!     → deny: short-circuit with status + body
//!     → allow: forward to the application handler,
//!              merge composed headers into its response
//! ```

pub mod middleware;
pub mod server;

pub use middleware::guard_middleware;
pub use server::GuardServer;
