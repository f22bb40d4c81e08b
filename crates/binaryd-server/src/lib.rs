#![warn(missing_docs)]

//! binaryd HTTP wrapper
//!
//! Exposes the operator's pre-defined commands over HTTP. `GET /<command>`
//! returns the combined output as plain text, `GET /json/<command>` returns
//! the result as JSON, and any other path answers with a usage message.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use server::{shutdown_signal, ApiServer, ServerSettings};
pub use state::AppState;
