//! HTTP API module.
//!
//! Routes, handlers and the error/response conventions of the bridge.

mod error;
mod extract;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use extract::JsonBody;
pub use routes::create_router;
pub use state::{AppState, BridgeSettings};
