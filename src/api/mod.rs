//! Typed client for the TagLink HTTP API.
//!
//! All outbound traffic goes through [`ApiClient`]: a fixed base URL, JSON
//! bodies, and a cookie store carrying the session credential set by the
//! login and password-reset endpoints. Responses are decoded into the types
//! in [`types`]; failures are classified by [`ApiError`] so callers can keep
//! the "couldn't reach the server" and "server said no" cases apart.

mod client;
mod error;
pub mod types;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult, CONNECTIVITY_MESSAGE, GENERIC_FAILURE_MESSAGE};
