//! LinkGate HTTP server library.
//!
//! Public pages (the locked landing page and the token-gated page), the
//! embedded-browser redirect launcher, and the JSON admin API, wired over
//! the stores from `linkgate-core`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
