//! Reelgate HTTP server: routing, handlers, middleware and metrics on
//! top of `reelgate-core`. Exposed as a library so integration tests can
//! drive the router in-process.

pub mod api;
pub mod metrics;
pub mod state;
