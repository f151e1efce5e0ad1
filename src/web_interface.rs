//! Web interface subsystem
//!
//! Bearer-token-gated JSON endpoints mirroring the TranscriptStore 1:1,
//! plus an embedded dashboard page.
//!
//! Components:
//! - `auth`: the bearer filter and rejection handling.
//! - `routes`: one warp filter function per endpoint.
//! - `web_server`: route composition and server lifecycle.
//! - `types`: request/response payloads specific to the HTTP surface.

pub mod auth;
pub mod routes;
pub mod types;
pub mod web_server;

pub use web_server::WebServer;
