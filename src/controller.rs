//! Controller core module.
//!
//! Wires configuration, storage selection, the companion-side hand-off
//! receiver and the web interface into one running service.

pub mod controller_handler;

pub use controller_handler::Controller;
