//! Modules linked into the demo. Each registers itself for auto-loading; the server module is
//! only present when the `server` feature is enabled.

pub mod app;
pub mod greeting;

#[cfg(feature = "server")]
pub mod server;
