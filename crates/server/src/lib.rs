//! TCP protocol front.
//!
//! Accepts any number of client connections (UI, CLI), reads line-delimited
//! JSON requests, routes them to the [`SessionRegistry`] and [`Dispatcher`],
//! and pushes broadcasts to every connected client. A malformed request gets
//! a structured error response and affects nothing else; failing to bind the
//! listener is the one fatal startup error in the system.

mod clients;
mod handler;
mod server;

pub use clients::ClientManager;
pub use server::{BridgeServer, ServerConfig};

/// Errors produced by the protocol front.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
