//! Wire protocol for Vestlink client-daemon communication.
//!
//! All traffic is newline-delimited JSON over TCP. Three message shapes:
//!
//! - **Requests** (client → daemon): `{"cmd": "alyx_start", ...}`
//! - **Responses** (daemon → requesting client): `{"response": "status", ...}`
//! - **Broadcasts** (daemon → all clients): `{"event": "alyx_game_event", ...}`

pub mod broadcast;
pub mod constants;
pub mod request;
pub mod response;

mod game;

pub use broadcast::Broadcast;
pub use game::GameId;
pub use request::{Request, RequestKind, SessionVerb};
pub use response::{ModInfo, Response, SessionStatus};

/// Milliseconds since the Unix epoch, used for all protocol timestamps.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
