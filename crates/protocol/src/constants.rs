use std::time::Duration;

/// Default TCP port the daemon listens on.
pub const DEFAULT_PORT: u16 = 5050;

/// Default bind address (local clients only).
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default interval between log file polls.
///
/// Interval polling is used instead of filesystem notification because game
/// log writers on common platforms do not reliably emit change events for
/// append-while-open access patterns.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Maximum accepted length of a single request line in bytes.
///
/// Requests are small JSON objects; anything larger is a misbehaving client.
pub const MAX_REQUEST_LINE: usize = 64 * 1024;

/// Capacity of each client's outbound message buffer.
///
/// Game-event bursts fan out to every connected client. A slow reader gets
/// its oldest pending messages dropped rather than stalling the daemon.
pub const CLIENT_SEND_BUFFER: usize = 256;
