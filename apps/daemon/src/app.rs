//! Application orchestrator — wires all daemon components together.
//!
//! Event flow: each running session feeds the shared sink, which broadcasts
//! the event to protocol clients and pushes the mapped haptic commands into
//! the one dispatcher that owns the device.

use std::sync::Arc;
use std::time::Duration;

use vestlink_device::{Dispatcher, MockVest};
use vestlink_protocol::Broadcast;
use vestlink_server::{BridgeServer, ClientManager, ServerConfig};
use vestlink_session::{EventSink, SessionRegistry};

use crate::config::Config;

/// Runs the daemon until shutdown is requested.
pub async fn run(config: Config) -> anyhow::Result<()> {
    // -- Device --
    // The USB transport implements `VestDevice` and lives with the driver;
    // the daemon itself ships with the in-memory vest so it can run (and be
    // driven by UI clients) without hardware attached.
    let vest = MockVest::new();
    let dispatcher = Dispatcher::spawn(vest);

    // -- Protocol clients --
    let clients = Arc::new(ClientManager::new());

    // -- Event sink: broadcast + map + dispatch --
    let sink_clients = Arc::clone(&clients);
    let sink_dispatcher = Arc::clone(&dispatcher);
    let sink: EventSink = Arc::new(move |event| {
        sink_clients.broadcast(&Broadcast::game_event(
            event.game,
            &event.event_type,
            event.params.clone(),
        ));
        for command in vestlink_haptics::map_event(event) {
            sink_dispatcher.dispatch(command);
        }
    });

    // -- Sessions --
    let registry = Arc::new(
        SessionRegistry::new(Duration::from_millis(config.poll_interval_ms), sink)
            .with_log_overrides(config.log_overrides()),
    );

    // -- Control server --
    let server_config = ServerConfig {
        host: config.host.clone(),
        port: config.port,
    };
    let server = BridgeServer::new(
        server_config,
        Arc::clone(&registry),
        Arc::clone(&dispatcher),
        Arc::clone(&clients),
    );

    let server_run = Arc::clone(&server);
    let server_task = tokio::spawn(async move { server_run.run().await });

    tracing::info!("daemon ready");

    // Run until interrupted or the server dies (bind failure is fatal).
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, shutting down");
        }
        result = server_task => {
            result??;
            anyhow::bail!("control server exited unexpectedly");
        }
    }

    // Orderly teardown: sessions first, then the device, then the listener.
    registry.stop_all().await;
    dispatcher.shutdown();
    server.shutdown();

    Ok(())
}
