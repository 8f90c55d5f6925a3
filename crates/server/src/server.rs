use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use vestlink_device::Dispatcher;
use vestlink_protocol::constants::{DEFAULT_HOST, DEFAULT_PORT, MAX_REQUEST_LINE};
use vestlink_protocol::{Broadcast, Request, Response};
use vestlink_session::SessionRegistry;

use crate::ServerError;
use crate::clients::ClientManager;
use crate::handler;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    /// TCP port to listen on (0 = OS-assigned, used by tests).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
        }
    }
}

/// The daemon's TCP protocol front.
pub struct BridgeServer {
    config: ServerConfig,
    registry: Arc<SessionRegistry>,
    dispatcher: Arc<Dispatcher>,
    clients: Arc<ClientManager>,
    cancel: CancellationToken,
    local_addr: StdMutex<Option<SocketAddr>>,
}

impl BridgeServer {
    pub fn new(
        config: ServerConfig,
        registry: Arc<SessionRegistry>,
        dispatcher: Arc<Dispatcher>,
        clients: Arc<ClientManager>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            registry,
            dispatcher,
            clients,
            cancel: CancellationToken::new(),
            local_addr: StdMutex::new(None),
        })
    }

    /// Address actually bound; available once [`run`](Self::run) has bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().expect("addr lock")
    }

    pub fn port(&self) -> u16 {
        self.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    /// Gracefully shuts down the accept loop and client connections.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Runs the accept loop until shutdown.
    ///
    /// A bind failure is returned to the caller: it is the only fatal
    /// startup condition in the daemon.
    pub async fn run(self: &Arc<Self>) -> Result<(), ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;

        let local_addr = listener.local_addr()?;
        *self.local_addr.lock().expect("addr lock") = Some(local_addr);
        tracing::info!("control server listening on {local_addr}");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("control server shutting down");
                    break Ok(());
                }
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let server = Arc::clone(self);
                            tokio::spawn(async move {
                                server.handle_client(stream, peer_addr).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!("accept error: {e}");
                        }
                    }
                }
            }
        }
    }

    async fn handle_client(self: &Arc<Self>, stream: TcpStream, peer_addr: SocketAddr) {
        let client_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(%peer_addr, %client_id, "client connected");

        let (read_half, mut write_half) = stream.into_split();
        let mut outbound = self.clients.add(&client_id);

        // Writer pump: drains this client's buffer until it disconnects.
        let writer_cancel = self.cancel.clone();
        let writer = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = writer_cancel.cancelled() => break,
                    line = outbound.recv() => {
                        let Some(line) = line else { break };
                        if write_half.write_all(line.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        self.clients
            .broadcast(&Broadcast::client_connected(&client_id));

        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        loop {
            line.clear();
            let read = tokio::select! {
                _ = self.cancel.cancelled() => break,
                read = reader.read_line(&mut line) => read,
            };
            match read {
                Ok(0) => break, // EOF, client hung up.
                Ok(n) if n > MAX_REQUEST_LINE => {
                    self.clients.send_to(
                        &client_id,
                        Response::error("request too large", None).to_json_line(),
                    );
                }
                Ok(_) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let response = match Request::from_json(&line) {
                        Ok(request) => {
                            handler::handle(
                                &self.registry,
                                &self.dispatcher,
                                &self.clients,
                                request,
                            )
                            .await
                        }
                        Err(e) => Response::error(format!("invalid JSON: {e}"), None),
                    };
                    self.clients.send_to(&client_id, response.to_json_line());
                }
                Err(e) => {
                    tracing::debug!(%client_id, "client read error: {e}");
                    break;
                }
            }
        }

        self.clients.remove(&client_id);
        self.clients
            .broadcast(&Broadcast::client_disconnected(&client_id));
        writer.abort();
        tracing::info!(%client_id, "client disconnected");
    }
}
