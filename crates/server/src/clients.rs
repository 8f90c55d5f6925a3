use std::collections::HashMap;
use std::sync::Mutex as StdMutex;

use tokio::sync::mpsc;

use vestlink_protocol::Broadcast;
use vestlink_protocol::constants::CLIENT_SEND_BUFFER;

/// Connected protocol clients and the broadcast fan-out.
///
/// Each client has a bounded outbound buffer drained by its own writer
/// task. A client that stops reading gets its newest broadcasts dropped
/// rather than stalling the daemon or the other clients.
#[derive(Default)]
pub struct ClientManager {
    clients: StdMutex<HashMap<String, mpsc::Sender<String>>>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client and returns the receiving end for its writer task.
    pub fn add(&self, client_id: &str) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(CLIENT_SEND_BUFFER);
        self.clients
            .lock()
            .expect("clients lock")
            .insert(client_id.to_string(), tx);
        rx
    }

    pub fn remove(&self, client_id: &str) {
        self.clients.lock().expect("clients lock").remove(client_id);
    }

    pub fn count(&self) -> usize {
        self.clients.lock().expect("clients lock").len()
    }

    /// Sends a line to one client. Silently dropped if it is gone or slow.
    pub fn send_to(&self, client_id: &str, line: String) {
        let sender = {
            let clients = self.clients.lock().expect("clients lock");
            clients.get(client_id).cloned()
        };
        if let Some(sender) = sender {
            if sender.try_send(line).is_err() {
                tracing::debug!(client_id, "client send buffer full, dropping message");
            }
        }
    }

    /// Pushes a broadcast to every connected client.
    pub fn broadcast(&self, broadcast: &Broadcast) {
        let line = broadcast.to_json_line();
        let senders: Vec<(String, mpsc::Sender<String>)> = {
            let clients = self.clients.lock().expect("clients lock");
            clients
                .iter()
                .map(|(id, tx)| (id.clone(), tx.clone()))
                .collect()
        };
        for (client_id, sender) in senders {
            if sender.try_send(line.clone()).is_err() {
                tracing::debug!(%client_id, "client send buffer full, dropping broadcast");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_remove_count() {
        let clients = ClientManager::new();
        assert_eq!(clients.count(), 0);

        let _rx1 = clients.add("c1");
        let _rx2 = clients.add("c2");
        assert_eq!(clients.count(), 2);

        clients.remove("c1");
        assert_eq!(clients.count(), 1);
    }

    #[tokio::test]
    async fn broadcast_reaches_all_clients() {
        let clients = ClientManager::new();
        let mut rx1 = clients.add("c1");
        let mut rx2 = clients.add("c2");

        clients.broadcast(&Broadcast::error("test fault"));

        let line1 = rx1.recv().await.unwrap();
        let line2 = rx2.recv().await.unwrap();
        assert!(line1.contains("\"event\":\"error\""));
        assert_eq!(line1, line2);
    }

    #[tokio::test]
    async fn send_to_targets_one_client() {
        let clients = ClientManager::new();
        let mut rx1 = clients.add("c1");
        let mut rx2 = clients.add("c2");

        clients.send_to("c1", "hello\n".into());
        assert_eq!(rx1.recv().await.unwrap(), "hello\n");
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn slow_client_drops_instead_of_blocking() {
        let clients = ClientManager::new();
        let _rx = clients.add("slow");

        // Overfill the buffer without draining; broadcast must not block.
        for _ in 0..(CLIENT_SEND_BUFFER + 50) {
            clients.broadcast(&Broadcast::error("flood"));
        }
        assert_eq!(clients.count(), 1);
    }
}
