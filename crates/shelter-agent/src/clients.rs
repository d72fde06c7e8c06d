//! Open application instances.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Identifier of an open application instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// An open application instance.
#[derive(Debug, Clone)]
pub struct Client {
    /// Instance identifier.
    pub id: ClientId,
    /// URL the instance is showing.
    pub url: String,
    /// Whether the instance is in the foreground.
    pub focused: bool,
    /// Cache version of the agent controlling this instance, if any.
    pub controller: Option<String>,
}

/// Registry of open application instances.
///
/// Activation uses `claim` to re-bind every instance to the new agent
/// without a reload; notification routing uses `focus`/`open`.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// All open instances.
    async fn list(&self) -> Vec<Client>;

    /// Re-bind every open instance to the given controller version.
    async fn claim(&self, version: &str);

    /// Bring an instance to the foreground. Returns false if it is gone.
    async fn focus(&self, id: ClientId) -> bool;

    /// Open a new instance at a URL and return it.
    async fn open(&self, url: &str) -> Client;
}

/// In-memory client registry.
#[derive(Default)]
pub struct MemoryClients {
    clients: RwLock<Vec<Client>>,
    next_id: AtomicU64,
}

impl MemoryClients {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already-open instance (a page that was loaded before
    /// the agent took control).
    pub async fn connect(&self, url: impl Into<String>, focused: bool) -> ClientId {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut clients = self.clients.write().await;
        clients.push(Client {
            id,
            url: url.into(),
            focused,
            controller: None,
        });
        id
    }

    /// Drop an instance (page closed).
    pub async fn disconnect(&self, id: ClientId) {
        let mut clients = self.clients.write().await;
        clients.retain(|c| c.id != id);
    }
}

#[async_trait]
impl ClientRegistry for MemoryClients {
    async fn list(&self) -> Vec<Client> {
        self.clients.read().await.clone()
    }

    async fn claim(&self, version: &str) {
        let mut clients = self.clients.write().await;
        for client in clients.iter_mut() {
            client.controller = Some(version.to_string());
        }
    }

    async fn focus(&self, id: ClientId) -> bool {
        let mut clients = self.clients.write().await;
        let mut found = false;
        for client in clients.iter_mut() {
            if client.id == id {
                client.focused = true;
                found = true;
            } else {
                client.focused = false;
            }
        }
        found
    }

    async fn open(&self, url: &str) -> Client {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let client = Client {
            id,
            url: url.to_string(),
            focused: true,
            controller: None,
        };
        let mut clients = self.clients.write().await;
        for existing in clients.iter_mut() {
            existing.focused = false;
        }
        clients.push(client.clone());
        client
    }
}
