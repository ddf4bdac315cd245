// ============================
// parley-backend-lib/src/hub.rs
// ============================
//! The broadcast hub: a single actor task that owns the session registry
//! and the per-connection outbound senders, fans chat events out to every
//! live connection, and computes roster snapshots on demand. Running all
//! registry mutations and fan-out on one task keeps join/leave/roster
//! updates from interleaving into a torn view.
use crate::registry::SessionRegistry;
use crate::storage::CredentialStore;
use chrono::Local;
use parley_common::{ChatMessage, ConnId, RosterEntry, ServerEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Outbound queue depth per connection. A peer that falls this far behind
/// starts losing events rather than stalling the hub.
const PEER_QUEUE_DEPTH: usize = 32;

/// Message sent *into* the hub actor
#[derive(Debug)]
pub enum HubCommand {
    /// A connection was accepted; events for it flow through `tx`.
    Attach {
        conn: ConnId,
        tx: mpsc::Sender<ServerEvent>,
    },
    /// The connection closed; stop delivering to it.
    Detach { conn: ConnId },
    /// The connection announced its identity.
    Join { conn: ConnId, username: String },
    /// Relay a chat message to the room.
    Relay { author: String, text: String },
    /// The connection closed after having announced an identity.
    Leave { conn: ConnId },
}

/// Handle that the gateway and tests keep: the hub's command channel.
#[derive(Clone)]
pub struct HubHandle {
    cmd_tx: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    /// Spawn the hub actor over the given credential store.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let hub = ChatHub::new(store);

        tokio::spawn(hub.run(cmd_rx));

        HubHandle { cmd_tx }
    }

    pub fn attach(&self, conn: ConnId, tx: mpsc::Sender<ServerEvent>) {
        let _ = self.cmd_tx.send(HubCommand::Attach { conn, tx });
    }

    pub fn detach(&self, conn: ConnId) {
        let _ = self.cmd_tx.send(HubCommand::Detach { conn });
    }

    pub fn announce_join(&self, conn: ConnId, username: String) {
        let _ = self.cmd_tx.send(HubCommand::Join { conn, username });
    }

    pub fn relay_message(&self, author: String, text: String) {
        let _ = self.cmd_tx.send(HubCommand::Relay { author, text });
    }

    pub fn announce_leave(&self, conn: ConnId) {
        let _ = self.cmd_tx.send(HubCommand::Leave { conn });
    }
}

pub struct ChatHub {
    registry: SessionRegistry,
    peers: HashMap<ConnId, mpsc::Sender<ServerEvent>>,
    store: Arc<dyn CredentialStore>,
}

impl ChatHub {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        ChatHub {
            registry: SessionRegistry::new(),
            peers: HashMap::new(),
            store,
        }
    }

    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<HubCommand>) {
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd).await;
        }
    }

    async fn handle(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Attach { conn, tx } => {
                self.peers.insert(conn, tx);
                debug!(%conn, peers = self.peers.len(), "connection attached");
            },
            HubCommand::Detach { conn } => {
                self.peers.remove(&conn);
                debug!(%conn, peers = self.peers.len(), "connection detached");
            },
            HubCommand::Join { conn, username } => {
                self.registry.register(conn, username.clone());
                info!(%conn, %username, "user joined");

                self.broadcast(ServerEvent::UserJoined(format!("{username} joined the chat")));
                // roster computed after registration so the announcer sees
                // itself online
                let roster = self.roster().await;
                self.broadcast(ServerEvent::UserList(roster));
            },
            HubCommand::Relay { author, text } => {
                let time = Local::now().format("%H:%M:%S").to_string();
                debug!(%author, "relaying message");

                self.broadcast(ServerEvent::ChatMessage(ChatMessage {
                    user: author,
                    text,
                    time,
                }));
            },
            HubCommand::Leave { conn } => {
                // a connection that never announced produces no events
                if let Some(username) = self.registry.unregister(conn) {
                    info!(%conn, %username, "user left");

                    self.broadcast(ServerEvent::UserLeft(format!("{username} left the chat")));
                    let roster = self.roster().await;
                    self.broadcast(ServerEvent::UserList(roster));
                }
            },
        }
    }

    /// The roster is a pure projection: every known account, marked online
    /// iff some live session maps to it. Never stored, so it cannot drift.
    async fn roster(&self) -> Vec<RosterEntry> {
        let accounts = self.store.list().await.unwrap_or_else(|err| {
            warn!(error = %err, "could not list accounts for roster");
            Vec::new()
        });

        let online = self.registry.snapshot();
        accounts
            .into_iter()
            .map(|(username, _)| RosterEntry {
                online: online.contains(&username),
                name: username,
            })
            .collect()
    }

    /// Best-effort fan-out: a full peer queue drops this event for that
    /// peer, a closed queue drops the peer. The hub never blocks on a slow
    /// or dead recipient.
    fn broadcast(&mut self, event: ServerEvent) {
        self.peers.retain(|conn, tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%conn, "peer queue full, dropping event");
                true
            },
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }
}

/// Outbound channel sized for the gateway's send task.
pub fn peer_channel() -> (mpsc::Sender<ServerEvent>, mpsc::Receiver<ServerEvent>) {
    mpsc::channel(PEER_QUEUE_DEPTH)
}
