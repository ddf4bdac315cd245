// ================
// crates/common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between the Parley chat client and server.
//! This module defines the WebSocket chat events, the HTTP request bodies,
//! and supporting types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one live WebSocket connection, allocated on accept and
/// never reused.
pub type ConnId = Uuid;

/// Events sent from client to server over the WebSocket, encoded as
/// `{"event": <name>, "data": <payload>}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Announce the username for this connection. Re-announcing overwrites
    /// the previous username.
    #[serde(rename = "newUser")]
    NewUser(String),
    /// Send a chat message to the room. The server stamps the time.
    #[serde(rename = "sendMessage")]
    SendMessage(OutboundMessage),
}

/// Payload of a `sendMessage` event. The client supplies the author name;
/// no identification is required to send.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OutboundMessage {
    pub user: String,
    pub text: String,
}

/// Events fanned out from the server to every live connection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// `"<username> joined the chat"`
    #[serde(rename = "userJoined")]
    UserJoined(String),
    /// `"<username> left the chat"`
    #[serde(rename = "userLeft")]
    UserLeft(String),
    /// Full roster of known accounts with live online status.
    #[serde(rename = "userList")]
    UserList(Vec<RosterEntry>),
    /// Relayed chat message with the server-assigned time.
    #[serde(rename = "rm")]
    ChatMessage(ChatMessage),
}

/// One line of the roster: a known account plus whether any live session
/// currently maps to it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub online: bool,
}

/// A relayed chat message. `time` is a wall-clock time-of-day string
/// assigned by the server at broadcast; messages are never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub user: String,
    pub text: String,
    pub time: String,
}

/// Body of `POST /signup`. Fields default to empty so that missing fields
/// reach the auth service and come back as a 400 rather than an extractor
/// rejection.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignupRequest {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /login`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
