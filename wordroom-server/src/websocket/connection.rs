use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};
use tokio::time::Instant;
use uuid::Uuid;

use wordroom_types::{PlayerId, RoomCode, ServerMessage};

pub type Outbox = mpsc::UnboundedReceiver<ServerMessage>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room and player a connection joined as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub room_code: RoomCode,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub binding: Option<Binding>,
    pub opened_at: Instant,
    pub last_seen: Instant,
    outbound: Option<mpsc::UnboundedSender<ServerMessage>>,
}

impl Connection {
    fn open(id: ConnectionId) -> (Self, Outbox) {
        let (outbound, outbox) = mpsc::unbounded_channel();
        let opened_at = Instant::now();

        (
            Self {
                id,
                binding: None,
                opened_at,
                last_seen: opened_at,
                outbound: Some(outbound),
            },
            outbox,
        )
    }

    pub fn room_code(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.room_code.as_str())
    }

    pub fn player_id(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.player_id.as_str())
    }

    pub fn is_in_room(&self, code: &str) -> bool {
        self.room_code() == Some(code)
    }

    fn deliver(&self, message: ServerMessage) -> Result<(), String> {
        self.outbound
            .as_ref()
            .ok_or_else(|| "Connection closed".to_string())?
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.as_ref().is_none_or(|tx| tx.is_closed())
    }

    fn idle_longer_than(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

#[derive(Default)]
struct Table {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<RoomCode, HashSet<ConnectionId>>,
}

impl Table {
    fn unbind(&mut self, id: ConnectionId) -> Option<Binding> {
        let binding = self.connections.get_mut(&id)?.binding.take()?;
        if let Some(members) = self.rooms.get_mut(&binding.room_code) {
            members.remove(&id);
            if members.is_empty() {
                self.rooms.remove(&binding.room_code);
            }
        }
        Some(binding)
    }

    fn members<'a>(&'a self, code: &str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.rooms
            .get(code)
            .into_iter()
            .flatten()
            .filter_map(|id| self.connections.get(id))
    }
}

/// Live WebSocket connections, indexed by the room each one has joined.
pub struct ConnectionManager {
    table: RwLock<Table>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
        }
    }

    /// Register a connection; the returned outbox yields everything sent to it.
    pub async fn create_connection(&self, id: ConnectionId) -> Outbox {
        let (connection, outbox) = Connection::open(id);
        self.table.write().await.connections.insert(id, connection);
        outbox
    }

    pub async fn remove_connection(&self, id: ConnectionId) -> Option<Connection> {
        let mut table = self.table.write().await;
        table.unbind(id);
        table.connections.remove(&id)
    }

    pub async fn get_connection(&self, id: ConnectionId) -> Option<Connection> {
        self.table.read().await.connections.get(&id).cloned()
    }

    pub async fn update_activity(&self, id: ConnectionId) {
        if let Some(connection) = self.table.write().await.connections.get_mut(&id) {
            connection.last_seen = Instant::now();
        }
    }

    /// Bind a connection to the room and player it joined as, replacing any
    /// earlier binding.
    pub async fn join_room(&self, id: ConnectionId, room_code: &str, player_id: &str) {
        let mut table = self.table.write().await;
        if !table.connections.contains_key(&id) {
            return;
        }

        table.unbind(id);
        table
            .rooms
            .entry(room_code.to_string())
            .or_default()
            .insert(id);
        if let Some(connection) = table.connections.get_mut(&id) {
            connection.binding = Some(Binding {
                room_code: room_code.to_string(),
                player_id: player_id.to_string(),
            });
        }
    }

    pub async fn leave_room(&self, id: ConnectionId) -> Option<Binding> {
        self.table.write().await.unbind(id)
    }

    pub async fn send_to_connection(
        &self,
        id: ConnectionId,
        message: ServerMessage,
    ) -> Result<(), String> {
        match self.table.read().await.connections.get(&id) {
            Some(connection) => connection.deliver(message),
            None => Err("Connection not found".to_string()),
        }
    }

    pub async fn send_to_room(&self, room_code: &str, message: ServerMessage) {
        let table = self.table.read().await;
        for connection in table.members(room_code) {
            if let Err(e) = connection.deliver(message.clone()) {
                tracing::warn!("Failed to send to {}: {}", connection.id, e);
            }
        }
    }

    pub async fn send_to_room_except(
        &self,
        room_code: &str,
        except: ConnectionId,
        message: ServerMessage,
    ) {
        let table = self.table.read().await;
        for connection in table.members(room_code).filter(|c| c.id != except) {
            if let Err(e) = connection.deliver(message.clone()) {
                tracing::warn!("Failed to send to {}: {}", connection.id, e);
            }
        }
    }

    pub async fn connections_in_room(&self, room_code: &str) -> Vec<ConnectionId> {
        self.table
            .read()
            .await
            .members(room_code)
            .map(|c| c.id)
            .collect()
    }

    /// Whether some connection is still joined to `room_code` as `player_id`.
    pub async fn is_player_bound(&self, room_code: &str, player_id: &str) -> bool {
        self.table
            .read()
            .await
            .members(room_code)
            .any(|c| c.player_id() == Some(player_id))
    }

    /// Close idle connections. Their socket tasks then run the normal
    /// disconnect path and remove them.
    pub async fn cleanup_inactive_connections(&self, timeout: Duration) -> usize {
        let mut table = self.table.write().await;
        let mut closed = 0;
        for connection in table
            .connections
            .values_mut()
            .filter(|c| !c.is_closed() && c.idle_longer_than(timeout))
        {
            tracing::info!("Closing inactive connection: {}", connection.id);
            connection.outbound = None;
            closed += 1;
        }
        closed
    }

    pub async fn connection_count(&self) -> usize {
        self.table.read().await.connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
