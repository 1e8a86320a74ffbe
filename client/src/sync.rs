//! Client-side synchronization state: the remote-player mirror table and the
//! outbound pose cadence.
//!
//! `SyncAgent` is deliberately free of I/O — it consumes already-decoded
//! packets and produces events for the presentation layer — so every relay
//! rule it enforces can be tested without a socket.

use std::collections::HashMap;

use log::{debug, warn};
use shared::{Packet, PlayerRecord, POSE_SEND_INTERVAL};

/// Connectivity as surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// Membership and chat traffic surfaced to the presentation layer. Pose
/// updates are not events; they mutate the mirror silently.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Welcomed { id: u32 },
    PlayerJoined { id: u32 },
    PlayerLeft { id: u32 },
    Chat { id: u32, name: String, text: String },
    VoiceSignal { from: u32, data: String },
}

/// One client's view of its room: its own id, the mirror of everyone else,
/// and the timer that paces outbound pose updates.
pub struct SyncAgent {
    room: String,
    local_id: Option<u32>,
    status: ConnectionStatus,
    remote: HashMap<u32, PlayerRecord>,
    send_accumulator: f32,
}

impl SyncAgent {
    pub fn new(room: &str) -> Self {
        Self {
            room: room.to_string(),
            local_id: None,
            status: ConnectionStatus::Connecting,
            remote: HashMap::new(),
            send_accumulator: 0.0,
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn local_id(&self) -> Option<u32> {
        self.local_id
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Read-only mirror of the remote players sharing this room.
    pub fn remote_players(&self) -> &HashMap<u32, PlayerRecord> {
        &self.remote
    }

    /// Applies one inbound packet to the mirror and reports whether the
    /// presentation layer should hear about it.
    ///
    /// Tolerates every race the relay permits: moves for absent ids are
    /// no-ops, repeated leaves are silent, snapshots for foreign rooms are
    /// filtered out.
    pub fn handle_packet(&mut self, packet: Packet) -> Option<SyncEvent> {
        match packet {
            Packet::Welcome { id } => {
                self.local_id = Some(id);
                self.status = ConnectionStatus::Connected;
                Some(SyncEvent::Welcomed { id })
            }

            Packet::CurrentPlayers { players } => {
                for player in players {
                    if player.room != self.room {
                        continue;
                    }
                    if Some(player.id) == self.local_id {
                        continue;
                    }
                    self.remote.insert(player.id, player);
                }
                None
            }

            Packet::PlayerJoined { player } => {
                if player.room != self.room || Some(player.id) == self.local_id {
                    return None;
                }
                let id = player.id;
                self.remote.insert(id, player);
                Some(SyncEvent::PlayerJoined { id })
            }

            Packet::PlayerMoved { id, pose } => {
                // Never create a record from a bare move; a join or snapshot
                // must have introduced the id first.
                if let Some(player) = self.remote.get_mut(&id) {
                    player.pose = pose;
                } else {
                    debug!("pose update for unknown player {}", id);
                }
                None
            }

            Packet::PlayerLeft { id } => self
                .remote
                .remove(&id)
                .map(|_| SyncEvent::PlayerLeft { id }),

            Packet::ChatBroadcast { id, name, text } => {
                Some(SyncEvent::Chat { id, name, text })
            }

            Packet::VoiceSignal { peer, data } => {
                Some(SyncEvent::VoiceSignal { from: peer, data })
            }

            other => {
                warn!("unexpected packet from relay: {:?}", other);
                None
            }
        }
    }

    /// Accumulates frame time and reports when the next `UpdateMovement`
    /// should go out. Decouples the per-frame physics rate from the ~20Hz
    /// network send rate.
    pub fn pose_due(&mut self, dt: f32) -> bool {
        self.send_accumulator += dt;
        if self.send_accumulator > POSE_SEND_INTERVAL {
            self.send_accumulator = 0.0;
            true
        } else {
            false
        }
    }

    /// Tears the mirror down after the transport closed. Reconnecting means
    /// a fresh connection and a fresh join cycle.
    pub fn mark_disconnected(&mut self, error: bool) {
        self.remote.clear();
        self.status = if error {
            ConnectionStatus::Error
        } else {
            ConnectionStatus::Disconnected
        };
    }
}
