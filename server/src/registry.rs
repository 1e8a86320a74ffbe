//! Room membership bookkeeping for the relay server
//!
//! This module owns the server's only authoritative state: which connections
//! are registered as players, under which room, and where each player last
//! reported itself. It is deliberately physics-free; the server never
//! simulates or validates poses, it only tracks membership and the latest
//! mirror data to hand to new joiners.
//!
//! The registry is an explicit object injected into the network layer so the
//! message-handling logic can be exercised in tests without sockets.

use std::collections::HashMap;

use log::info;
use shared::{Packet, PlayerRecord, Pose, Skin};
use tokio::sync::mpsc::UnboundedSender;

/// A registered player: the public record plus the channel that reaches the
/// connection's writer task.
#[derive(Debug)]
pub struct PlayerEntry {
    pub record: PlayerRecord,
    outbound: UnboundedSender<Packet>,
}

/// Membership registry keyed by connection id.
///
/// Mutated exclusively by the relay's single event loop, so it needs no
/// interior locking. Rooms have no object of their own; they exist as the
/// set of records sharing a room tag.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    players: HashMap<u32, PlayerEntry>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
        }
    }

    /// Registers a connection as a player. The caller supplies the id the
    /// transport assigned to the connection; the registry adds no identity
    /// of its own.
    ///
    /// Returns a clone of the stored record. A duplicate join for an already
    /// registered connection overwrites the previous registration.
    pub fn register(
        &mut self,
        id: u32,
        name: String,
        skin: Skin,
        room: String,
        outbound: UnboundedSender<Packet>,
    ) -> PlayerRecord {
        let record = PlayerRecord {
            id,
            name,
            skin,
            room,
            // Parked at the safe origin until the first movement update.
            pose: Pose::IDENTITY,
        };
        info!(
            "player {} ({:?}) joined room {:?}",
            record.id, record.name, record.room
        );
        self.players.insert(
            id,
            PlayerEntry {
                record: record.clone(),
                outbound,
            },
        );
        record
    }

    /// Removes a player, returning the record so the caller can notify the
    /// room. Unknown ids return None (already gone).
    pub fn remove(&mut self, id: u32) -> Option<PlayerRecord> {
        let entry = self.players.remove(&id)?;
        info!(
            "player {} left room {:?}",
            entry.record.id, entry.record.room
        );
        Some(entry.record)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.players.contains_key(&id)
    }

    pub fn record(&self, id: u32) -> Option<&PlayerRecord> {
        self.players.get(&id).map(|entry| &entry.record)
    }

    /// Stores the latest reported pose verbatim. Returns false for ids with
    /// no registration, which callers treat as a no-op.
    pub fn update_pose(&mut self, id: u32, pose: Pose) -> bool {
        match self.players.get_mut(&id) {
            Some(entry) => {
                entry.record.pose = pose;
                true
            }
            None => false,
        }
    }

    /// Room-filtered membership snapshot, including `id` itself if joined.
    pub fn snapshot(&self, room: &str) -> Vec<PlayerRecord> {
        self.players
            .values()
            .filter(|entry| entry.record.room == room)
            .map(|entry| entry.record.clone())
            .collect()
    }

    /// Queues a packet for one player. Send failures are ignored; a dead
    /// writer task means the disconnect is already on its way.
    pub fn send_to(&self, id: u32, packet: Packet) {
        if let Some(entry) = self.players.get(&id) {
            let _ = entry.outbound.send(packet);
        }
    }

    /// Queues a packet for everyone in `room`, optionally excluding one id
    /// (the sender of the message being relayed).
    pub fn broadcast_room(&self, room: &str, packet: &Packet, exclude: Option<u32>) {
        for entry in self.players.values() {
            if entry.record.room != room {
                continue;
            }
            if Some(entry.record.id) == exclude {
                continue;
            }
            let _ = entry.outbound.send(packet.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn join(
        registry: &mut RoomRegistry,
        id: u32,
        name: &str,
        room: &str,
    ) -> mpsc::UnboundedReceiver<Packet> {
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(id, name.to_string(), Skin::Default, room.to_string(), tx);
        rx
    }

    #[test]
    fn register_starts_at_the_safe_origin() {
        let mut registry = RoomRegistry::new();
        let _rx = join(&mut registry, 1, "A", "GLOBAL");

        let record = registry.record(1).unwrap();
        assert_eq!(record.pose, Pose::IDENTITY);
        assert_eq!(record.room, "GLOBAL");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_returns_the_record_once() {
        let mut registry = RoomRegistry::new();
        let _rx = join(&mut registry, 1, "A", "GLOBAL");

        let removed = registry.remove(1).unwrap();
        assert_eq!(removed.id, 1);
        assert!(registry.remove(1).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn update_pose_for_unknown_id_is_a_noop() {
        let mut registry = RoomRegistry::new();
        assert!(!registry.update_pose(99, Pose::IDENTITY));

        let _rx = join(&mut registry, 1, "A", "GLOBAL");
        let pose = Pose {
            x: 5.0,
            ..Pose::IDENTITY
        };
        assert!(registry.update_pose(1, pose));
        assert_eq!(registry.record(1).unwrap().pose.x, 5.0);
    }

    #[test]
    fn snapshot_is_filtered_by_room() {
        let mut registry = RoomRegistry::new();
        let _rx1 = join(&mut registry, 1, "A", "GLOBAL");
        let _rx2 = join(&mut registry, 2, "B", "GLOBAL");
        let _rx3 = join(&mut registry, 3, "C", "PRIVATE");

        let snapshot = registry.snapshot("GLOBAL");
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|record| record.room == "GLOBAL"));

        assert_eq!(registry.snapshot("PRIVATE").len(), 1);
        assert!(registry.snapshot("EMPTY").is_empty());
    }

    #[test]
    fn broadcast_respects_room_and_exclusion() {
        let mut registry = RoomRegistry::new();
        let mut rx1 = join(&mut registry, 1, "A", "GLOBAL");
        let mut rx2 = join(&mut registry, 2, "B", "GLOBAL");
        let mut rx3 = join(&mut registry, 3, "C", "PRIVATE");

        registry.broadcast_room("GLOBAL", &Packet::PlayerLeft { id: 7 }, Some(1));

        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap(), Packet::PlayerLeft { id: 7 });
        assert!(rx3.try_recv().is_err());
    }

    #[test]
    fn duplicate_join_overwrites_registration() {
        let mut registry = RoomRegistry::new();
        let _rx1 = join(&mut registry, 1, "A", "GLOBAL");
        let _rx2 = join(&mut registry, 1, "A2", "PRIVATE");

        assert_eq!(registry.len(), 1);
        let record = registry.record(1).unwrap();
        assert_eq!(record.name, "A2");
        assert_eq!(record.room, "PRIVATE");
    }

    #[test]
    fn send_to_dead_channel_does_not_panic() {
        let mut registry = RoomRegistry::new();
        let rx = join(&mut registry, 1, "A", "GLOBAL");
        drop(rx);

        registry.send_to(1, Packet::Welcome { id: 1 });
        registry.broadcast_room("GLOBAL", &Packet::PlayerLeft { id: 2 }, None);
    }
}
