//! Wire schema shared by the relay server and every client.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::cosmetics::Skin;

/// Position plus unit-quaternion orientation, exactly as transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub qx: f32,
    pub qy: f32,
    pub qz: f32,
    pub qw: f32,
}

impl Pose {
    /// Parked at the origin, no rotation. The placeholder a player record
    /// carries until the first movement update arrives.
    pub const IDENTITY: Pose = Pose {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        qx: 0.0,
        qy: 0.0,
        qz: 0.0,
        qw: 1.0,
    };

    pub fn new(position: Vec3, attitude: Quat) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            qx: attitude.x,
            qy: attitude.y,
            qz: attitude.z,
            qw: attitude.w,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn attitude(&self) -> Quat {
        Quat::from_xyzw(self.qx, self.qy, self.qz, self.qw)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One connected player as the server knows them. Clients mirror these
/// read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Connection id assigned by the server; the player's only identity.
    pub id: u32,
    pub name: String,
    pub skin: Skin,
    pub room: String,
    pub pose: Pose,
}

/// Every message that crosses the wire, in both directions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    // client -> server
    Join {
        name: String,
        skin: Skin,
        room: String,
    },
    UpdateMovement {
        pose: Pose,
    },
    Chat {
        text: String,
    },
    /// Opaque point-to-point session negotiation. `peer` names the target
    /// on the way in and the origin on the way out; the server never looks
    /// inside `data`.
    VoiceSignal {
        peer: u32,
        data: String,
    },
    Leave,

    // server -> client
    Welcome {
        id: u32,
    },
    CurrentPlayers {
        players: Vec<PlayerRecord>,
    },
    PlayerJoined {
        player: PlayerRecord,
    },
    PlayerMoved {
        id: u32,
        pose: Pose,
    },
    PlayerLeft {
        id: u32,
    },
    ChatBroadcast {
        id: u32,
        name: String,
        text: String,
    },
}
