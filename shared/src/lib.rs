pub mod cosmetics;
pub mod flight;
pub mod framing;
pub mod protocol;
pub mod world;

pub use glam::{Quat, Vec3};

pub use cosmetics::Skin;
pub use flight::{
    integrate, AircraftState, ControlInput, FlightConfig, FlightModel, TerminalCondition,
};
pub use protocol::{Packet, PlayerRecord, Pose};
pub use world::{default_world, Obstacle, ObstacleKind, Region, AIRFIELD, SPAWN_POSITION};

pub const GRAVITY: f32 = 9.81;
pub const MAX_SPEED: f32 = 320.0;
pub const STALL_SPEED: f32 = 75.0;
pub const MAX_FUEL: f32 = 100.0;
pub const MAX_TICK_DT: f32 = 0.1;
pub const GROUND_EPSILON: f32 = 0.1;
pub const PITCH_LIMIT: f32 = 1.2;
pub const POSE_SEND_INTERVAL: f32 = 0.05;
pub const DEFAULT_ROOM: &str = "GLOBAL";
