//! Static world geometry: obstacle catalog, AABB collision and the home
//! airfield region.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Half-extent of the aircraft's collision cube.
pub const PLANE_HALF_EXTENT: f32 = 2.0;

/// Runway spawn point on the home island.
pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 0.0, 400.0);

/// Closed catalog of placeable obstacles. Unknown kinds are a deserialization
/// error, never a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    BuildingTall,
    BuildingSmall,
    Pyramid,
    /// Fly-through gate; excluded from collision.
    Ring,
}

impl ObstacleKind {
    pub fn solid(&self) -> bool {
        !matches!(self, ObstacleKind::Ring)
    }

    /// Footprint and height used when nothing more specific is placed.
    pub fn default_scale(&self) -> Vec3 {
        match self {
            ObstacleKind::BuildingTall => Vec3::new(30.0, 125.0, 30.0),
            ObstacleKind::BuildingSmall => Vec3::new(20.0, 30.0, 20.0),
            ObstacleKind::Pyramid => Vec3::new(40.0, 40.0, 40.0),
            ObstacleKind::Ring => Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// A static world obstacle. `position` is the center of its footprint at
/// ground level; the box extends upward by `scale.y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub position: Vec3,
    pub scale: Vec3,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, position: Vec3) -> Self {
        Self {
            kind,
            position,
            scale: kind.default_scale(),
        }
    }

    /// World-space bounding box, grounded rather than vertically centered.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half_x = self.scale.x / 2.0;
        let half_z = self.scale.z / 2.0;
        let min = Vec3::new(
            self.position.x - half_x,
            self.position.y,
            self.position.z - half_z,
        );
        let max = Vec3::new(
            self.position.x + half_x,
            self.position.y + self.scale.y,
            self.position.z + half_z,
        );
        (min, max)
    }

    /// AABB test against the aircraft cube centered on `position`. Exact
    /// face contact does not count as an intersection.
    pub fn intersects_aircraft(&self, position: Vec3) -> bool {
        if !self.kind.solid() {
            return false;
        }
        let (min, max) = self.bounds();
        position.x + PLANE_HALF_EXTENT > min.x
            && position.x - PLANE_HALF_EXTENT < max.x
            && position.y + PLANE_HALF_EXTENT > min.y
            && position.y - PLANE_HALF_EXTENT < max.y
            && position.z + PLANE_HALF_EXTENT > min.z
            && position.z - PLANE_HALF_EXTENT < max.z
    }
}

/// Axis-aligned ground region. Points exactly on the border count as inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Region {
    pub fn contains(&self, x: f32, z: f32) -> bool {
        !(x < self.min_x || x > self.max_x || z < self.min_z || z > self.max_z)
    }
}

/// The home island platform; everything beyond it is open water.
pub const AIRFIELD: Region = Region {
    min_x: -500.0,
    max_x: 500.0,
    min_z: -200.0,
    max_z: 1000.0,
};

/// Generates the default city skyline: towers flanking a clear departure
/// corridor, plus the mega skyscraper marking the far city center.
pub fn default_world<R: Rng>(rng: &mut R) -> Vec<Obstacle> {
    let mut obstacles = Vec::with_capacity(41);

    for _ in 0..40 {
        let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let x = side * (80.0 + rng.gen::<f32>() * 400.0);
        let z = (rng.gen::<f32>() - 0.5) * 3000.0;
        let height = 40.0 + rng.gen::<f32>() * 100.0;
        let width = 20.0 + rng.gen::<f32>() * 20.0;

        obstacles.push(Obstacle {
            kind: ObstacleKind::BuildingTall,
            position: Vec3::new(x, 0.0, z),
            scale: Vec3::new(width, height, width),
        });
    }

    obstacles.push(Obstacle {
        kind: ObstacleKind::BuildingTall,
        position: Vec3::new(0.0, 0.0, -2500.0),
        scale: Vec3::new(120.0, 800.0, 120.0),
    });

    obstacles
}
