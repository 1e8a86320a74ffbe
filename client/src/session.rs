//! Local flight session: the one aircraft this client simulates, plus the
//! instrument readings handed to the presentation layer.

use shared::{
    AircraftState, ControlInput, FlightConfig, FlightModel, Obstacle, Pose, TerminalCondition,
};

/// Instrument readings for the HUD collaborator, refreshed every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightData {
    pub speed: f32,
    pub altitude: f32,
    pub fuel: f32,
    /// Degrees in [0, 360).
    pub heading: f32,
    /// Degrees, positive nose-up.
    pub pitch: f32,
    /// Degrees.
    pub roll: f32,
    pub grounded: bool,
}

/// Owns the local flight model and the static world it flies through.
///
/// The session keeps running whatever happens to the network; multiplayer
/// only mirrors other aircraft around it.
pub struct FlightSession {
    model: FlightModel,
    world: Vec<Obstacle>,
}

impl FlightSession {
    pub fn new(config: FlightConfig, world: Vec<Obstacle>) -> Self {
        Self {
            model: FlightModel::new(config),
            world,
        }
    }

    /// Advances the aircraft by one frame. The terminal condition comes back
    /// exactly once; afterwards the session is frozen until `reset`.
    pub fn tick(&mut self, input: &ControlInput, dt: f32) -> Option<TerminalCondition> {
        self.model.tick(input, &self.world, dt)
    }

    pub fn state(&self) -> &AircraftState {
        self.model.state()
    }

    pub fn pose(&self) -> Pose {
        self.model.state().pose()
    }

    pub fn terminated(&self) -> Option<TerminalCondition> {
        self.model.terminated()
    }

    pub fn reset(&mut self) {
        self.model.reset();
    }

    pub fn world(&self) -> &[Obstacle] {
        &self.world
    }

    pub fn flight_data(&self) -> FlightData {
        let state = self.model.state();
        FlightData {
            speed: state.speed,
            altitude: state.position.y,
            fuel: state.fuel.max(0.0),
            heading: state.yaw.to_degrees().rem_euclid(360.0),
            pitch: state.pitch.to_degrees(),
            roll: state.roll.to_degrees(),
            grounded: state.grounded(),
        }
    }
}
