//! Arcade flight dynamics: one aircraft advanced by control input and elapsed time.
//!
//! `integrate` is a pure function of (state, input, dt) so it can run headless in
//! tests; `FlightModel` wraps it with the terminal-condition latch that freezes
//! the aircraft between a crash and an external reset.

use glam::{EulerRot, Quat, Vec3};

use crate::protocol::Pose;
use crate::world::{Obstacle, AIRFIELD, SPAWN_POSITION};
use crate::{GRAVITY, GROUND_EPSILON, MAX_FUEL, MAX_SPEED, MAX_TICK_DT, PITCH_LIMIT, STALL_SPEED};

/// Throttle slew rate in units per second.
const THROTTLE_RATE: f32 = 0.5;
/// Airspeed at which pitch/roll input reaches full effectiveness.
const AUTHORITY_SPEED: f32 = 60.0;
/// Minimum speed before the elevator responds during the takeoff roll.
const ROTATE_SPEED: f32 = 60.0;
/// Below this speed a grounded aircraft cannot climb off the runway.
const LIFTOFF_SPEED: f32 = 70.0;
/// Ground steering authority never drops below this fraction.
const TAXI_STEER_FLOOR: f32 = 0.2;
const THRUST_FACTOR: f32 = 150.0;
const DRAG_FACTOR: f32 = 0.000_25;
/// How strongly the flight-path angle feeds gravity into airspeed.
const GRAVITY_ALONG_PATH: f32 = 3.0;
const ROLLING_FRICTION: f32 = 0.2;
const STALL_SINK_FACTOR: f32 = 2.5;
/// Nose-down attitude the aircraft is pulled toward in a stall, radians.
const STALL_PITCH: f32 = -0.8;
const FUEL_BURN_RATE: f32 = 0.5;
/// Vertical displacement per tick steeper than this on touchdown is a crash.
const CRASH_SINK: f32 = -2.0;
/// Bank or pitch beyond this on touchdown is a crash, radians.
const CRASH_ATTITUDE: f32 = 0.6;

/// Why a flight session ended. Reported exactly once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalCondition {
    /// Hit an obstacle or the ground too hard.
    Crash,
    /// Ran the tanks dry.
    Fuel,
    /// Came down outside the home airfield.
    WaterCrash,
}

/// Per-frame control snapshot supplied by the input collaborator.
///
/// Discrete flags and analog axes drive the same channels; the analog value
/// wins whenever it is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlInput {
    pub throttle_up: bool,
    pub throttle_down: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
    pub roll_left: bool,
    pub roll_right: bool,
    pub joy_pitch: f32,
    pub joy_roll: f32,
}

/// Per-pilot tuning applied on top of the base model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightConfig {
    /// Scales control authority; the user's sensitivity setting.
    pub sensitivity: f32,
    /// Negates the combined pitch axis before it reaches the model.
    pub inverted_look: bool,
    pub max_speed: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            inverted_look: false,
            max_speed: MAX_SPEED,
        }
    }
}

/// Kinematic state of one aircraft, owned by the simulation that produced it.
///
/// Attitude accumulates as Euler angles; only pitch is bounded. The unit
/// quaternion sent over the wire is derived fresh each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AircraftState {
    pub position: Vec3,
    /// Radians, clamped to ±`PITCH_LIMIT`.
    pub pitch: f32,
    /// Radians, wraps freely.
    pub roll: f32,
    /// Radians, wraps freely.
    pub yaw: f32,
    pub speed: f32,
    pub throttle: f32,
    pub fuel: f32,
}

impl AircraftState {
    /// Fresh aircraft parked at the runway spawn point.
    pub fn spawn() -> Self {
        Self {
            position: SPAWN_POSITION,
            pitch: 0.0,
            roll: 0.0,
            yaw: 0.0,
            speed: 0.0,
            throttle: 0.0,
            fuel: MAX_FUEL,
        }
    }

    /// Attitude as a unit quaternion (yaw, then pitch, then roll).
    pub fn attitude(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    /// Local forward axis rotated into world space.
    pub fn forward(&self) -> Vec3 {
        self.attitude() * Vec3::NEG_Z
    }

    pub fn grounded(&self) -> bool {
        self.position.y <= GROUND_EPSILON
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.attitude())
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Combines discrete flags and analog axes into the final pitch/roll inputs.
///
/// Analog takes precedence when non-zero; the joystick roll axis is
/// sign-flipped relative to the keyboard convention, and inverted look
/// negates pitch last.
fn combine_axes(input: &ControlInput, config: &FlightConfig) -> (f32, f32) {
    let kb_pitch = (input.pitch_up as i8 - input.pitch_down as i8) as f32;
    let kb_roll = (input.roll_left as i8 - input.roll_right as i8) as f32;

    let pitch = if input.joy_pitch != 0.0 {
        input.joy_pitch
    } else {
        kb_pitch
    };
    let roll = if input.joy_roll != 0.0 {
        -input.joy_roll
    } else {
        kb_roll
    };

    let pitch = if config.inverted_look { -pitch } else { pitch };
    (pitch, roll)
}

/// Advances `state` by one bounded timestep.
///
/// Returns the terminal condition reached this tick, if any. The caller is
/// responsible for latching it; `integrate` itself is stateless beyond the
/// fields it mutates.
pub fn integrate(
    state: &mut AircraftState,
    input: &ControlInput,
    config: &FlightConfig,
    obstacles: &[Obstacle],
    dt: f32,
) -> Option<TerminalCondition> {
    // Frame hitches never advance more than 100ms of simulated time.
    let dt = dt.min(MAX_TICK_DT);
    if dt <= 0.0 {
        return None;
    }

    if input.throttle_up {
        state.throttle = (state.throttle + THROTTLE_RATE * dt).min(1.0);
    }
    if input.throttle_down {
        state.throttle = (state.throttle - THROTTLE_RATE * dt).max(0.0);
    }

    let (pitch_input, roll_input) = combine_axes(input, config);

    let grounded = state.grounded();
    let air_speed = state.speed;
    let authority = (air_speed / AUTHORITY_SPEED).min(1.0) * config.sensitivity;

    if grounded {
        if air_speed > 1.0 {
            // Nosewheel steering loses authority as the takeoff roll builds up.
            let steering = (1.0 - air_speed / config.max_speed).max(TAXI_STEER_FLOOR);
            state.yaw += roll_input * dt * steering;
        }

        if air_speed > ROTATE_SPEED && pitch_input > 0.0 {
            state.pitch += pitch_input * authority * dt * 0.8;
        } else {
            state.pitch = lerp(state.pitch, 0.0, dt * 5.0);
        }

        state.roll = lerp(state.roll, 0.0, dt * 10.0);
    } else {
        state.pitch += pitch_input * authority * dt * 1.5;
        state.roll += roll_input * authority * dt * 2.5;
        // Banking turns the nose.
        state.yaw += state.roll * authority * dt * 0.8;

        if roll_input == 0.0 && pitch_input == 0.0 {
            state.roll = lerp(state.roll, 0.0, dt * 2.5);
        }
    }

    state.pitch = state.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

    let forward = state.forward();
    let thrust = state.throttle * THRUST_FACTOR * dt;
    let drag = air_speed * air_speed * DRAG_FACTOR * dt;
    let gravity_force = GRAVITY * dt;
    // Subtracts airspeed when climbing, adds it back in a dive.
    let gravity_component = forward.y * gravity_force * -GRAVITY_ALONG_PATH;

    state.speed += thrust - drag + gravity_component;
    if grounded {
        state.speed -= state.speed * ROLLING_FRICTION * dt;
    }
    state.speed = state.speed.clamp(0.0, config.max_speed);

    let mut displacement = forward * state.speed * dt;

    if !grounded {
        if air_speed < STALL_SPEED {
            displacement.y -= gravity_force * STALL_SINK_FACTOR;
            state.pitch = lerp(state.pitch, STALL_PITCH, dt);
        }
    } else {
        if displacement.y < 0.0 {
            displacement.y = 0.0;
        }
        if displacement.y > 0.0 && air_speed < LIFTOFF_SPEED {
            displacement.y = 0.0;
        }
    }

    state.position += displacement;

    if state.position.y < 0.0 {
        if !AIRFIELD.contains(state.position.x, state.position.z) {
            return Some(TerminalCondition::WaterCrash);
        }
        if displacement.y < CRASH_SINK
            || state.roll.abs() > CRASH_ATTITUDE
            || state.pitch.abs() > CRASH_ATTITUDE
        {
            return Some(TerminalCondition::Crash);
        }
        // Gentle enough: touch down and level out.
        state.position.y = 0.0;
        state.pitch = 0.0;
        state.roll = 0.0;
    }

    state.fuel -= state.throttle * FUEL_BURN_RATE * dt;
    if state.fuel <= 0.0 {
        state.fuel = 0.0;
        return Some(TerminalCondition::Fuel);
    }

    for obstacle in obstacles {
        if obstacle.intersects_aircraft(state.position) {
            return Some(TerminalCondition::Crash);
        }
    }

    None
}

/// Stateful wrapper around `integrate` with the once-only terminal latch.
///
/// After a terminal condition the model refuses to integrate until `reset`.
#[derive(Debug, Clone)]
pub struct FlightModel {
    state: AircraftState,
    config: FlightConfig,
    terminated: Option<TerminalCondition>,
}

impl FlightModel {
    pub fn new(config: FlightConfig) -> Self {
        Self {
            state: AircraftState::spawn(),
            config,
            terminated: None,
        }
    }

    pub fn state(&self) -> &AircraftState {
        &self.state
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn terminated(&self) -> Option<TerminalCondition> {
        self.terminated
    }

    /// Advances one tick. Returns the terminal condition on the tick that
    /// ends the session and never again until `reset`.
    pub fn tick(
        &mut self,
        input: &ControlInput,
        obstacles: &[Obstacle],
        dt: f32,
    ) -> Option<TerminalCondition> {
        if self.terminated.is_some() {
            return None;
        }
        let outcome = integrate(&mut self.state, input, &self.config, obstacles, dt);
        if outcome.is_some() {
            self.terminated = outcome;
        }
        outcome
    }

    /// Returns the aircraft to the spawn point with full fuel and clears the
    /// terminal latch.
    pub fn reset(&mut self) {
        self.state = AircraftState::spawn();
        self.terminated = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use crate::world::ObstacleKind;

    fn throttle_up() -> ControlInput {
        ControlInput {
            throttle_up: true,
            ..ControlInput::default()
        }
    }

    fn airborne_state() -> AircraftState {
        AircraftState {
            position: Vec3::new(0.0, 300.0, 0.0),
            speed: 150.0,
            throttle: 1.0,
            ..AircraftState::spawn()
        }
    }

    #[test]
    fn spawn_state_is_parked() {
        let state = AircraftState::spawn();
        assert_eq!(state.speed, 0.0);
        assert_eq!(state.throttle, 0.0);
        assert_eq!(state.fuel, MAX_FUEL);
        assert!(state.grounded());
    }

    #[test]
    fn attitude_is_unit_quaternion() {
        let state = AircraftState {
            pitch: 0.7,
            roll: -2.0,
            yaw: 11.3,
            ..AircraftState::spawn()
        };
        assert_approx_eq!(state.attitude().length(), 1.0, 1e-6);
    }

    #[test]
    fn zero_dt_leaves_state_unchanged() {
        let mut state = airborne_state();
        let before = state;
        let input = ControlInput {
            throttle_up: true,
            pitch_up: true,
            roll_left: true,
            ..ControlInput::default()
        };
        let outcome = integrate(&mut state, &input, &FlightConfig::default(), &[], 0.0);
        assert_eq!(outcome, None);
        assert_eq!(state, before);
    }

    #[test]
    fn oversized_dt_is_clamped() {
        let config = FlightConfig::default();
        let input = throttle_up();

        let mut hitched = airborne_state();
        let mut capped = airborne_state();
        integrate(&mut hitched, &input, &config, &[], 5.0);
        integrate(&mut capped, &input, &config, &[], MAX_TICK_DT);

        assert_eq!(hitched, capped);
    }

    #[test]
    fn throttle_slews_and_saturates() {
        let mut state = airborne_state();
        state.throttle = 0.9;
        let config = FlightConfig::default();

        integrate(&mut state, &throttle_up(), &config, &[], 0.1);
        assert_approx_eq!(state.throttle, 0.95, 1e-6);

        for _ in 0..20 {
            integrate(&mut state, &throttle_up(), &config, &[], 0.1);
        }
        assert_eq!(state.throttle, 1.0);
    }

    #[test]
    fn pitch_stays_clamped_under_sustained_input() {
        let mut state = airborne_state();
        let config = FlightConfig::default();
        let input = ControlInput {
            pitch_up: true,
            throttle_up: true,
            ..ControlInput::default()
        };

        for _ in 0..600 {
            integrate(&mut state, &input, &config, &[], 1.0 / 60.0);
            assert!(state.pitch >= -PITCH_LIMIT && state.pitch <= PITCH_LIMIT);
            assert!(state.speed >= 0.0 && state.speed <= config.max_speed);
        }
    }

    #[test]
    fn speed_never_goes_negative() {
        let mut state = AircraftState::spawn();
        let config = FlightConfig::default();
        for _ in 0..120 {
            integrate(&mut state, &ControlInput::default(), &config, &[], 0.05);
            assert!(state.speed >= 0.0);
        }
    }

    #[test]
    fn analog_input_overrides_discrete() {
        let config = FlightConfig::default();
        let input = ControlInput {
            pitch_up: true,
            joy_pitch: -0.5,
            roll_right: true,
            joy_roll: 0.4,
            ..ControlInput::default()
        };
        let (pitch, roll) = combine_axes(&input, &config);
        assert_approx_eq!(pitch, -0.5, 1e-6);
        // Joystick roll is sign-flipped.
        assert_approx_eq!(roll, -0.4, 1e-6);
    }

    #[test]
    fn inverted_look_negates_pitch() {
        let config = FlightConfig {
            inverted_look: true,
            ..FlightConfig::default()
        };
        let input = ControlInput {
            pitch_up: true,
            ..ControlInput::default()
        };
        let (pitch, _) = combine_axes(&input, &config);
        assert_approx_eq!(pitch, -1.0, 1e-6);
    }

    #[test]
    fn full_throttle_outruns_idle_on_the_runway() {
        let config = FlightConfig::default();

        let mut powered = AircraftState::spawn();
        powered.throttle = 1.0;
        let mut idle = AircraftState::spawn();

        let hold = ControlInput::default();
        for _ in 0..100 {
            integrate(&mut powered, &hold, &config, &[], 0.1);
            integrate(&mut idle, &hold, &config, &[], 0.1);
        }

        assert!(powered.speed > idle.speed);
        assert!(powered.speed > 50.0);
    }

    #[test]
    fn stall_sinks_and_pitches_down() {
        let config = FlightConfig::default();
        let mut state = AircraftState {
            position: Vec3::new(0.0, 500.0, 0.0),
            speed: 40.0,
            ..AircraftState::spawn()
        };
        let start_altitude = state.position.y;

        for _ in 0..60 {
            integrate(&mut state, &ControlInput::default(), &config, &[], 1.0 / 60.0);
        }

        assert!(state.position.y < start_altitude);
        assert!(state.pitch < 0.0);
    }

    #[test]
    fn fuel_drains_only_under_throttle() {
        let config = FlightConfig::default();

        let mut coasting = airborne_state();
        coasting.throttle = 0.0;
        integrate(&mut coasting, &ControlInput::default(), &config, &[], 0.1);
        assert_eq!(coasting.fuel, MAX_FUEL);

        let mut burning = airborne_state();
        let before = burning.fuel;
        integrate(&mut burning, &ControlInput::default(), &config, &[], 0.1);
        assert!(burning.fuel < before);
    }

    #[test]
    fn fuel_exhaustion_terminates() {
        let config = FlightConfig::default();
        let mut state = airborne_state();
        state.fuel = 0.01;

        let mut outcome = None;
        for _ in 0..20 {
            outcome = integrate(&mut state, &ControlInput::default(), &config, &[], 0.1);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(TerminalCondition::Fuel));
        assert_eq!(state.fuel, 0.0);
    }

    #[test]
    fn gentle_touchdown_is_not_a_crash() {
        let config = FlightConfig::default();
        // Shallow glide onto the runway: slow descent, wings level.
        let mut state = AircraftState {
            position: Vec3::new(0.0, 0.5, 400.0),
            pitch: -0.15,
            speed: 120.0,
            ..AircraftState::spawn()
        };

        for _ in 0..30 {
            let outcome = integrate(&mut state, &ControlInput::default(), &config, &[], 1.0 / 60.0);
            assert_eq!(outcome, None);
            if state.position.y == 0.0 {
                break;
            }
        }

        assert_eq!(state.position.y, 0.0);
        assert_eq!(state.pitch, 0.0);
        assert_eq!(state.roll, 0.0);
    }

    #[test]
    fn steep_impact_is_a_crash() {
        let config = FlightConfig::default();
        // Nose-dive into the airfield well above the sink threshold.
        let mut state = AircraftState {
            position: Vec3::new(0.0, 1.0, 400.0),
            pitch: -1.1,
            speed: 300.0,
            ..AircraftState::spawn()
        };

        let outcome = integrate(&mut state, &ControlInput::default(), &config, &[], 0.1);
        assert_eq!(outcome, Some(TerminalCondition::Crash));
    }

    #[test]
    fn banked_touchdown_is_a_crash() {
        let config = FlightConfig::default();
        let mut state = AircraftState {
            position: Vec3::new(0.0, 0.2, 400.0),
            roll: 0.9,
            pitch: -0.2,
            speed: 90.0,
            ..AircraftState::spawn()
        };

        let mut outcome = None;
        for _ in 0..30 {
            outcome = integrate(&mut state, &ControlInput::default(), &config, &[], 1.0 / 30.0);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(TerminalCondition::Crash));
    }

    #[test]
    fn ditching_outside_the_airfield_is_a_water_crash() {
        let config = FlightConfig::default();
        // Over the ocean, far past the island edge.
        let mut state = AircraftState {
            position: Vec3::new(0.0, 0.5, -1500.0),
            pitch: -0.1,
            speed: 100.0,
            ..AircraftState::spawn()
        };

        let mut outcome = None;
        for _ in 0..120 {
            outcome = integrate(&mut state, &ControlInput::default(), &config, &[], 1.0 / 30.0);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(TerminalCondition::WaterCrash));
    }

    #[test]
    fn obstacle_strike_is_a_crash() {
        let config = FlightConfig::default();
        let tower = Obstacle {
            kind: ObstacleKind::BuildingTall,
            position: Vec3::new(0.0, 0.0, 250.0),
            scale: Vec3::new(30.0, 120.0, 30.0),
        };
        let mut state = AircraftState {
            position: Vec3::new(0.0, 50.0, 251.0),
            speed: 100.0,
            ..AircraftState::spawn()
        };

        let outcome = integrate(
            &mut state,
            &ControlInput::default(),
            &config,
            &[tower],
            1.0 / 60.0,
        );
        assert_eq!(outcome, Some(TerminalCondition::Crash));
    }

    #[test]
    fn rings_are_not_solid() {
        let config = FlightConfig::default();
        let ring = Obstacle {
            kind: ObstacleKind::Ring,
            position: Vec3::new(0.0, 0.0, 250.0),
            scale: Vec3::new(30.0, 120.0, 30.0),
        };
        let mut state = AircraftState {
            position: Vec3::new(0.0, 50.0, 250.0),
            speed: 100.0,
            ..AircraftState::spawn()
        };

        let outcome = integrate(
            &mut state,
            &ControlInput::default(),
            &config,
            &[ring],
            1.0 / 60.0,
        );
        assert_eq!(outcome, None);
    }

    #[test]
    fn model_latches_first_terminal_condition() {
        let mut model = FlightModel::new(FlightConfig::default());
        model.state = AircraftState {
            position: Vec3::new(0.0, 1.0, 400.0),
            pitch: -1.1,
            speed: 300.0,
            ..AircraftState::spawn()
        };

        let first = model.tick(&ControlInput::default(), &[], 0.1);
        assert_eq!(first, Some(TerminalCondition::Crash));
        assert_eq!(model.terminated(), Some(TerminalCondition::Crash));

        // Frozen until reset: no report, no movement.
        let frozen = *model.state();
        assert_eq!(model.tick(&throttle_up(), &[], 0.1), None);
        assert_eq!(*model.state(), frozen);

        model.reset();
        assert_eq!(model.terminated(), None);
        assert_eq!(*model.state(), AircraftState::spawn());
    }

    #[test]
    fn grounded_aircraft_cannot_sink_through_the_runway() {
        let config = FlightConfig::default();
        let mut state = AircraftState::spawn();
        state.speed = 30.0;
        state.pitch = -0.3;

        for _ in 0..60 {
            let outcome = integrate(&mut state, &ControlInput::default(), &config, &[], 1.0 / 60.0);
            assert_eq!(outcome, None);
            assert!(state.position.y >= 0.0);
        }
    }
}
