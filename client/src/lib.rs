//! # Flight Client Library
//!
//! Client-side implementation of the arcade multiplayer flight sim. Each
//! client is the sole authority over its own aircraft: the flight model
//! integrates locally every frame, and the relay only mirrors the results
//! to everyone else in the room. There is no server-side physics and no
//! reconciliation — remote aircraft are drawn wherever their last pose
//! report put them.
//!
//! ## Modules
//!
//! - [`session`] — the local flight session and HUD telemetry.
//! - [`sync`] — the room mirror table and outbound pose cadence.
//! - [`network`] — relay connection plumbing and the main loop.
//!
//! Rendering, input capture and audio are external collaborators. They meet
//! this library at three seams: a per-frame [`shared::ControlInput`]
//! snapshot going in, [`session::FlightData`] telemetry coming out, and the
//! [`shared::TerminalCondition`] a session ends with.

pub mod network;
pub mod session;
pub mod sync;
