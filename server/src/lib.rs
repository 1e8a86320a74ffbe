//! # Relay Server Library
//!
//! The relay is the meeting point for every aircraft in the sky: clients run
//! their own flight simulation locally and report poses here, and the relay
//! fans each report out to everyone sharing the sender's room. It is
//! authoritative for *membership only* — who is connected and under which
//! room — never for physics. Reported poses are relayed verbatim with no
//! validation, smoothing or reconciliation; that trade-off keeps the server
//! a thin, cheap hub and is acceptable for an arcade game.
//!
//! ## Architecture
//!
//! A single select loop owns all mutable state. Per-connection reader tasks
//! funnel decoded packets into the loop over an unbounded channel, and
//! per-connection writer tasks drain outbound queues onto the TCP write
//! halves. Because only the loop touches the registry, there are no locks
//! anywhere in the relay.
//!
//! ## Modules
//!
//! - [`registry`] — the room membership table: player records, room-filtered
//!   snapshots and broadcast helpers.
//! - [`network`] — connection lifecycle, packet dispatch and fan-out rules.

pub mod network;
pub mod registry;
