//! Relay connection plumbing and the client's main loop.
//!
//! The simulation never blocks on the network: inbound packets arrive
//! through a channel fed by a reader task and are applied whenever they
//! show up, outbound poses are fire-and-forget on their own cadence, and a
//! dead connection degrades the client to single-player.

use std::time::Duration;

use log::{debug, info, warn};
use shared::framing::{read_packet, write_packet};
use shared::{ControlInput, FlightConfig, Obstacle, Packet, Skin};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, Instant};

use crate::session::{FlightData, FlightSession};
use crate::sync::{ConnectionStatus, SyncAgent, SyncEvent};

/// Who we are when we join a room.
#[derive(Debug, Clone)]
pub struct Identity {
    pub name: String,
    pub skin: Skin,
    pub room: String,
}

#[derive(Debug)]
enum Inbound {
    Packet(Packet),
    Closed,
    Failed,
}

/// One player's client: local flight session plus the relay connection.
pub struct FlightClient {
    write: OwnedWriteHalf,
    inbound: UnboundedReceiver<Inbound>,
    agent: SyncAgent,
    session: FlightSession,
}

impl FlightClient {
    /// Connects to the relay and sends the one `Join` of this connection's
    /// lifetime.
    pub async fn connect(
        addr: &str,
        identity: Identity,
        config: FlightConfig,
        world: Vec<Obstacle>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = TcpStream::connect(addr).await?;
        info!("Connected to relay at {}", addr);

        let (read_half, mut write_half) = stream.into_split();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(read_loop(read_half, inbound_tx));

        write_packet(
            &mut write_half,
            &Packet::Join {
                name: identity.name.clone(),
                skin: identity.skin,
                room: identity.room.clone(),
            },
        )
        .await?;

        Ok(Self {
            write: write_half,
            inbound: inbound_rx,
            agent: SyncAgent::new(&identity.room),
            session: FlightSession::new(config, world),
        })
    }

    pub fn agent(&self) -> &SyncAgent {
        &self.agent
    }

    pub fn session(&self) -> &FlightSession {
        &self.session
    }

    /// Runs the simulation loop, pulling a fresh control snapshot from
    /// `input_source` every frame. Keeps flying single-player after the
    /// relay goes away; runs until the surrounding task is cancelled.
    pub async fn run<F>(&mut self, mut input_source: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: FnMut(&FlightData) -> ControlInput,
    {
        let mut sim_interval = interval(Duration::from_millis(16));
        let mut last_tick = Instant::now();
        let mut frames: u64 = 0;

        loop {
            let online = matches!(
                self.agent.status(),
                ConnectionStatus::Connecting | ConnectionStatus::Connected
            );

            tokio::select! {
                inbound = self.inbound.recv(), if online => {
                    match inbound {
                        Some(Inbound::Packet(packet)) => {
                            if let Some(event) = self.agent.handle_packet(packet) {
                                report_event(&event);
                            }
                        }
                        Some(Inbound::Closed) | None => {
                            self.agent.mark_disconnected(false);
                            warn!("Relay connection closed; continuing single-player");
                        }
                        Some(Inbound::Failed) => {
                            self.agent.mark_disconnected(true);
                            warn!("Relay connection failed; continuing single-player");
                        }
                    }
                },

                _ = sim_interval.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick).as_secs_f32();
                    last_tick = now;

                    let data = self.session.flight_data();
                    let input = input_source(&data);

                    if let Some(reason) = self.session.tick(&input, dt) {
                        info!("Flight over: {:?}", reason);
                    }

                    if self.agent.status() == ConnectionStatus::Connected
                        && self.agent.pose_due(dt)
                    {
                        let packet = Packet::UpdateMovement {
                            pose: self.session.pose(),
                        };
                        if write_packet(&mut self.write, &packet).await.is_err() {
                            self.agent.mark_disconnected(true);
                            warn!("Pose send failed; continuing single-player");
                        }
                    }

                    frames += 1;
                    if frames % 60 == 0 {
                        let data = self.session.flight_data();
                        debug!(
                            "spd {:.0} alt {:.0} hdg {:.0} fuel {:.0} peers {}",
                            data.speed,
                            data.altitude,
                            data.heading,
                            data.fuel,
                            self.agent.remote_players().len()
                        );
                    }
                },
            }
        }
    }

    /// Best-effort voluntary leave before tearing the connection down.
    pub async fn leave(&mut self) {
        let _ = write_packet(&mut self.write, &Packet::Leave).await;
    }

    pub async fn send_chat(&mut self, text: &str) -> std::io::Result<()> {
        write_packet(
            &mut self.write,
            &Packet::Chat {
                text: text.to_string(),
            },
        )
        .await
    }

    pub async fn send_voice_signal(&mut self, peer: u32, data: &str) -> std::io::Result<()> {
        write_packet(
            &mut self.write,
            &Packet::VoiceSignal {
                peer,
                data: data.to_string(),
            },
        )
        .await
    }
}

fn report_event(event: &SyncEvent) {
    match event {
        SyncEvent::Welcomed { id } => info!("Joined as player {}", id),
        SyncEvent::PlayerJoined { id } => info!("Player {} entered the room", id),
        SyncEvent::PlayerLeft { id } => info!("Player {} left the room", id),
        SyncEvent::Chat { name, text, .. } => info!("[{}] {}", name, text),
        SyncEvent::VoiceSignal { from, .. } => debug!("voice signal from {}", from),
    }
}

async fn read_loop(mut read_half: OwnedReadHalf, inbound_tx: UnboundedSender<Inbound>) {
    loop {
        match read_packet(&mut read_half).await {
            Ok(packet) => {
                if inbound_tx.send(Inbound::Packet(packet)).is_err() {
                    return;
                }
            }
            Err(e) => {
                let inbound = if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    Inbound::Closed
                } else {
                    Inbound::Failed
                };
                let _ = inbound_tx.send(inbound);
                return;
            }
        }
    }
}
