//! Relay network layer: connection lifecycle and room-scoped fan-out.
//!
//! The relay never simulates physics and never inspects poses; it is a pure
//! fan-out hub. One select loop owns the registry, per-connection reader
//! tasks funnel packets into it over a channel, and per-connection writer
//! tasks drain outbound queues, so no state is ever shared across tasks.

use std::collections::HashMap;
use std::net::SocketAddr;

use log::{debug, info, warn};
use shared::framing::{read_packet, write_packet};
use shared::{Packet, Pose, Skin};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::registry::RoomRegistry;

/// Events funneled from connection tasks into the relay loop.
#[derive(Debug)]
pub enum ServerEvent {
    PacketReceived { conn_id: u32, packet: Packet },
    Disconnected { conn_id: u32 },
}

/// The relay server: listener, membership registry and live connections.
pub struct RelayServer {
    listener: TcpListener,
    registry: RoomRegistry,
    /// Outbound queues for every live connection, joined or not.
    connections: HashMap<u32, UnboundedSender<Packet>>,
    next_conn_id: u32,
    event_tx: UnboundedSender<ServerEvent>,
    event_rx: UnboundedReceiver<ServerEvent>,
}

impl RelayServer {
    pub async fn bind(addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("relay listening on {}", listener.local_addr()?);

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok(Self {
            listener,
            registry: RoomRegistry::new(),
            connections: HashMap::new(),
            next_conn_id: 1,
            event_tx,
            event_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the relay until the process is stopped.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.accept_connection(stream, addr),
                        Err(e) => warn!("accept failed: {}", e),
                    }
                },

                event = self.event_rx.recv() => {
                    match event {
                        Some(ServerEvent::PacketReceived { conn_id, packet }) => {
                            self.handle_packet(conn_id, packet);
                        }
                        Some(ServerEvent::Disconnected { conn_id }) => {
                            self.drop_connection(conn_id);
                        }
                        None => break,
                    }
                },
            }
        }

        Ok(())
    }

    fn accept_connection(&mut self, stream: TcpStream, addr: SocketAddr) {
        let conn_id = self.next_conn_id;
        self.next_conn_id += 1;
        info!("connection {} accepted from {}", conn_id, addr);

        let (read_half, mut write_half) = stream.into_split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Packet>();

        // Writer task: sole owner of the write half.
        tokio::spawn(async move {
            while let Some(packet) = outbound_rx.recv().await {
                if write_packet(&mut write_half, &packet).await.is_err() {
                    break;
                }
            }
        });

        // Reader task: forwards inbound packets, then reports the close.
        let event_tx = self.event_tx.clone();
        tokio::spawn(read_loop(conn_id, read_half, event_tx));

        let _ = outbound_tx.send(Packet::Welcome { id: conn_id });
        self.connections.insert(conn_id, outbound_tx);
    }

    fn handle_packet(&mut self, conn_id: u32, packet: Packet) {
        match packet {
            Packet::Join { name, skin, room } => self.handle_join(conn_id, name, skin, room),
            Packet::UpdateMovement { pose } => self.handle_movement(conn_id, pose),
            Packet::Chat { text } => self.handle_chat(conn_id, text),
            Packet::VoiceSignal { peer, data } => self.handle_voice(conn_id, peer, data),
            Packet::Leave => self.unregister(conn_id),
            other => {
                warn!("unexpected packet from connection {}: {:?}", conn_id, other);
            }
        }
    }

    fn handle_join(&mut self, conn_id: u32, name: String, skin: Skin, room: String) {
        if self.registry.contains(conn_id) {
            debug!("duplicate join from connection {}", conn_id);
            return;
        }
        let Some(outbound) = self.connections.get(&conn_id) else {
            return;
        };

        let record = self
            .registry
            .register(conn_id, name, skin, room, outbound.clone());

        // Snapshot for the joiner, join notice for everyone else in the room.
        self.registry.send_to(
            conn_id,
            Packet::CurrentPlayers {
                players: self.registry.snapshot(&record.room),
            },
        );
        self.registry.broadcast_room(
            &record.room,
            &Packet::PlayerJoined {
                player: record.clone(),
            },
            Some(conn_id),
        );
    }

    fn handle_movement(&mut self, conn_id: u32, pose: Pose) {
        // Movement before join is silently dropped.
        if !self.registry.update_pose(conn_id, pose) {
            return;
        }

        let room = self
            .registry
            .record(conn_id)
            .map(|record| record.room.clone());
        if let Some(room) = room {
            self.registry.broadcast_room(
                &room,
                &Packet::PlayerMoved { id: conn_id, pose },
                Some(conn_id),
            );
        }
    }

    fn handle_chat(&mut self, conn_id: u32, text: String) {
        let Some(record) = self.registry.record(conn_id) else {
            debug!("chat from connection {} before join", conn_id);
            return;
        };

        let packet = Packet::ChatBroadcast {
            id: conn_id,
            name: record.name.clone(),
            text,
        };
        let room = record.room.clone();
        // Echoed to the sender as well.
        self.registry.broadcast_room(&room, &packet, None);
    }

    /// Store-less forward to the named connection only, never broadcast.
    /// The outbound `peer` becomes the origin id on delivery.
    fn handle_voice(&mut self, conn_id: u32, peer: u32, data: String) {
        match self.connections.get(&peer) {
            Some(outbound) => {
                let _ = outbound.send(Packet::VoiceSignal {
                    peer: conn_id,
                    data,
                });
            }
            None => debug!(
                "voice signal from {} to unknown connection {}",
                conn_id, peer
            ),
        }
    }

    fn drop_connection(&mut self, conn_id: u32) {
        info!("connection {} closed", conn_id);
        self.connections.remove(&conn_id);
        self.unregister(conn_id);
    }

    /// Removes the player and tells the room. Safe to call for connections
    /// that never joined.
    fn unregister(&mut self, conn_id: u32) {
        if let Some(record) = self.registry.remove(conn_id) {
            self.registry
                .broadcast_room(&record.room, &Packet::PlayerLeft { id: conn_id }, None);
        }
    }
}

async fn read_loop(
    conn_id: u32,
    mut read_half: OwnedReadHalf,
    event_tx: UnboundedSender<ServerEvent>,
) {
    loop {
        match read_packet(&mut read_half).await {
            Ok(packet) => {
                if event_tx
                    .send(ServerEvent::PacketReceived { conn_id, packet })
                    .is_err()
                {
                    return;
                }
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::UnexpectedEof {
                    debug!("connection {} read error: {}", conn_id, e);
                }
                let _ = event_tx.send(ServerEvent::Disconnected { conn_id });
                return;
            }
        }
    }
}
