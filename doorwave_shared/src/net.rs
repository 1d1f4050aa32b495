//! Networking primitives.
//!
//! Goals:
//! - One persistent bidirectional event channel per session (TCP,
//!   length-prefixed JSON frames).
//! - One message envelope carrying the full event catalog in both
//!   directions.
//! - Keep serialization explicit and versionable.
//!
//! The client never opens a second socket; snapshots, deltas and requests
//! all share the channel and interleave with the local tick loop.

use anyhow::Context;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    time,
};

use crate::room::{Door, DoorId, DoorKind, PlayerId, RoomState};

/// High-level message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum NetMsg {
    // ─── Server → client ───
    /// Connection accepted; assigns the local identity for this session.
    Welcome {
        id: PlayerId,
    },
    /// Full room snapshot. Replaces all client-held room state.
    RoomUpdate {
        state: RoomState,
    },
    /// Per-player position delta on top of the last snapshot.
    PlayerPos {
        id: PlayerId,
        x: f32,
        y: f32,
    },
    /// A round begins: wave number and the fresh door list.
    RoundStart {
        wave: u32,
        doors: Vec<Door>,
    },
    /// A door's contents and opener are disclosed.
    DoorReveal {
        id: DoorId,
        kind: DoorKind,
        by: PlayerId,
    },
    /// The game is over; `winner` is the winning player's name, if any.
    GameEnded {
        winner: Option<String>,
    },
    /// A timed purchase window opens, closing at `ends_at_ms` (epoch ms).
    ShopStart {
        ends_at_ms: u64,
    },
    /// Movement lockout: the local player dances for `ms` from receipt.
    StatusDance {
        ms: u64,
    },
    /// Server-originated transcript line.
    ChatSystem {
        text: String,
    },
    /// Player-originated transcript line.
    ChatLine {
        from: String,
        text: String,
    },

    // ─── Client → server ───
    /// Join (or create) a room by code.
    JoinRoom {
        room_code: String,
        name: String,
    },
    /// Host-only request to begin the round.
    StartGame,
    /// Predicted local position, rounded to integers.
    PlayerMove {
        x: i32,
        y: i32,
    },
    /// Ask the server to open a door near the local player.
    OpenDoor {
        door_id: DoorId,
    },
    /// Purchase request during a shop window.
    ShopBuy {
        item: String,
    },
    /// Outgoing chat text.
    ChatSend {
        text: String,
    },
}

/// The persistent event channel: TCP with length-prefixed JSON frames.
#[derive(Debug)]
pub struct EventConn {
    stream: TcpStream,
}

impl EventConn {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Connects to the authoritative peer.
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await.context("tcp connect")?;
        Ok(Self::new(stream))
    }

    pub async fn send(&mut self, msg: &NetMsg) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(msg).context("serialize msg")?;
        let mut buf = BytesMut::with_capacity(4 + payload.len());
        buf.put_u32(payload.len() as u32);
        buf.extend_from_slice(&payload);
        self.stream.write_all(&buf).await.context("tcp write")?;
        Ok(())
    }

    pub async fn recv(&mut self) -> anyhow::Result<NetMsg> {
        let mut len_buf = [0u8; 4];
        self.stream
            .read_exact(&mut len_buf)
            .await
            .context("tcp read len")?;
        let len = u32::from_be_bytes(len_buf) as usize;
        let mut payload = vec![0u8; len];
        self.stream
            .read_exact(&mut payload)
            .await
            .context("tcp read payload")?;
        let msg = serde_json::from_slice(&payload).context("deserialize msg")?;
        Ok(msg)
    }

    /// Receives a message within the given timeout, so callers can
    /// interleave receives with a tick loop without blocking it.
    pub async fn recv_timeout(
        &mut self,
        timeout: std::time::Duration,
    ) -> anyhow::Result<Option<NetMsg>> {
        match time::timeout(timeout, self.recv()).await {
            Ok(Ok(msg)) => Ok(Some(msg)),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None),
        }
    }

    pub fn peer_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }
}

/// Accept half of the event channel. The room server (out of scope here)
/// and the integration tests sit on this end.
pub struct EventListener {
    listener: TcpListener,
}

impl EventListener {
    pub async fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await.context("tcp bind")?;
        Ok(Self { listener })
    }

    pub async fn accept(&self) -> anyhow::Result<(EventConn, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await.context("tcp accept")?;
        Ok((EventConn::new(stream), addr))
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

/// Convenience codec helpers.
pub fn encode_to_bytes(msg: &NetMsg) -> anyhow::Result<Bytes> {
    let payload = serde_json::to_vec(msg).context("serialize")?;
    Ok(Bytes::from(payload))
}

pub fn decode_from_bytes(b: &[u8]) -> anyhow::Result<NetMsg> {
    serde_json::from_slice(b).context("deserialize")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::{Phase, Player};

    fn roundtrip(msg: NetMsg) {
        let bytes = encode_to_bytes(&msg).unwrap();
        let back = decode_from_bytes(&bytes).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn netmsg_roundtrip_bytes() {
        roundtrip(NetMsg::Welcome {
            id: PlayerId("conn-1".into()),
        });
        roundtrip(NetMsg::PlayerPos {
            id: PlayerId("conn-1".into()),
            x: 12.5,
            y: -3.0,
        });
        roundtrip(NetMsg::DoorReveal {
            id: DoorId(4),
            kind: DoorKind::TreasureBig,
            by: PlayerId("conn-2".into()),
        });
        roundtrip(NetMsg::GameEnded { winner: None });
        roundtrip(NetMsg::StatusDance { ms: 2000 });
        roundtrip(NetMsg::JoinRoom {
            room_code: "AB2C".into(),
            name: "Player".into(),
        });
        roundtrip(NetMsg::StartGame);
        roundtrip(NetMsg::PlayerMove { x: 600, y: 650 });
    }

    #[test]
    fn room_update_roundtrip() {
        let state = RoomState {
            phase: Phase::Round,
            wave: 3,
            players: vec![Player {
                id: PlayerId("a".into()),
                name: "Alice".into(),
                x: 100.0,
                y: 200.0,
                alive: true,
                coins: 7,
                lives: 2,
                speed: 1.25,
                skin: Some("king".into()),
            }],
            doors: vec![Door {
                id: DoorId(1),
                x: 300.0,
                y: 140.0,
                kind: None,
                opened_by: None,
            }],
        };
        roundtrip(NetMsg::RoomUpdate { state });
    }

    #[test]
    fn phase_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&Phase::Lobby).unwrap();
        assert_eq!(json, "\"lobby\"");
    }
}
