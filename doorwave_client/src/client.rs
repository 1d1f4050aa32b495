//! Client session.
//!
//! The client maintains:
//! - One persistent event channel to the authoritative peer
//! - The state store (snapshots, deltas, reveals merge here)
//! - The movement predictor and status-effect tracker
//! - The chat transcript and shop-window collaborators
//! - A console for user commands
//!
//! Everything runs on one cooperative task: inbound events are polled with
//! a short timeout between ticks, so a tick's local mutation and an
//! inbound snapshot interleave in arbitrary order and the store's merge
//! rules absorb either ordering.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::Context;
use doorwave_shared::{
    chat::ChatLog,
    config::ClientConfig,
    math::Vec2,
    net::{EventConn, NetMsg},
    room::{generate_room_code, invite_line, normalize_room_code, DoorId},
    shop::ShopWindow,
};
use tracing::{debug, info, warn};

use crate::{interact, predict::MovementPredictor, status::StatusEffects, store::StateStore};

/// Client connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Welcome received, not in a room yet.
    Connected,
    /// Join request sent; room state flows in via snapshots.
    InRoom,
    /// Channel failed or server went away.
    Closed,
}

/// High-level game client.
pub struct GameClient {
    pub state: SessionState,
    pub store: StateStore,
    pub effects: StatusEffects,
    pub predictor: MovementPredictor,
    pub chat: ChatLog,
    /// Latest shop window, if the server opened one.
    pub shop: Option<ShopWindow>,

    conn: EventConn,
    player_name: String,
    room_code: Option<String>,
}

impl GameClient {
    /// Connects to the server and waits for the identity assignment.
    pub async fn connect(cfg: &ClientConfig) -> anyhow::Result<Self> {
        let server_addr: SocketAddr = cfg.server_addr.parse().context("parse server_addr")?;

        info!(server = %server_addr, "Connecting to server");
        let mut conn = EventConn::connect(server_addr).await?;

        let welcome = conn.recv().await?;
        let id = match welcome {
            NetMsg::Welcome { id } => id,
            other => anyhow::bail!("expected Welcome, got {other:?}"),
        };
        info!(player_id = %id, "Connected to server");

        let mut store = StateStore::new();
        store.set_local_identity(id);

        Ok(Self {
            state: SessionState::Connected,
            store,
            effects: StatusEffects::new(),
            predictor: MovementPredictor::new(),
            chat: ChatLog::default(),
            shop: None,
            conn,
            player_name: cfg.player_name.clone(),
            room_code: None,
        })
    }

    /// Polls the event channel for one message, with a short timeout so
    /// the tick loop never starves.
    pub async fn poll_events(&mut self) -> anyhow::Result<()> {
        match self.conn.recv_timeout(Duration::from_millis(10)).await {
            Ok(Some(msg)) => self.handle_message(msg),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Event channel error");
                self.state = SessionState::Closed;
            }
        }
        Ok(())
    }

    /// The single dispatcher: every inbound event becomes a store/tracker
    /// mutation or a transcript append. Unknown identities and door ids
    /// are dropped inside the store without surfacing.
    fn handle_message(&mut self, msg: NetMsg) {
        match msg {
            NetMsg::RoomUpdate { state } => {
                debug!(phase = %state.phase, players = state.players.len(), "Snapshot");
                self.store.apply_snapshot(state);
            }
            NetMsg::PlayerPos { id, x, y } => {
                self.store.apply_position_delta(&id, x, y);
            }
            NetMsg::RoundStart { wave, doors } => {
                info!(wave, doors = doors.len(), "Round started");
                self.store.apply_round_start(wave, doors);
            }
            NetMsg::DoorReveal { id, kind, by } => {
                debug!(door = %id, ?kind, "Door revealed");
                self.store.apply_door_reveal(id, kind, &by);
            }
            NetMsg::GameEnded { winner } => {
                let text = match winner {
                    Some(name) => format!("{name} wins the game!"),
                    None => "Game ended.".to_string(),
                };
                self.chat.push_system(text);
            }
            NetMsg::ShopStart { ends_at_ms } => {
                info!(ends_at_ms, "Shop opened");
                self.shop = Some(ShopWindow::new(ends_at_ms));
            }
            NetMsg::StatusDance { ms } => {
                self.effects
                    .lock_for(Instant::now(), Duration::from_millis(ms));
            }
            NetMsg::ChatSystem { text } => self.chat.push_system(text),
            NetMsg::ChatLine { from, text } => self.chat.push_message(from, text),
            other => {
                debug!(?other, "Unhandled message");
            }
        }
    }

    /// Requests joining (or creating) a room. Room codes are validated at
    /// this boundary; nothing invalid reaches the store.
    pub async fn join_room(&mut self, raw_code: &str) -> anyhow::Result<String> {
        let code = normalize_room_code(raw_code).context("room code must not be empty")?;
        self.conn
            .send(&NetMsg::JoinRoom {
                room_code: code.clone(),
                name: self.player_name.clone(),
            })
            .await?;
        info!(room = %code, "Joined room");
        self.room_code = Some(code.clone());
        self.state = SessionState::InRoom;
        Ok(code)
    }

    /// Host-only request to begin the round.
    pub async fn start_game(&mut self) -> anyhow::Result<()> {
        self.conn.send(&NetMsg::StartGame).await
    }

    /// Replaces the movement target (pointer click).
    pub fn set_target(&mut self, x: f32, y: f32) {
        self.predictor.set_target(Vec2::new(x, y));
    }

    /// Advances one prediction tick; a tick that moved the avatar emits
    /// the rounded position delta.
    pub async fn tick(&mut self) -> anyhow::Result<()> {
        if let Some((x, y)) = self.predictor.step(&mut self.store) {
            self.conn.send(&NetMsg::PlayerMove { x, y }).await?;
        }
        Ok(())
    }

    /// An activate gesture (double-click / two-point touch): at most one
    /// door-open request, gated on lockout and proximity.
    pub async fn activate(&mut self) -> anyhow::Result<Option<DoorId>> {
        let Some(door_id) = interact::try_open(&self.store, &self.effects, Instant::now()) else {
            return Ok(None);
        };
        self.conn.send(&NetMsg::OpenDoor { door_id }).await?;
        Ok(Some(door_id))
    }

    pub async fn send_chat(&mut self, text: &str) -> anyhow::Result<()> {
        self.conn
            .send(&NetMsg::ChatSend { text: text.into() })
            .await
    }

    pub async fn buy(&mut self, item: &str) -> anyhow::Result<()> {
        self.conn
            .send(&NetMsg::ShopBuy { item: item.into() })
            .await
    }

    pub fn room_code(&self) -> Option<&str> {
        self.room_code.as_deref()
    }

    /// Executes a console command.
    pub async fn exec_console(&mut self, line: &str) -> anyhow::Result<Vec<String>> {
        let line = line.trim();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        match tokens[0] {
            "join" => {
                if tokens.len() < 2 {
                    return Ok(vec!["Usage: join <room-code>".to_string()]);
                }
                match self.join_room(tokens[1]).await {
                    Ok(code) => Ok(vec![format!("Room: {code}")]),
                    Err(e) => Ok(vec![format!("Cannot join: {e}")]),
                }
            }
            "create" => {
                let code = generate_room_code();
                self.join_room(&code).await?;
                Ok(vec![format!("Room: {code}"), invite_line(&code)])
            }
            "start" => {
                if !self.store.is_host() {
                    return Ok(vec!["Only the host can start the round.".to_string()]);
                }
                self.start_game().await?;
                Ok(vec![])
            }
            "goto" => {
                let (Some(x), Some(y)) = (
                    tokens.get(1).and_then(|t| t.parse::<f32>().ok()),
                    tokens.get(2).and_then(|t| t.parse::<f32>().ok()),
                ) else {
                    return Ok(vec!["Usage: goto <x> <y>".to_string()]);
                };
                self.set_target(x, y);
                Ok(vec![])
            }
            "open" => {
                if self.effects.is_locked(Instant::now()) {
                    return Ok(vec!["You are dancing!".to_string()]);
                }
                match self.activate().await? {
                    Some(id) => Ok(vec![format!("Requested door {id}")]),
                    None => Ok(vec!["No openable door in reach.".to_string()]),
                }
            }
            "say" => {
                let text = tokens[1..].join(" ");
                if text.is_empty() {
                    return Ok(vec!["Usage: say <message>".to_string()]);
                }
                self.send_chat(&text).await?;
                Ok(vec![])
            }
            "buy" => {
                if tokens.len() < 2 {
                    return Ok(vec!["Usage: buy <item>".to_string()]);
                }
                self.buy(tokens[1]).await?;
                Ok(vec![])
            }
            "invite" => match self.room_code.as_deref() {
                Some(code) => Ok(vec![invite_line(code)]),
                None => Ok(vec!["Join a room first.".to_string()]),
            },
            "status" => {
                let mut out = Vec::new();
                out.push(format!("State: {:?}", self.state));
                if let Some(id) = self.store.local_id() {
                    out.push(format!("Player ID: {id}"));
                }
                if let Some(code) = &self.room_code {
                    out.push(format!("Room: {code}"));
                }
                out.push(self.store.hud().to_string());
                if let Some(shop) = &self.shop {
                    out.push(shop.label(doorwave_shared::shop::epoch_ms()));
                }
                Ok(out)
            }
            "quit" | "exit" => {
                std::process::exit(0);
            }
            other => Ok(vec![format!(
                "Unknown command: {other} (try join/create/start/goto/open/say/buy/invite/status/quit)"
            )]),
        }
    }
}
