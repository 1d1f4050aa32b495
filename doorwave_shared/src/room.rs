//! Room and game state model.
//!
//! These are the types the server replicates to clients. The server is the
//! only authority: clients never create or remove players, they only merge
//! what arrives over the wire (full snapshots win over per-field deltas).
//!
//! Host rule: the first player in `RoomState::players` is the host.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Identifies a connected player. Assigned by the server per connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a door within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DoorId(pub u32);

impl std::fmt::Display for DoorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What a door turns out to contain once opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorKind {
    Death,
    TreasureBig,
    ExtraLife,
    KingOutfit,
    Treasure,
    Speed,
    Clue,
    Swap,
    Dance,
    Portal,
    Safe,
}

/// A door in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub id: DoorId,
    pub x: f32,
    pub y: f32,
    /// Revealed contents. `None` until the server discloses them.
    #[serde(default)]
    pub kind: Option<DoorKind>,
    /// Who opened this door. `None` means unopened; once set it never
    /// changes for the rest of the round.
    #[serde(default)]
    pub opened_by: Option<PlayerId>,
}

impl Door {
    pub fn is_opened(&self) -> bool {
        self.opened_by.is_some()
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// A player as replicated by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub alive: bool,
    pub coins: u32,
    pub lives: i32,
    /// Movement speed multiplier.
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Cosmetic skin tag, e.g. `"king"`.
    #[serde(default)]
    pub skin: Option<String>,
}

fn default_speed() -> f32 {
    1.0
}

/// Skin tag that selects the crown overlay.
pub const KING_SKIN: &str = "king";

impl Player {
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn is_king(&self) -> bool {
        self.skin.as_deref() == Some(KING_SKIN)
    }
}

/// Room lifecycle phase. The server owns the transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Lobby,
    Round,
    Shop,
    Ended,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Lobby => "lobby",
            Phase::Round => "round",
            Phase::Shop => "shop",
            Phase::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// Complete replicated room state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RoomState {
    pub phase: Phase,
    pub wave: u32,
    /// Player list; list order is meaningful (first entry is host).
    pub players: Vec<Player>,
    /// Doors for the current round; empty outside rounds.
    #[serde(default)]
    pub doors: Vec<Door>,
}

impl RoomState {
    /// Finds a player by id.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Finds a player by id, mutably.
    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    /// Finds a door by id, mutably.
    pub fn door_mut(&mut self, id: DoorId) -> Option<&mut Door> {
        self.doors.iter_mut().find(|d| d.id == id)
    }

    /// Whether `id` is the host (first entry in list order).
    pub fn is_host(&self, id: &PlayerId) -> bool {
        self.players.first().map(|p| &p.id) == Some(id)
    }
}

/// Room-code alphabet. Skips 0/O, 1/I/L to keep codes readable aloud.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
/// Room-code length.
pub const ROOM_CODE_LEN: usize = 4;

/// Generates a fresh room code.
pub fn generate_room_code() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Normalizes operator-entered room codes at the interaction boundary.
/// Returns `None` for empty input; the caller surfaces the notice.
pub fn normalize_room_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_uppercase();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

/// Share text for inviting another player into a room.
pub fn invite_line(room_code: &str) -> String {
    format!("Join with room code {room_code}")
}
