//! State store.
//!
//! The single mutable view of room/game state, fed by three update streams:
//! full snapshots, per-player position deltas, and door reveals. Merge
//! rules:
//! - A full snapshot wins over everything, including local prediction.
//! - A delta for an identity the store does not hold is dropped silently
//!   (the entity was removed by a newer snapshot).
//! - A reveal is first-write-wins; an opened door never reverts.
//!
//! "Me" resolution is eventually consistent: when a snapshot omits the
//! local identity, the previous local player is retained as a stale
//! fallback instead of going null, so prediction and the HUD keep a
//! subject until the next snapshot settles it.

use doorwave_shared::room::{Door, DoorId, DoorKind, Phase, Player, PlayerId, RoomState};

/// Client-held room state plus the local identity.
#[derive(Debug, Default)]
pub struct StateStore {
    state: RoomState,
    local_id: Option<PlayerId>,
    /// Last resolved local player, kept when a snapshot omits us.
    stale_me: Option<Player>,
    needs_redraw: bool,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the identity assigned at connection time. Immutable for the
    /// life of the session.
    pub fn set_local_identity(&mut self, id: PlayerId) {
        self.local_id = Some(id);
    }

    pub fn local_id(&self) -> Option<&PlayerId> {
        self.local_id.as_ref()
    }

    pub fn state(&self) -> &RoomState {
        &self.state
    }

    /// Full replacement of the room state. The server is authoritative on
    /// every field; any pending local prediction is discarded with the old
    /// player list.
    pub fn apply_snapshot(&mut self, new_state: RoomState) {
        if let Some(me) = self.local_player().cloned() {
            self.stale_me = Some(me);
        }
        self.state = new_state;
        self.needs_redraw = true;
    }

    /// Updates one player's position by identity. No-op if the identity is
    /// not currently present; a concurrent snapshot already removed it and
    /// the snapshot wins.
    pub fn apply_position_delta(&mut self, id: &PlayerId, x: f32, y: f32) {
        if let Some(p) = self.state.player_mut(id) {
            p.x = x;
            p.y = y;
            self.needs_redraw = true;
        }
    }

    /// Sets the wave number and door list for a starting round. Phase and
    /// player list are left to the next snapshot.
    pub fn apply_round_start(&mut self, wave: u32, doors: Vec<Door>) {
        self.state.wave = wave;
        self.state.doors = doors;
        self.needs_redraw = true;
    }

    /// Discloses a door's contents and opener. No-op for unknown door ids
    /// (the reveal raced a snapshot without that door) and for doors that
    /// already have an opener.
    pub fn apply_door_reveal(&mut self, id: DoorId, kind: DoorKind, by: &PlayerId) {
        if let Some(door) = self.state.door_mut(id) {
            if door.opened_by.is_none() {
                door.kind = Some(kind);
                door.opened_by = Some(by.clone());
                self.needs_redraw = true;
            }
        }
    }

    /// The local player: the live list entry when present, otherwise the
    /// stale fallback from before the last snapshot.
    pub fn local_player(&self) -> Option<&Player> {
        let id = self.local_id.as_ref()?;
        self.state.player(id).or(self.stale_me.as_ref())
    }

    /// Mutable access for the movement predictor.
    pub fn local_player_mut(&mut self) -> Option<&mut Player> {
        let id = self.local_id.as_ref()?;
        if self.state.players.iter().any(|p| &p.id == id) {
            self.state.players.iter_mut().find(|p| &p.id == id)
        } else {
            self.stale_me.as_mut()
        }
    }

    /// Whether the local player is the host (first entry in list order).
    pub fn is_host(&self) -> bool {
        self.local_id
            .as_ref()
            .is_some_and(|id| self.state.is_host(id))
    }

    /// Consumes the redraw hint set by the last successful mutation.
    /// Freshness only; the render loop redraws every tick regardless.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Summary fields for the HUD collaborator.
    pub fn hud(&self) -> HudSummary {
        let me = self.local_player();
        HudSummary {
            phase: self.state.phase,
            wave: self.state.wave,
            coins: me.map(|p| p.coins),
            lives: me.map(|p| p.lives),
            speed: me.map(|p| p.speed),
        }
    }
}

/// The summary fields the HUD shows alongside the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudSummary {
    pub phase: Phase,
    pub wave: u32,
    pub coins: Option<u32>,
    pub lives: Option<i32>,
    pub speed: Option<f32>,
}

impl std::fmt::Display for HudSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "phase {} | wave {}", self.phase, self.wave)?;
        if let (Some(coins), Some(lives), Some(speed)) = (self.coins, self.lives, self.speed) {
            write!(f, " | {coins}c | {lives} lives | {speed:.2}x")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, x: f32, y: f32) -> Player {
        Player {
            id: PlayerId(id.to_string()),
            name: id.to_string(),
            x,
            y,
            alive: true,
            coins: 0,
            lives: 3,
            speed: 1.0,
            skin: None,
        }
    }

    fn door(id: u32, x: f32, y: f32) -> Door {
        Door {
            id: DoorId(id),
            x,
            y,
            kind: None,
            opened_by: None,
        }
    }

    fn store_with(players: Vec<Player>, local: &str) -> StateStore {
        let mut store = StateStore::new();
        store.set_local_identity(PlayerId(local.to_string()));
        store.apply_snapshot(RoomState {
            phase: Phase::Round,
            wave: 1,
            players,
            doors: vec![],
        });
        store
    }

    #[test]
    fn snapshot_replaces_everything() {
        let mut store = store_with(vec![player("a", 0.0, 0.0)], "a");
        store.apply_snapshot(RoomState {
            phase: Phase::Shop,
            wave: 3,
            players: vec![player("a", 50.0, 60.0), player("b", 1.0, 1.0)],
            doors: vec![door(1, 10.0, 10.0)],
        });

        assert_eq!(store.state().phase, Phase::Shop);
        assert_eq!(store.state().wave, 3);
        assert_eq!(store.state().players.len(), 2);
        assert_eq!(store.state().doors.len(), 1);
        // Snapshot overrides the predicted position.
        let me = store.local_player().unwrap();
        assert_eq!((me.x, me.y), (50.0, 60.0));
    }

    #[test]
    fn snapshot_missing_me_keeps_stale_reference() {
        let mut store = store_with(vec![player("a", 5.0, 6.0)], "a");
        store.apply_snapshot(RoomState {
            phase: Phase::Round,
            wave: 2,
            players: vec![player("b", 0.0, 0.0)],
            doors: vec![],
        });

        // "a" is gone from the list but the store still resolves a subject.
        let me = store.local_player().unwrap();
        assert_eq!(me.id, PlayerId("a".into()));
        assert_eq!((me.x, me.y), (5.0, 6.0));

        // A later snapshot that includes us wins again.
        store.apply_snapshot(RoomState {
            phase: Phase::Round,
            wave: 2,
            players: vec![player("a", 9.0, 9.0)],
            doors: vec![],
        });
        let me = store.local_player().unwrap();
        assert_eq!((me.x, me.y), (9.0, 9.0));
    }

    #[test]
    fn delta_for_unknown_identity_is_dropped() {
        let mut store = store_with(vec![player("a", 0.0, 0.0)], "a");
        store.apply_position_delta(&PlayerId("b".into()), 5.0, 5.0);

        assert_eq!(store.state().players.len(), 1);
        let me = store.local_player().unwrap();
        assert_eq!((me.x, me.y), (0.0, 0.0));
    }

    #[test]
    fn delta_moves_existing_player() {
        let mut store = store_with(vec![player("a", 0.0, 0.0), player("b", 1.0, 1.0)], "a");
        store.apply_position_delta(&PlayerId("b".into()), 42.0, 7.0);

        let b = store.state().player(&PlayerId("b".into())).unwrap();
        assert_eq!((b.x, b.y), (42.0, 7.0));
    }

    #[test]
    fn round_start_sets_wave_and_doors_only() {
        let mut store = store_with(vec![player("a", 0.0, 0.0)], "a");
        store.apply_round_start(4, vec![door(1, 10.0, 10.0), door(2, 20.0, 20.0)]);

        assert_eq!(store.state().wave, 4);
        assert_eq!(store.state().doors.len(), 2);
        assert_eq!(store.state().phase, Phase::Round);
        assert_eq!(store.state().players.len(), 1);
    }

    #[test]
    fn reveal_unknown_door_is_dropped() {
        let mut store = store_with(vec![player("a", 0.0, 0.0)], "a");
        store.apply_door_reveal(DoorId(9), DoorKind::Treasure, &PlayerId("a".into()));
        assert!(store.state().doors.is_empty());
    }

    #[test]
    fn reveal_is_first_write_wins() {
        let mut store = store_with(vec![player("a", 0.0, 0.0)], "a");
        store.apply_round_start(1, vec![door(1, 10.0, 10.0)]);

        store.apply_door_reveal(DoorId(1), DoorKind::Treasure, &PlayerId("a".into()));
        store.apply_door_reveal(DoorId(1), DoorKind::Death, &PlayerId("b".into()));

        let d = &store.state().doors[0];
        assert_eq!(d.kind, Some(DoorKind::Treasure));
        assert_eq!(d.opened_by, Some(PlayerId("a".into())));
    }

    #[test]
    fn host_follows_list_order_across_snapshots() {
        let mut store = store_with(vec![player("a", 0.0, 0.0), player("b", 0.0, 0.0)], "a");
        assert!(store.is_host());

        store.apply_snapshot(RoomState {
            phase: Phase::Lobby,
            wave: 0,
            players: vec![player("b", 0.0, 0.0), player("a", 0.0, 0.0)],
            doors: vec![],
        });
        assert!(!store.is_host());
    }

    #[test]
    fn mutations_set_redraw_hint() {
        let mut store = store_with(vec![player("a", 0.0, 0.0)], "a");
        assert!(store.take_redraw());
        assert!(!store.take_redraw());

        store.apply_position_delta(&PlayerId("a".into()), 1.0, 1.0);
        assert!(store.take_redraw());

        // Dropped delta is not a meaningful change.
        store.apply_position_delta(&PlayerId("zz".into()), 1.0, 1.0);
        assert!(!store.take_redraw());
    }

    #[test]
    fn hud_summary_formats_local_fields() {
        let mut me = player("a", 0.0, 0.0);
        me.coins = 7;
        me.lives = 2;
        me.speed = 1.25;
        let store = store_with(vec![me], "a");

        let hud = store.hud();
        assert_eq!(hud.to_string(), "phase round | wave 1 | 7c | 2 lives | 1.25x");

        let empty = StateStore::new();
        assert_eq!(empty.hud().to_string(), "phase lobby | wave 0");
    }
}
