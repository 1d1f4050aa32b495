//! Door interaction gating.
//!
//! A discrete "activate" gesture becomes at most one door-open request,
//! gated at the instant of the gesture: no active dance lockout, and an
//! unopened door within reach of the local player. The server decides the
//! outcome; nothing is opened optimistically on this side.

use std::time::Instant;

use doorwave_shared::math::Vec2;
use doorwave_shared::room::{DoorId, RoomState};

use crate::status::StatusEffects;
use crate::store::StateStore;

/// Maximum distance at which a door can be activated.
pub const INTERACT_RADIUS: f32 = 90.0;

/// The nearest unopened door within reach of `from`. Ties on distance
/// break toward the lowest door id, so the pick is deterministic.
pub fn nearest_openable_door(state: &RoomState, from: Vec2) -> Option<DoorId> {
    state
        .doors
        .iter()
        .filter(|d| !d.is_opened())
        .map(|d| (d.pos().dist(from), d.id))
        .filter(|(dist, _)| *dist <= INTERACT_RADIUS)
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, id)| id)
}

/// Evaluates an activate gesture. Returns the door to request, or `None`
/// when the gesture is suppressed (lockout, unresolved local player, or
/// no qualifying door).
pub fn try_open(store: &StateStore, effects: &StatusEffects, now: Instant) -> Option<DoorId> {
    if effects.is_locked(now) {
        return None;
    }
    let me = store.local_player()?;
    nearest_openable_door(store.state(), me.pos())
}
