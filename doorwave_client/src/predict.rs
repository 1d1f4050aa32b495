//! Local movement prediction.
//!
//! Each tick the local avatar advances a bounded step along the straight
//! line toward the operator-chosen target. The step is optimistic: it is
//! applied to the store and sent to the server without waiting for an
//! acknowledgment, and the next full snapshot overwrites it wholesale.
//!
//! The per-tick advance is clamped to the remaining distance so the avatar
//! lands on the target instead of oscillating across it.

use doorwave_shared::math::Vec2;

use crate::store::StateStore;

/// Scene units advanced per tick at speed multiplier 1.0.
pub const BASE_STEP: f32 = 3.2;

/// Below this distance the avatar is considered arrived; stops the step
/// and avoids a divide-by-near-zero direction.
pub const MIN_MOVE_DIST: f32 = 1.0;

/// Per-tick straight-line motion toward a target point.
#[derive(Debug, Default)]
pub struct MovementPredictor {
    /// Unset until the first tick with a resolved local player, which
    /// adopts the avatar's own position (stand still until the first
    /// click).
    target: Option<Vec2>,
}

impl MovementPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the target point. No bounds validation; a target outside
    /// the viewport just keeps the avatar walking toward it.
    pub fn set_target(&mut self, target: Vec2) {
        self.target = Some(target);
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Advances one tick. Returns the rounded coordinates to send as a
    /// position delta, or `None` when nothing moved (no resolved local
    /// player yet, or already at the target).
    pub fn step(&mut self, store: &mut StateStore) -> Option<(i32, i32)> {
        let me = store.local_player()?;
        let pos = me.pos();
        let speed = me.speed;

        let target = *self.target.get_or_insert(pos);
        let delta = target - pos;
        let dist = delta.len();
        if dist <= MIN_MOVE_DIST {
            return None;
        }

        let advance = (speed * BASE_STEP).min(dist);
        let next = pos + delta * (advance / dist);

        let me = store.local_player_mut()?;
        me.x = next.x;
        me.y = next.y;
        Some((next.x.round() as i32, next.y.round() as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorwave_shared::room::{Phase, Player, PlayerId, RoomState};

    fn store_with_me(x: f32, y: f32, speed: f32) -> StateStore {
        let mut store = StateStore::new();
        store.set_local_identity(PlayerId("me".into()));
        store.apply_snapshot(RoomState {
            phase: Phase::Round,
            wave: 1,
            players: vec![Player {
                id: PlayerId("me".into()),
                name: "Me".into(),
                x,
                y,
                alive: true,
                coins: 0,
                lives: 3,
                speed,
                skin: None,
            }],
            doors: vec![],
        });
        store
    }

    #[test]
    fn no_local_player_is_a_noop() {
        let mut store = StateStore::new();
        let mut predictor = MovementPredictor::new();
        assert_eq!(predictor.step(&mut store), None);
    }

    #[test]
    fn first_tick_adopts_own_position() {
        let mut store = store_with_me(100.0, 100.0, 1.0);
        let mut predictor = MovementPredictor::new();

        assert_eq!(predictor.step(&mut store), None);
        assert_eq!(predictor.target(), Some(Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn converges_without_overshoot() {
        let mut store = store_with_me(100.0, 100.0, 1.0);
        let mut predictor = MovementPredictor::new();
        predictor.set_target(Vec2::new(400.0, 100.0));

        let mut last_x = 100.0;
        let mut ticks = 0;
        while predictor.step(&mut store).is_some() {
            let me = store.local_player().unwrap();
            assert!(me.x >= last_x, "x must be non-decreasing");
            assert!(me.x <= 400.0, "must not overshoot the target");
            last_x = me.x;
            ticks += 1;
            assert!(ticks < 200, "must converge in a bounded number of ticks");
        }

        let me = store.local_player().unwrap();
        assert!((me.x - 400.0).abs() <= 1.0);
        assert_eq!(me.y, 100.0);

        // Arrived: further ticks no longer move the avatar.
        assert_eq!(predictor.step(&mut store), None);
        let me = store.local_player().unwrap();
        assert!((me.x - 400.0).abs() <= 1.0);
    }

    #[test]
    fn distance_strictly_decreases_each_tick() {
        let mut store = store_with_me(0.0, 0.0, 1.0);
        let mut predictor = MovementPredictor::new();
        let target = Vec2::new(50.0, 80.0);
        predictor.set_target(target);

        let mut prev = store.local_player().unwrap().pos().dist(target);
        for _ in 0..10 {
            predictor.step(&mut store).unwrap();
            let d = store.local_player().unwrap().pos().dist(target);
            assert!(d < prev);
            prev = d;
        }
    }

    #[test]
    fn speed_multiplier_scales_the_step() {
        let mut store = store_with_me(0.0, 0.0, 2.0);
        let mut predictor = MovementPredictor::new();
        predictor.set_target(Vec2::new(100.0, 0.0));

        predictor.step(&mut store).unwrap();
        let me = store.local_player().unwrap();
        assert!((me.x - 2.0 * BASE_STEP).abs() < 1e-4);
    }

    #[test]
    fn emits_rounded_coordinates() {
        let mut store = store_with_me(0.0, 0.0, 1.0);
        let mut predictor = MovementPredictor::new();
        predictor.set_target(Vec2::new(10.0, 10.0));

        // One step along the diagonal: 3.2 / sqrt(2) ≈ 2.26 per axis.
        let sent = predictor.step(&mut store).unwrap();
        assert_eq!(sent, (2, 2));
    }

    #[test]
    fn keeps_predicting_through_stale_me() {
        let mut store = store_with_me(0.0, 0.0, 1.0);
        let mut predictor = MovementPredictor::new();
        predictor.set_target(Vec2::new(100.0, 0.0));
        predictor.step(&mut store).unwrap();

        // A snapshot without us arrives; prediction degrades to the stale
        // fallback instead of failing.
        store.apply_snapshot(RoomState::default());
        assert!(predictor.step(&mut store).is_some());
    }
}
