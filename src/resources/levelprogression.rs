//! Dungeon depth progression and per-level step budgets.
//!
//! [`LevelProgression`] keeps a stack of [`LevelRecord`]s, one per entered
//! depth; the top of the stack is always the active level. Descending pushes
//! a record, discarding an attempt (reset, exhausted budget, failed
//! population) pops the top so the next build pushes a fresh one.

use bevy_ecs::prelude::Resource;
use log::{debug, info};

use crate::resources::leveldata::Room;

/// Grid width/height added on top of the depth.
pub const LEVEL_SIZE_BASE: u32 = 9;

/// Grid size for a depth: both sides are `depth + 9`.
pub fn level_size(depth: u32) -> (u32, u32) {
    let side = depth + LEVEL_SIZE_BASE;
    (side, side)
}

/// Orthographic camera size that frames a grid of the given size.
pub fn camera_ortho_size(width: u32, height: u32) -> f32 {
    (width.max(height) as f32).sqrt()
}

/// Step budget for a generated layout.
///
/// Sums the distance from every room centre to `origin` (each distance
/// truncated to whole steps), then
/// `clamp(sum / depth * rooms, depth + rooms, sum + depth + rooms)`
/// in integer arithmetic.
pub fn maximum_steps(depth: u32, rooms: &[Room], origin: (f32, f32)) -> i32 {
    let depth = depth.max(1) as i32;
    let count = rooms.len() as i32;
    let sum: i32 = rooms
        .iter()
        .map(|room| {
            let (x, y) = room.center();
            (x - origin.0).hypot(y - origin.1) as i32
        })
        .sum();
    (sum / depth * count).clamp(depth + count, sum + depth + count)
}

/// State of one entered dungeon level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRecord {
    id: u32,
    steps_taken: i32,
    maximum_steps: i32,
}

impl LevelRecord {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            steps_taken: 0,
            maximum_steps: 0,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn steps_taken(&self) -> i32 {
        self.steps_taken
    }

    pub fn maximum_steps(&self) -> i32 {
        self.maximum_steps
    }

    pub fn steps_left(&self) -> i32 {
        self.maximum_steps - self.steps_taken
    }

    pub fn step_taken(&mut self) {
        self.steps_taken += 1;
    }

    pub fn size(&self) -> (u32, u32) {
        level_size(self.id)
    }

    /// Recompute the budget from the generated rooms and reset the step count.
    pub fn set_maximum_steps(&mut self, rooms: &[Room], origin: (f32, f32)) {
        self.steps_taken = 0;
        self.maximum_steps = maximum_steps(self.id, rooms, origin);
    }
}

/// Depth counter, level stack and retry accounting.
#[derive(Resource, Debug, Clone)]
pub struct LevelProgression {
    depth: u32,
    levels: Vec<LevelRecord>,
    failed_attempts: u32,
    max_attempts: u32,
}

impl Default for LevelProgression {
    fn default() -> Self {
        Self::new(1, 8)
    }
}

impl LevelProgression {
    /// `start_depth` is clamped to at least 1; `max_attempts` to at least 1.
    pub fn new(start_depth: u32, max_attempts: u32) -> Self {
        Self {
            depth: start_depth.max(1),
            levels: Vec::new(),
            failed_attempts: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn current(&self) -> Option<&LevelRecord> {
        self.levels.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut LevelRecord> {
        self.levels.last_mut()
    }

    pub fn stack_len(&self) -> usize {
        self.levels.len()
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Active record for the current depth, pushing a new one when the top
    /// of the stack belongs to another depth (or the stack is empty).
    pub fn begin_level(&mut self) -> &LevelRecord {
        let reuse = self.levels.last().is_some_and(|r| r.id() == self.depth);
        if !reuse {
            debug!("Pushing level record for depth {}", self.depth);
            self.levels.push(LevelRecord::new(self.depth));
        }
        &self.levels[self.levels.len() - 1]
    }

    /// Pop the active record so the next [`begin_level`](Self::begin_level) starts fresh.
    pub fn discard_current(&mut self) -> Option<LevelRecord> {
        let discarded = self.levels.pop();
        if let Some(record) = &discarded {
            debug!("Discarded level record for depth {}", record.id());
        }
        discarded
    }

    /// Move one level deeper.
    pub fn advance(&mut self) {
        self.depth += 1;
        self.failed_attempts = 0;
        info!("Descending to dungeon level {}", self.depth);
    }

    /// Population succeeded: compute the step budget and clear the retry count.
    pub fn level_populated(&mut self, rooms: &[Room], origin: (f32, f32)) {
        self.failed_attempts = 0;
        if let Some(record) = self.levels.last_mut() {
            record.set_maximum_steps(rooms, origin);
            info!(
                "Dungeon level {} ready: {} rooms, {} steps",
                record.id(),
                rooms.len(),
                record.maximum_steps()
            );
        }
    }

    /// Count a failed population. Returns `true` while another attempt is allowed.
    pub fn register_failed_attempt(&mut self) -> bool {
        self.failed_attempts += 1;
        self.failed_attempts < self.max_attempts
    }

    /// Forget earlier failures, e.g. after an explicit reset of a failed depth.
    pub fn reset_attempts(&mut self) {
        self.failed_attempts = 0;
    }

    pub fn step_taken(&mut self) {
        if let Some(record) = self.levels.last_mut() {
            record.step_taken();
        }
    }

    pub fn steps_left(&self) -> i32 {
        self.current().map(|r| r.steps_left()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_room() -> Vec<Room> {
        vec![Room::new(0, 0, 5, 5)]
    }

    #[test]
    fn test_level_size_grows_with_depth() {
        assert_eq!(level_size(1), (10, 10));
        assert_eq!(level_size(7), (16, 16));
    }

    #[test]
    fn test_camera_ortho_size() {
        assert!((camera_ortho_size(16, 9) - 4.0).abs() < 1e-6);
        assert!((camera_ortho_size(10, 10) - 10f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_maximum_steps_single_room_depth_one() {
        // centre (2.5, 2.5) -> distance 3.53 -> 3
        let sum = 3;
        let expected = (sum / 1 * 1).clamp(1 + 1, sum + 1 + 1);
        assert_eq!(maximum_steps(1, &one_room(), (0.0, 0.0)), expected);
        assert_eq!(expected, 3);
    }

    #[test]
    fn test_maximum_steps_respects_lower_bound() {
        // distance sum 3, depth 5: 3 / 5 * 1 = 0 -> clamped to 5 + 1
        assert_eq!(maximum_steps(5, &one_room(), (0.0, 0.0)), 6);
    }

    #[test]
    fn test_maximum_steps_respects_upper_bound() {
        let rooms = vec![
            Room::new(10, 10, 2, 2),
            Room::new(20, 20, 2, 2),
            Room::new(30, 30, 2, 2),
        ];
        // distances 15, 29, 43 -> sum 87; 87 * 3 = 261 > 87 + 1 + 3
        assert_eq!(maximum_steps(1, &rooms, (0.0, 0.0)), 91);
    }

    #[test]
    fn test_maximum_steps_monotonic_in_rooms_bounded_by_depth() {
        let rooms = vec![
            Room::new(1, 1, 3, 3),
            Room::new(6, 2, 2, 4),
            Room::new(3, 8, 4, 2),
            Room::new(9, 9, 2, 2),
        ];
        for depth in 1..12 {
            for n in 1..rooms.len() {
                let fewer = maximum_steps(depth, &rooms[..n], (0.0, 0.0));
                let more = maximum_steps(depth, &rooms[..n + 1], (0.0, 0.0));
                assert!(more >= fewer, "depth {depth}, rooms {n}");
            }
        }
        for n in 1..=rooms.len() {
            let budgets: Vec<i32> = (1..12)
                .map(|d| maximum_steps(d, &rooms[..n], (0.0, 0.0)))
                .collect();
            for (d, b) in budgets.iter().enumerate() {
                let depth = d as i32 + 1;
                let count = n as i32;
                assert!(*b >= depth + count);
            }
        }
    }

    #[test]
    fn test_maximum_steps_without_rooms_is_depth() {
        assert_eq!(maximum_steps(4, &[], (0.0, 0.0)), 4);
    }

    #[test]
    fn test_set_maximum_steps_resets_steps_taken() {
        let mut record = LevelRecord::new(1);
        record.step_taken();
        record.step_taken();
        assert_eq!(record.steps_taken(), 2);
        record.set_maximum_steps(&one_room(), (0.0, 0.0));
        assert_eq!(record.steps_taken(), 0);
        assert_eq!(record.steps_left(), 3);
        record.step_taken();
        assert_eq!(record.steps_left(), 2);
    }

    #[test]
    fn test_begin_level_reuses_top_record_for_same_depth() {
        let mut progression = LevelProgression::new(1, 3);
        progression.begin_level();
        progression.step_taken();
        let record = progression.begin_level();
        assert_eq!(record.steps_taken(), 1);
        assert_eq!(progression.stack_len(), 1);
    }

    #[test]
    fn test_discard_then_begin_pushes_fresh_record() {
        let mut progression = LevelProgression::new(2, 3);
        progression.begin_level();
        progression.step_taken();
        progression.discard_current();
        assert_eq!(progression.stack_len(), 0);
        let record = progression.begin_level();
        assert_eq!(record.id(), 2);
        assert_eq!(record.steps_taken(), 0);
    }

    #[test]
    fn test_advance_pushes_deeper_record() {
        let mut progression = LevelProgression::new(1, 3);
        progression.begin_level();
        progression.advance();
        let record = progression.begin_level();
        assert_eq!(record.id(), 2);
        assert_eq!(record.size(), (11, 11));
        assert_eq!(progression.stack_len(), 2);
    }

    #[test]
    fn test_retry_limit() {
        let mut progression = LevelProgression::new(1, 3);
        assert!(progression.register_failed_attempt());
        assert!(progression.register_failed_attempt());
        assert!(!progression.register_failed_attempt());
        progression.level_populated(&one_room(), (0.0, 0.0));
        assert_eq!(progression.failed_attempts(), 0);
    }
}
