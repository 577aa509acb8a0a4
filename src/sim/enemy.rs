//! Enemies walking the path toward the base
//!
//! An enemy is either advancing or attacking, but that state is never stored:
//! each tick it is recomputed from whether a plant sits on the next waypoint
//! tile or the current tile.

use glam::Vec2;
use rand::Rng;

use super::SimError;
use super::grid::{Grid, TileCoord};
use super::plant::PlantHealth;
use crate::tuning::EnemyKind;

pub type EnemyId = u32;

/// Milliseconds between attacks on a blocking plant
pub const ATTACK_INTERVAL_MS: f32 = 500.0;
/// Speed multiplier while slowed
pub const SLOW_FACTOR: f32 = 0.5;
/// Max drawn offset (tiles) rolled on each attack
const ATTACK_JITTER: f32 = 0.05;

/// Status effects an enemy can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEffect {
    Slow,
}

/// What happened to an enemy during its tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyOutcome {
    Advancing,
    Attacking,
    /// No waypoints left; the caller applies base damage and removes it
    ReachedBase,
    Inactive,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    /// Position in tile units
    pub pos: Vec2,
    path: Vec<TileCoord>,
    path_index: usize,
    pub health: f32,
    pub max_health: f32,
    /// Tiles per second
    pub speed: f32,
    pub reward: u32,
    pub attack_damage: f32,
    pub active: bool,
    slow_ms: f32,
    attack_timer_ms: f32,
    /// Presentation-only offset from `pos`, re-rolled on each attack
    jitter: Vec2,
}

impl Enemy {
    /// Create an enemy at the start of `path`. Returns None for an empty path.
    pub fn new(id: EnemyId, kind: EnemyKind, path: Vec<TileCoord>) -> Option<Self> {
        let start = *path.first()?;
        let preset = kind.preset();
        Some(Self {
            id,
            kind,
            pos: Vec2::new(start.col as f32, start.row as f32),
            path,
            path_index: 0,
            health: preset.max_health,
            max_health: preset.max_health,
            speed: preset.speed,
            reward: preset.reward,
            attack_damage: preset.attack_damage,
            active: true,
            slow_ms: 0.0,
            attack_timer_ms: 0.0,
            jitter: Vec2::ZERO,
        })
    }

    pub fn path(&self) -> &[TileCoord] {
        &self.path
    }

    pub fn path_index(&self) -> usize {
        self.path_index
    }

    pub fn slow_remaining_ms(&self) -> f32 {
        self.slow_ms.max(0.0)
    }

    pub fn is_slowed(&self) -> bool {
        self.slow_ms > 0.0
    }

    /// Position to draw at (tile units)
    pub fn draw_pos(&self) -> Vec2 {
        self.pos + self.jitter
    }

    fn current_tile(&self) -> TileCoord {
        TileCoord::new(self.pos.x.round() as i32, self.pos.y.round() as i32)
    }

    /// Advance one tick: attack a blocking plant, or walk toward the next waypoint
    pub fn tick<R: Rng>(
        &mut self,
        dt_ms: f32,
        grid: &mut Grid,
        rng: &mut R,
    ) -> Result<EnemyOutcome, SimError> {
        if !self.active {
            return Ok(EnemyOutcome::Inactive);
        }

        let mut speed = self.speed;
        if self.slow_ms > 0.0 {
            speed *= SLOW_FACTOR;
            self.slow_ms -= dt_ms;
        }

        let Some(&next) = self.path.get(self.path_index + 1) else {
            return Ok(EnemyOutcome::ReachedBase);
        };

        if let Some(blocker) = self.blocking_tile(grid, next)? {
            self.attack(dt_ms, grid, blocker, rng);
            return Ok(EnemyOutcome::Attacking);
        }

        let target = Vec2::new(next.col as f32, next.row as f32);
        let delta = target - self.pos;
        let dist = delta.length();
        let step = speed * (dt_ms / 1000.0);

        if step >= dist {
            self.pos = target;
            self.path_index += 1;
        } else {
            self.pos += delta / dist * step;
        }

        Ok(EnemyOutcome::Advancing)
    }

    /// Plant tile blocking this enemy: the next waypoint first, then the current tile
    fn blocking_tile(&self, grid: &Grid, next: TileCoord) -> Result<Option<TileCoord>, SimError> {
        let current = self.current_tile();
        let next_tile = grid.tile(next).ok_or(SimError::OffBoard {
            col: next.col,
            row: next.row,
        })?;
        if next_tile.plant.is_some() {
            return Ok(Some(next));
        }

        let current_tile = grid.tile(current).ok_or(SimError::OffBoard {
            col: current.col,
            row: current.row,
        })?;
        Ok(current_tile.plant.as_ref().map(|_| current))
    }

    fn attack<R: Rng>(&mut self, dt_ms: f32, grid: &mut Grid, blocker: TileCoord, rng: &mut R) {
        self.attack_timer_ms += dt_ms;
        if self.attack_timer_ms <= ATTACK_INTERVAL_MS {
            return;
        }
        self.attack_timer_ms = 0.0;

        // Visual tell
        self.jitter = Vec2::new(
            rng.random_range(-ATTACK_JITTER..ATTACK_JITTER),
            rng.random_range(-ATTACK_JITTER..ATTACK_JITTER),
        );

        let Some(tile) = grid.tile_mut(blocker) else {
            return;
        };
        let died = tile
            .plant
            .as_mut()
            .map(|plant| plant.receive_damage(self.attack_damage) == PlantHealth::Dead)
            .unwrap_or(false);
        if died {
            tile.plant = None;
            self.jitter = Vec2::ZERO;
            log::debug!(
                "Enemy {} destroyed plant at ({}, {})",
                self.id,
                blocker.col,
                blocker.row
            );
        }
    }

    /// Subtract health. Returns true only on the call that kills the enemy.
    pub fn receive_damage(&mut self, amount: f32) -> bool {
        if !self.active {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }

    /// Set a status effect's remaining duration. Last write wins.
    pub fn apply_status(&mut self, status: StatusEffect, duration_ms: f32) {
        match status {
            StatusEffect::Slow => self.slow_ms = duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, TILE_SIZE};
    use crate::sim::plant::PlantBlueprint;
    use crate::tuning::{Catalog, PlantKind};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup() -> (Grid, Pcg32) {
        (
            Grid::new(CANVAS_WIDTH, CANVAS_HEIGHT, TILE_SIZE, 0),
            Pcg32::seed_from_u64(7),
        )
    }

    fn row_path(grid: &Grid) -> Vec<TileCoord> {
        let row = grid.path_row() as i32;
        grid.find_path(TileCoord::new(0, row), TileCoord::new(grid.cols() as i32 - 1, row))
    }

    fn plant_on(grid: &mut Grid, coord: TileCoord) {
        // Plants normally can't sit on the path; drop one there directly
        let bp = PlantBlueprint::new(&Catalog::builtin().plant_or_fallback(PlantKind::Peashooter), 1, 0);
        grid.tile_mut(coord).unwrap().plant = Some(crate::sim::plant::Plant::new(coord, &bp));
    }

    #[test]
    fn test_presets_applied() {
        let (grid, _) = setup();
        let tank = Enemy::new(1, EnemyKind::Tank, row_path(&grid)).unwrap();
        assert_eq!(tank.speed, 1.0);
        assert_eq!(tank.health, 300.0);
        assert_eq!(tank.reward, 25);
        assert_eq!(tank.attack_damage, 20.0);
        assert_eq!(tank.pos, Vec2::new(0.0, 7.0));
        assert!(Enemy::new(2, EnemyKind::Normal, Vec::new()).is_none());
    }

    #[test]
    fn test_moves_proportionally_then_snaps() {
        let (mut grid, mut rng) = setup();
        let mut enemy = Enemy::new(1, EnemyKind::Normal, row_path(&grid)).unwrap();

        // 2 tiles/s for 250ms = 0.5 tiles
        let outcome = enemy.tick(250.0, &mut grid, &mut rng).unwrap();
        assert_eq!(outcome, EnemyOutcome::Advancing);
        assert!((enemy.pos.x - 0.5).abs() < 1e-5);
        assert_eq!(enemy.path_index(), 0);

        // Remaining 0.5 tiles is within a 0.5 step: snap
        enemy.tick(250.0, &mut grid, &mut rng).unwrap();
        assert_eq!(enemy.pos, Vec2::new(1.0, 7.0));
        assert_eq!(enemy.path_index(), 1);
    }

    #[test]
    fn test_slow_halves_speed_and_expires() {
        let (mut grid, mut rng) = setup();
        let mut enemy = Enemy::new(1, EnemyKind::Normal, row_path(&grid)).unwrap();
        enemy.apply_status(StatusEffect::Slow, 200.0);

        enemy.tick(100.0, &mut grid, &mut rng).unwrap();
        assert!((enemy.pos.x - 0.1).abs() < 1e-5);
        assert!(enemy.is_slowed());

        enemy.tick(100.0, &mut grid, &mut rng).unwrap();
        assert!((enemy.pos.x - 0.2).abs() < 1e-5);
        assert!(!enemy.is_slowed());

        enemy.tick(100.0, &mut grid, &mut rng).unwrap();
        assert!((enemy.pos.x - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_slow_last_write_wins() {
        let (grid, _) = setup();
        let mut enemy = Enemy::new(1, EnemyKind::Fast, row_path(&grid)).unwrap();
        enemy.apply_status(StatusEffect::Slow, 3000.0);
        enemy.apply_status(StatusEffect::Slow, 500.0);
        assert_eq!(enemy.slow_remaining_ms(), 500.0);
    }

    #[test]
    fn test_blocked_enemy_attacks_instead_of_moving() {
        let (mut grid, mut rng) = setup();
        plant_on(&mut grid, TileCoord::new(1, 7));
        let mut enemy = Enemy::new(1, EnemyKind::Tank, row_path(&grid)).unwrap();

        // Timer must exceed 500ms before the first hit
        for _ in 0..5 {
            assert_eq!(
                enemy.tick(100.0, &mut grid, &mut rng).unwrap(),
                EnemyOutcome::Attacking
            );
        }
        assert_eq!(enemy.pos, Vec2::new(0.0, 7.0));
        let plant = grid.tile(TileCoord::new(1, 7)).unwrap().plant.as_ref().unwrap();
        assert_eq!(plant.health(), 100.0);

        enemy.tick(100.0, &mut grid, &mut rng).unwrap();
        let plant = grid.tile(TileCoord::new(1, 7)).unwrap().plant.as_ref().unwrap();
        assert_eq!(plant.health(), 80.0);
        assert_eq!(enemy.pos, Vec2::new(0.0, 7.0));
    }

    #[test]
    fn test_killing_blocker_clears_tile_and_resumes() {
        let (mut grid, mut rng) = setup();
        plant_on(&mut grid, TileCoord::new(1, 7));
        let mut enemy = Enemy::new(1, EnemyKind::Boss, row_path(&grid)).unwrap();

        // Boss hits for 50; two hits kill a level 1 plant
        for _ in 0..12 {
            enemy.tick(100.0, &mut grid, &mut rng).unwrap();
        }
        assert!(grid.tile(TileCoord::new(1, 7)).unwrap().plant.is_none());

        let outcome = enemy.tick(100.0, &mut grid, &mut rng).unwrap();
        assert_eq!(outcome, EnemyOutcome::Advancing);
        assert!(enemy.pos.x > 0.0);
    }

    #[test]
    fn test_reaches_base() {
        let (mut grid, mut rng) = setup();
        let path = vec![TileCoord::new(18, 7), TileCoord::new(19, 7)];
        let mut enemy = Enemy::new(1, EnemyKind::Fast, path).unwrap();

        assert_eq!(enemy.tick(250.0, &mut grid, &mut rng).unwrap(), EnemyOutcome::Advancing);
        assert_eq!(enemy.pos, Vec2::new(19.0, 7.0));
        assert_eq!(enemy.tick(16.0, &mut grid, &mut rng).unwrap(), EnemyOutcome::ReachedBase);
    }

    #[test]
    fn test_off_board_waypoint_is_an_error() {
        let (mut grid, mut rng) = setup();
        let path = vec![TileCoord::new(19, 7), TileCoord::new(20, 7)];
        let mut enemy = Enemy::new(1, EnemyKind::Normal, path).unwrap();
        assert_eq!(
            enemy.tick(16.0, &mut grid, &mut rng),
            Err(SimError::OffBoard { col: 20, row: 7 })
        );
    }

    proptest! {
        #[test]
        fn prop_lethal_damage_clamps_and_signals_once(
            kind_idx in 0usize..5,
            hits in proptest::collection::vec(1.0f32..3000.0, 1..10),
        ) {
            let kinds = [EnemyKind::Normal, EnemyKind::Fast, EnemyKind::Tank, EnemyKind::Boss, EnemyKind::Tiny];
            let path = vec![TileCoord::new(0, 7), TileCoord::new(1, 7)];
            let mut enemy = Enemy::new(1, kinds[kind_idx], path).unwrap();

            let mut kills = 0;
            for hit in hits {
                if enemy.receive_damage(hit) {
                    kills += 1;
                }
                prop_assert!(enemy.health >= 0.0);
            }
            prop_assert!(kills <= 1);
            if !enemy.active {
                prop_assert_eq!(enemy.health, 0.0);
                prop_assert_eq!(kills, 1);
            }
        }
    }
}
