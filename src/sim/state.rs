//! Match state and core simulation types
//!
//! Everything a running match owns lives here: the board, entity lists,
//! resources, wave bookkeeping and the seeded RNG.

use std::collections::{BTreeMap, VecDeque};

use rand::SeedableRng;
use rand_pcg::Pcg32;
use thiserror::Error;

use super::enemy::{Enemy, EnemyId};
use super::grid::{Grid, PlacementRefusal, TileCoord};
use super::item::Item;
use super::projectile::Projectile;
use crate::consts::*;
use crate::tuning::{EnemyKind, PlantKind, Stage, TechId};

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Between waves (or before the first), waiting for the player
    AwaitingWave,
    /// Enemies are spawning or still on the board
    WaveInProgress,
    /// All waves cleared
    Victory,
    /// Base health ran out. The simulation no longer advances.
    Defeat,
}

impl GamePhase {
    pub fn is_over(&self) -> bool {
        matches!(self, GamePhase::Victory | GamePhase::Defeat)
    }
}

/// Notable things that happened during a tick, drained by the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// 1-based wave number
    WaveStarted { wave: usize, enemies: usize },
    /// 1-based number of the wave that just cleared
    WaveComplete { wave: usize },
    Victory,
    Defeat,
    EnemyKilled { id: EnemyId, kind: EnemyKind, reward: u32 },
    EnemyLeaked { id: EnemyId, kind: EnemyKind },
}

/// What a board click does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Plant(PlantKind),
    Shovel,
}

/// An entry in the spawn queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnEntry {
    Enemy(EnemyKind),
    /// Resolved to a concrete kind when it spawns
    Mixed,
}

/// Internal inconsistency that stops the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("waypoint ({col}, {row}) is outside the board")]
    OffBoard { col: i32, row: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaveError {
    #[error("a wave is already in progress")]
    InProgress,
    #[error("the match is over")]
    MatchOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PlacementError {
    #[error("no plant selected")]
    NoSelection,
    #[error("the match is over")]
    MatchOver,
    #[error("{kind:?} is cooling down ({remaining_ms:.0} ms left)")]
    Cooldown { kind: PlantKind, remaining_ms: f32 },
    #[error("plant cap of {cap} reached")]
    PlantCap { cap: usize },
    #[error("not enough mana: need {cost}, have {mana}")]
    InsufficientMana { cost: u32, mana: u32 },
    #[error(transparent)]
    Refused(#[from] PlacementRefusal),
}

/// Outcome of a successful board click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Planted(TileCoord),
    /// Shovel used; whether a plant was actually removed
    Cleared { removed: bool },
}

/// What the player brings into a match
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Loadout {
    pub deck: [Option<PlantKind>; DECK_SLOTS],
    pub plant_levels: BTreeMap<PlantKind, u32>,
    pub techs: BTreeMap<TechId, u32>,
}

impl Loadout {
    pub fn plant_level(&self, kind: PlantKind) -> u32 {
        self.plant_levels.get(&kind).copied().unwrap_or(1)
    }

    pub fn tech(&self, id: TechId) -> u32 {
        self.techs.get(&id).copied().unwrap_or(0)
    }

    pub fn plant_cap(&self) -> usize {
        BASE_PLANT_CAP + PLANT_CAP_PER_TECH * self.tech(TechId::MaxPlants) as usize
    }
}

/// One match on one stage
#[derive(Debug, Clone)]
pub struct GameState {
    /// Match seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub stage: Stage,
    pub loadout: Loadout,
    pub grid: Grid,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub items: Vec<Item>,
    pub mana: u32,
    pub health: i32,
    pub phase: GamePhase,
    /// Index of the next wave to start
    pub wave_index: usize,
    pub spawn_queue: VecDeque<SpawnEntry>,
    pub spawn_timer_ms: f32,
    pub spawn_interval_ms: f32,
    /// Battle clock, advanced every tick
    pub clock_ms: f64,
    /// Remaining placement cooldown per deck plant
    pub cooldowns: BTreeMap<PlantKind, f32>,
    pub selection: Option<Selection>,
    pub spawn_point: TileCoord,
    pub base_point: TileCoord,
    pub(crate) events: Vec<GameEvent>,
    next_id: EnemyId,
}

impl GameState {
    pub fn new(stage: Stage, loadout: Loadout, seed: u64) -> Self {
        let mut grid = Grid::new(
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            TILE_SIZE,
            loadout.tech(TechId::BoardExpansion),
        );
        grid.set_plant_cap(loadout.plant_cap());

        let path_row = grid.path_row() as i32;
        let spawn_point = TileCoord::new(0, path_row);
        let base_point = TileCoord::new(grid.cols() as i32 - 1, path_row);

        let cooldowns = loadout.deck.iter().flatten().map(|&kind| (kind, 0.0)).collect();
        let selection = loadout.deck.iter().flatten().next().map(|&kind| Selection::Plant(kind));

        log::info!(
            "Match started: stage {} ({} waves), plant cap {}",
            stage.id,
            stage.waves.len(),
            grid.plant_cap()
        );

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            stage,
            loadout,
            grid,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            items: Vec::new(),
            mana: START_MANA,
            health: BASE_HEALTH,
            phase: GamePhase::AwaitingWave,
            wave_index: 0,
            spawn_queue: VecDeque::new(),
            spawn_timer_ms: 0.0,
            spawn_interval_ms: DEFAULT_SPAWN_INTERVAL_MS,
            clock_ms: 0.0,
            cooldowns,
            selection,
            spawn_point,
            base_point,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new enemy ID
    pub fn next_enemy_id(&mut self) -> EnemyId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn total_waves(&self) -> usize {
        self.stage.waves.len()
    }

    /// Enemies on the board plus those still queued
    pub fn enemies_remaining(&self) -> usize {
        self.enemies.len() + self.spawn_queue.len()
    }

    pub fn cooldown_remaining(&self, kind: PlantKind) -> f32 {
        self.cooldowns.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn credit_mana(&mut self, amount: u32) {
        self.mana = self.mana.saturating_add(amount).min(MAX_MANA);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Catalog;

    fn loadout_with(techs: &[(TechId, u32)]) -> Loadout {
        Loadout {
            deck: [
                Some(PlantKind::Seed),
                Some(PlantKind::Peashooter),
                Some(PlantKind::Slow),
                None,
                None,
            ],
            plant_levels: BTreeMap::new(),
            techs: techs.iter().copied().collect(),
        }
    }

    #[test]
    fn test_new_match_defaults() {
        let stage = Catalog::builtin().stage(1).unwrap().clone();
        let state = GameState::new(stage, loadout_with(&[]), 1);

        assert_eq!(state.mana, 100);
        assert_eq!(state.health, 100);
        assert_eq!(state.phase, GamePhase::AwaitingWave);
        assert_eq!(state.spawn_point, TileCoord::new(0, 7));
        assert_eq!(state.base_point, TileCoord::new(19, 7));
        assert_eq!(state.grid.plant_cap(), 10);
        assert_eq!(state.selection, Some(Selection::Plant(PlantKind::Seed)));
        assert_eq!(state.cooldowns.len(), 3);
    }

    #[test]
    fn test_techs_shape_the_board() {
        let stage = Catalog::builtin().stage(1).unwrap().clone();
        let loadout = loadout_with(&[(TechId::MaxPlants, 2), (TechId::BoardExpansion, 1)]);
        let state = GameState::new(stage, loadout, 1);

        assert_eq!(state.grid.plant_cap(), 14);
        assert_eq!(state.grid.active_area().min_col, 4);
        assert_eq!(state.grid.active_area().max_col, 16);
    }

    #[test]
    fn test_mana_credit_caps() {
        let stage = Catalog::builtin().stage(1).unwrap().clone();
        let mut state = GameState::new(stage, loadout_with(&[]), 1);
        state.credit_mana(850);
        assert_eq!(state.mana, 950);
        state.credit_mana(500);
        assert_eq!(state.mana, MAX_MANA);
    }
}
