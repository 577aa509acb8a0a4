//! Match simulation
//!
//! All in-match gameplay lives here. Randomness comes only from the match's
//! seeded RNG, so a stage replayed with the same seed and inputs plays out the
//! same way. No rendering or platform dependencies.

pub mod enemy;
pub mod grid;
pub mod item;
pub mod plant;
pub mod projectile;
pub mod state;
pub mod tick;

pub use enemy::{Enemy, EnemyId, EnemyOutcome, StatusEffect};
pub use grid::{ActiveArea, Grid, PlacementRefusal, Tile, TileCoord, TileKind};
pub use item::Item;
pub use plant::{AttackEvent, GrowthStage, Plant, PlantBlueprint, PlantHealth, PlantStats};
pub use projectile::{Projectile, ProjectileOutcome};
pub use state::{
    GameEvent, GamePhase, GameState, Loadout, Placement, PlacementError, Selection, SimError,
    SpawnEntry, WaveError,
};
pub use tick::{expand_wave, place_or_clear, spawn_enemy, start_next_wave, tick};
