//! Symbiosis - a grid tower-defense game where plants hold the line
//!
//! Core modules:
//! - `sim`: Match simulation (grid, enemies, plants, projectiles, waves)
//! - `tuning`: Data-driven game balance (plants, enemies, stages, tech)
//! - `progress`: Persistent player state (gems, inventory, deck, tech)
//! - `gacha`: Weighted plant draws
//! - `persistence`: Key-value storage and save decoding
//! - `settings`: User preferences persisted apart from the save
//! - `session`: Player-facing command surface tying it all together
//! - `render`: Canvas 2D drawing (wasm only)

pub mod gacha;
pub mod persistence;
pub mod progress;
#[cfg(target_arch = "wasm32")]
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use gacha::GachaSystem;
pub use progress::PlayerState;
pub use session::Session;
pub use settings::Settings;
pub use tuning::Catalog;

/// Game configuration constants
pub mod consts {
    /// Board canvas size in pixels
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;
    /// Edge length of one grid tile in pixels
    pub const TILE_SIZE: f32 = 40.0;

    /// Nominal frame time used by the native runner (ms)
    pub const FRAME_DT_MS: f32 = 16.0;

    /// In-run currency
    pub const START_MANA: u32 = 100;
    pub const MAX_MANA: u32 = 1000;

    /// Base health and the damage taken for every enemy that reaches it
    pub const BASE_HEALTH: i32 = 100;
    pub const LEAK_DAMAGE: i32 = 20;

    /// Spawn interval used until the first wave sets its own (ms)
    pub const DEFAULT_SPAWN_INTERVAL_MS: f32 = 2000.0;

    /// Plant cap before any `max_plants` tech
    pub const BASE_PLANT_CAP: usize = 10;
    /// Extra plant slots per `max_plants` tech level
    pub const PLANT_CAP_PER_TECH: usize = 2;

    /// Number of deck slots
    pub const DECK_SLOTS: usize = 5;
}
