//! Plants: level-scaled stats, nearest-enemy targeting, attacks

use glam::Vec2;

use super::enemy::Enemy;
use super::grid::TileCoord;
use super::projectile::Projectile;
use crate::tuning::{Effect, PlantKind, PlantRecord};

const BASE_MAX_HEALTH: f32 = 100.0;
const MAX_HEALTH_PER_LEVEL: f32 = 50.0;
const DAMAGE_PER_LEVEL: f64 = 0.2;
const COOLDOWN_CUT_PER_LEVEL: f64 = 0.05;
const COOLDOWN_CUT_PER_SPEED_TECH: f64 = 0.05;

/// Growth stage. Only `Seed` (for the seed plant) and `Mature` are reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStage {
    Seed,
    Sprout,
    Mature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantHealth {
    Alive,
    Dead,
}

/// Combat stats derived from (type, level, speed tech)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantStats {
    /// Tiles
    pub range: f32,
    pub damage: f32,
    pub attack_cooldown_ms: u32,
    pub max_health: f32,
}

impl PlantStats {
    pub fn derive(record: &PlantRecord, level: u32, speed_tech: u32) -> Self {
        let steps = level.max(1) as f64 - 1.0;

        // Epsilon absorbs float representation error before flooring
        let damage = (record.damage as f64 * (1.0 + steps * DAMAGE_PER_LEVEL) + 1e-9).floor();

        let speed_mult = 1.0 - speed_tech as f64 * COOLDOWN_CUT_PER_SPEED_TECH;
        let cooldown =
            record.cooldown as f64 * (1.0 - steps * COOLDOWN_CUT_PER_LEVEL) * speed_mult + 1e-9;

        Self {
            range: record.range,
            damage: damage as f32,
            attack_cooldown_ms: cooldown.floor().max(0.0) as u32,
            max_health: BASE_MAX_HEALTH + steps as f32 * MAX_HEALTH_PER_LEVEL,
        }
    }
}

/// Everything needed to construct a plant, resolved once per placement
#[derive(Debug, Clone, PartialEq)]
pub struct PlantBlueprint {
    pub kind: PlantKind,
    pub level: u32,
    pub stats: PlantStats,
    pub effect: Option<Effect>,
}

impl PlantBlueprint {
    pub fn new(record: &PlantRecord, level: u32, speed_tech: u32) -> Self {
        Self {
            kind: record.id,
            level: level.max(1),
            stats: PlantStats::derive(record, level, speed_tech),
            effect: record.effect,
        }
    }
}

/// The most recent attack, for renderers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackEvent {
    /// Battle clock time of the shot
    pub at_ms: f64,
    /// Target position in tile units at the time of the shot
    pub target_pos: Vec2,
}

/// A plant rooted on a tile
#[derive(Debug, Clone)]
pub struct Plant {
    coord: TileCoord,
    kind: PlantKind,
    level: u32,
    stats: PlantStats,
    effect: Option<Effect>,
    stage: GrowthStage,
    age_ms: f32,
    health: f32,
    last_attack: Option<AttackEvent>,
}

impl Plant {
    pub fn new(coord: TileCoord, blueprint: &PlantBlueprint) -> Self {
        let stage = if blueprint.kind == PlantKind::Seed {
            GrowthStage::Seed
        } else {
            GrowthStage::Mature
        };
        Self {
            coord,
            kind: blueprint.kind,
            level: blueprint.level,
            stats: blueprint.stats,
            effect: blueprint.effect,
            stage,
            age_ms: 0.0,
            health: blueprint.stats.max_health,
            last_attack: None,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn kind(&self) -> PlantKind {
        self.kind
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn stats(&self) -> &PlantStats {
        &self.stats
    }

    pub fn effect(&self) -> Option<Effect> {
        self.effect
    }

    pub fn stage(&self) -> GrowthStage {
        self.stage
    }

    pub fn age_ms(&self) -> f32 {
        self.age_ms
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn last_attack(&self) -> Option<&AttackEvent> {
        self.last_attack.as_ref()
    }

    fn position(&self) -> Vec2 {
        Vec2::new(self.coord.col as f32, self.coord.row as f32)
    }

    /// Whether the attack cooldown has elapsed at `clock_ms`
    pub fn is_ready(&self, clock_ms: f64) -> bool {
        match self.last_attack {
            None => true,
            Some(last) => clock_ms - last.at_ms >= self.stats.attack_cooldown_ms as f64,
        }
    }

    /// Advance the plant; returns a projectile if it fired this tick
    pub fn tick(
        &mut self,
        dt_ms: f32,
        enemies: &[Enemy],
        clock_ms: f64,
        tile_size: f32,
    ) -> Option<Projectile> {
        self.age_ms += dt_ms;

        if !self.is_ready(clock_ms) {
            return None;
        }

        let target = self.find_target(enemies)?;
        let origin = Vec2::new(
            self.coord.col as f32 * tile_size + tile_size / 2.0,
            self.coord.row as f32 * tile_size + tile_size / 2.0,
        );
        let projectile = Projectile::new(origin, target.id, self.stats.damage, self.effect, self.kind);

        self.last_attack = Some(AttackEvent {
            at_ms: clock_ms,
            target_pos: target.pos,
        });
        Some(projectile)
    }

    /// Nearest active enemy within range (tiles, inclusive).
    ///
    /// On equal distance the first enemy in iteration order wins.
    pub fn find_target<'e>(&self, enemies: &'e [Enemy]) -> Option<&'e Enemy> {
        let me = self.position();
        let mut best: Option<(&Enemy, f32)> = None;

        for enemy in enemies.iter().filter(|e| e.active) {
            let dist = enemy.pos.distance(me);
            if dist > self.stats.range {
                continue;
            }
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((enemy, dist)),
            }
        }

        best.map(|(enemy, _)| enemy)
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Subtract health. `Dead` is reported only by the hit that kills the
    /// plant; hits on a plant that is already dead change nothing.
    pub fn receive_damage(&mut self, amount: f32) -> PlantHealth {
        if self.is_dead() {
            return PlantHealth::Alive;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.health = 0.0;
            PlantHealth::Dead
        } else {
            PlantHealth::Alive
        }
    }
}
