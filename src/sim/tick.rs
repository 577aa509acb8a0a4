//! Per-frame simulation tick
//!
//! Advances a match by one variable timestep. Order matters: plants fire
//! before enemies move, and projectiles land after.

use rand::Rng;

use super::enemy::{Enemy, EnemyOutcome};
use super::item::Item;
use super::plant::PlantBlueprint;
use super::state::{
    GameEvent, GamePhase, GameState, Placement, PlacementError, Selection, SimError, SpawnEntry,
    WaveError,
};
use crate::consts::LEAK_DAMAGE;
use crate::tuning::{Catalog, EnemyKind, TechId, WaveDef, WaveKind};

/// Escorts that follow each boss
const BOSS_ESCORTS: usize = 5;

/// Weights for resolving a mixed spawn, rolled in order
const MIX_WEIGHTS: [(EnemyKind, f32); 4] = [
    (EnemyKind::Normal, 0.4),
    (EnemyKind::Fast, 0.2),
    (EnemyKind::Tank, 0.2),
    (EnemyKind::Tiny, 0.2),
];

/// Advance the match by `dt_ms` milliseconds
pub fn tick(state: &mut GameState, dt_ms: f32) -> Result<(), SimError> {
    if state.phase.is_over() {
        return Ok(());
    }

    state.clock_ms += dt_ms as f64;
    let in_progress = state.phase == GamePhase::WaveInProgress;

    // Plants
    let mut fired = Vec::new();
    state
        .grid
        .update(dt_ms, &state.enemies, state.clock_ms, &mut fired);
    state.projectiles.extend(fired);

    // Placement cooldowns only run during a wave
    if in_progress {
        for remaining in state.cooldowns.values_mut() {
            *remaining = (*remaining - dt_ms).max(0.0);
        }
    }

    // Spawning and wave completion
    if in_progress && !state.spawn_queue.is_empty() {
        state.spawn_timer_ms += dt_ms;
        if state.spawn_timer_ms > state.spawn_interval_ms {
            state.spawn_timer_ms = 0.0;
            if let Some(entry) = state.spawn_queue.pop_front() {
                spawn_enemy(state, entry);
            }
        }
    } else if in_progress && state.enemies.is_empty() {
        complete_wave(state);
    }

    // Enemies
    let mut i = 0;
    while i < state.enemies.len() {
        let outcome = state.enemies[i].tick(dt_ms, &mut state.grid, &mut state.rng)?;
        match outcome {
            EnemyOutcome::ReachedBase => {
                let enemy = state.enemies.remove(i);
                state.health -= LEAK_DAMAGE;
                state.events.push(GameEvent::EnemyLeaked {
                    id: enemy.id,
                    kind: enemy.kind,
                });
                log::debug!("Enemy {} reached the base, health {}", enemy.id, state.health);

                if state.health <= 0 {
                    state.health = 0;
                    state.phase = GamePhase::Defeat;
                    state.events.push(GameEvent::Defeat);
                    log::info!("Defeat on stage {}", state.stage.id);
                    return Ok(());
                }
            }
            EnemyOutcome::Inactive => {
                let enemy = state.enemies.remove(i);
                state.credit_mana(enemy.reward);
                state.items.push(Item::new(enemy.pos, enemy.reward));
                state.events.push(GameEvent::EnemyKilled {
                    id: enemy.id,
                    kind: enemy.kind,
                    reward: enemy.reward,
                });
            }
            EnemyOutcome::Advancing | EnemyOutcome::Attacking => i += 1,
        }
    }

    // Projectiles
    let tile_size = state.grid.tile_size();
    for projectile in &mut state.projectiles {
        projectile.tick(dt_ms, &mut state.enemies, tile_size);
    }
    state.projectiles.retain(|p| p.active);

    // Reward coins
    for item in &mut state.items {
        item.tick(dt_ms);
    }
    state.items.retain(|item| item.active);

    Ok(())
}

fn complete_wave(state: &mut GameState) {
    if state.wave_index >= state.total_waves() {
        state.phase = GamePhase::Victory;
        state.events.push(GameEvent::Victory);
        log::info!("Victory on stage {}", state.stage.id);
    } else {
        state.phase = GamePhase::AwaitingWave;
        state.events.push(GameEvent::WaveComplete {
            wave: state.wave_index,
        });
        log::info!("Wave {} complete", state.wave_index);
    }
}

/// Flatten a wave definition into spawn order
pub fn expand_wave(wave: &WaveDef) -> Vec<SpawnEntry> {
    let count = wave.count as usize;
    match wave.kind {
        WaveKind::Mix => vec![SpawnEntry::Mixed; count],
        WaveKind::Boss => {
            let mut entries = Vec::with_capacity(count * (BOSS_ESCORTS + 1));
            for _ in 0..count {
                entries.push(SpawnEntry::Enemy(EnemyKind::Boss));
                entries.extend(std::iter::repeat_n(
                    SpawnEntry::Enemy(EnemyKind::Tank),
                    BOSS_ESCORTS,
                ));
            }
            entries
        }
        single => single
            .single_kind()
            .map(|kind| vec![SpawnEntry::Enemy(kind); count])
            .unwrap_or_default(),
    }
}

/// Start the next wave, or declare victory if none remain
pub fn start_next_wave(state: &mut GameState) -> Result<(), WaveError> {
    match state.phase {
        GamePhase::WaveInProgress => return Err(WaveError::InProgress),
        GamePhase::Victory | GamePhase::Defeat => return Err(WaveError::MatchOver),
        GamePhase::AwaitingWave => {}
    }

    let Some(wave) = state.stage.waves.get(state.wave_index) else {
        state.phase = GamePhase::Victory;
        state.events.push(GameEvent::Victory);
        log::info!("All waves complete");
        return Ok(());
    };

    let queue = expand_wave(wave);
    state.spawn_interval_ms = wave.interval as f32;
    state.spawn_timer_ms = 0.0;
    state.spawn_queue = queue.into();
    state.phase = GamePhase::WaveInProgress;
    state.wave_index += 1;

    state.events.push(GameEvent::WaveStarted {
        wave: state.wave_index,
        enemies: state.spawn_queue.len(),
    });
    log::info!(
        "Wave {}/{} started: {} enemies",
        state.wave_index,
        state.total_waves(),
        state.spawn_queue.len()
    );
    Ok(())
}

fn resolve_mixed<R: Rng>(rng: &mut R) -> EnemyKind {
    let mut roll: f32 = rng.random();
    for (kind, weight) in MIX_WEIGHTS {
        roll -= weight;
        if roll < 0.0 {
            return kind;
        }
    }
    EnemyKind::Tiny
}

/// Put one enemy on the path at the spawn point
pub fn spawn_enemy(state: &mut GameState, entry: SpawnEntry) {
    let kind = match entry {
        SpawnEntry::Enemy(kind) => kind,
        SpawnEntry::Mixed => resolve_mixed(&mut state.rng),
    };

    let path = state.grid.find_path(state.spawn_point, state.base_point);
    let id = state.next_enemy_id();
    match Enemy::new(id, kind, path) {
        Some(enemy) => state.enemies.push(enemy),
        None => log::error!("No path found for enemy {}", kind.as_str()),
    }
}

/// Handle a board click at canvas pixel coordinates
pub fn place_or_clear(
    state: &mut GameState,
    x: f32,
    y: f32,
    catalog: &Catalog,
) -> Result<Placement, PlacementError> {
    if state.phase.is_over() {
        return Err(PlacementError::MatchOver);
    }

    let kind = match state.selection {
        None => return Err(PlacementError::NoSelection),
        Some(Selection::Shovel) => {
            let removed = state.grid.remove_plant_at(x, y);
            return Ok(Placement::Cleared { removed });
        }
        Some(Selection::Plant(kind)) => kind,
    };

    let in_wave = state.phase == GamePhase::WaveInProgress;
    let remaining_ms = state.cooldown_remaining(kind);
    if in_wave && remaining_ms > 0.0 {
        return Err(PlacementError::Cooldown { kind, remaining_ms });
    }

    let cap = state.grid.plant_cap();
    if state.grid.plant_count() >= cap {
        return Err(PlacementError::PlantCap { cap });
    }

    let record = catalog.plant_or_fallback(kind);
    if state.mana < record.cost {
        return Err(PlacementError::InsufficientMana {
            cost: record.cost,
            mana: state.mana,
        });
    }

    let level = state.loadout.plant_level(kind);
    let speed_tech = state.loadout.tech(TechId::GlobalSpeed);
    let blueprint = PlantBlueprint::new(&record, level, speed_tech);
    let coord = state.grid.place_plant(x, y, &blueprint)?;

    state.mana -= record.cost;
    if in_wave {
        state.cooldowns.insert(kind, record.cooldown as f32);
    }
    log::debug!(
        "Planted {} (lv {}) at ({}, {}), mana {}",
        kind.as_str(),
        level,
        coord.col,
        coord.row,
        state.mana
    );
    Ok(Placement::Planted(coord))
}
