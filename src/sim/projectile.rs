//! Homing projectiles fired by plants

use glam::Vec2;

use super::enemy::{Enemy, EnemyId, StatusEffect};
use crate::tuning::{Effect, PlantKind};

/// Tiles per second
pub const PROJECTILE_SPEED: f32 = 5.0;
/// Slow applied by ice projectiles
pub const ICE_SLOW_MS: f32 = 3000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileOutcome {
    InFlight,
    Hit { target: EnemyId, killed: bool },
    /// Target vanished or died before impact
    Fizzled,
}

/// A shot homing on one enemy. Never retargets.
#[derive(Debug, Clone)]
pub struct Projectile {
    /// Pixels
    pub pos: Vec2,
    pub target: EnemyId,
    pub damage: f32,
    pub effect: Option<Effect>,
    pub speed: f32,
    /// Plant type that fired it, for coloring
    pub source: PlantKind,
    pub active: bool,
}

impl Projectile {
    pub fn new(
        pos: Vec2,
        target: EnemyId,
        damage: f32,
        effect: Option<Effect>,
        source: PlantKind,
    ) -> Self {
        Self {
            pos,
            target,
            damage,
            effect,
            speed: PROJECTILE_SPEED,
            source,
            active: true,
        }
    }

    pub fn tick(&mut self, dt_ms: f32, enemies: &mut [Enemy], tile_size: f32) -> ProjectileOutcome {
        if !self.active {
            return ProjectileOutcome::Fizzled;
        }

        let Some(target) = enemies.iter_mut().find(|e| e.id == self.target && e.active) else {
            self.active = false;
            return ProjectileOutcome::Fizzled;
        };

        let aim = target.pos * tile_size + Vec2::splat(tile_size / 2.0);
        let delta = aim - self.pos;
        let dist = delta.length();
        let step = self.speed * (dt_ms / 1000.0) * tile_size;

        if dist > step {
            self.pos += delta / dist * step;
            return ProjectileOutcome::InFlight;
        }

        self.pos = aim;
        self.active = false;
        let killed = target.receive_damage(self.damage);
        if self.effect == Some(Effect::Ice) {
            target.apply_status(StatusEffect::Slow, ICE_SLOW_MS);
        }
        ProjectileOutcome::Hit {
            target: target.id,
            killed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::TileCoord;
    use crate::tuning::EnemyKind;

    const TILE: f32 = 40.0;

    fn enemy(id: EnemyId, kind: EnemyKind) -> Enemy {
        Enemy::new(id, kind, vec![TileCoord::new(8, 7), TileCoord::new(9, 7)]).unwrap()
    }

    #[test]
    fn test_flies_toward_target() {
        let mut enemies = vec![enemy(1, EnemyKind::Tank)];
        // Target centre is (340, 300); start 100px above
        let mut shot = Projectile::new(Vec2::new(340.0, 200.0), 1, 15.0, None, PlantKind::Peashooter);

        // 5 tiles/s * 40px = 200px/s -> 20px per 100ms
        assert_eq!(shot.tick(100.0, &mut enemies, TILE), ProjectileOutcome::InFlight);
        assert!((shot.pos.y - 220.0).abs() < 1e-3);
        assert_eq!(enemies[0].health, 300.0);
    }

    #[test]
    fn test_hit_damages_and_deactivates() {
        let mut enemies = vec![enemy(1, EnemyKind::Normal)];
        let mut shot = Projectile::new(Vec2::new(340.0, 290.0), 1, 15.0, None, PlantKind::Peashooter);

        let outcome = shot.tick(100.0, &mut enemies, TILE);
        assert_eq!(outcome, ProjectileOutcome::Hit { target: 1, killed: false });
        assert!(!shot.active);
        assert_eq!(shot.pos, Vec2::new(340.0, 300.0));
        assert_eq!(enemies[0].health, 85.0);
        assert!(!enemies[0].is_slowed());
    }

    #[test]
    fn test_ice_applies_slow() {
        let mut enemies = vec![enemy(1, EnemyKind::Normal)];
        let mut shot = Projectile::new(Vec2::new(340.0, 300.0), 1, 8.0, Some(Effect::Ice), PlantKind::Slow);
        shot.tick(16.0, &mut enemies, TILE);
        assert_eq!(enemies[0].slow_remaining_ms(), ICE_SLOW_MS);
    }

    #[test]
    fn test_lethal_hit_reports_kill() {
        let mut enemies = vec![enemy(3, EnemyKind::Tiny)];
        let mut shot = Projectile::new(Vec2::new(340.0, 300.0), 3, 50.0, None, PlantKind::Cactus);
        assert_eq!(
            shot.tick(16.0, &mut enemies, TILE),
            ProjectileOutcome::Hit { target: 3, killed: true }
        );
        assert!(!enemies[0].active);
    }

    #[test]
    fn test_dead_target_fizzles_without_damage() {
        let mut enemies = vec![enemy(1, EnemyKind::Normal), enemy(2, EnemyKind::Normal)];
        enemies[0].receive_damage(1000.0);
        let mut shot = Projectile::new(Vec2::new(340.0, 300.0), 1, 15.0, None, PlantKind::Peashooter);

        assert_eq!(shot.tick(16.0, &mut enemies, TILE), ProjectileOutcome::Fizzled);
        assert!(!shot.active);
        // No retargeting onto the survivor
        assert_eq!(enemies[1].health, 100.0);
    }

    #[test]
    fn test_missing_target_fizzles() {
        let mut enemies = vec![enemy(1, EnemyKind::Normal)];
        let mut shot = Projectile::new(Vec2::ZERO, 42, 15.0, None, PlantKind::Peashooter);
        assert_eq!(shot.tick(16.0, &mut enemies, TILE), ProjectileOutcome::Fizzled);
    }
}
