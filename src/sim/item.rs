//! Reward coins dropped where enemies die
//!
//! Purely visual: the mana is credited at the kill.

use glam::Vec2;

pub const ITEM_LIFETIME_MS: f32 = 5000.0;
/// Pixels
pub const FLOAT_AMPLITUDE: f32 = 5.0;
const FLOAT_PERIOD_DIVISOR: f32 = 200.0;

#[derive(Debug, Clone)]
pub struct Item {
    /// Tile units
    pub pos: Vec2,
    pub value: u32,
    pub age_ms: f32,
    pub active: bool,
    float_offset: f32,
}

impl Item {
    pub fn new(pos: Vec2, value: u32) -> Self {
        Self {
            pos,
            value,
            age_ms: 0.0,
            active: true,
            float_offset: 0.0,
        }
    }

    pub fn tick(&mut self, dt_ms: f32) {
        self.age_ms += dt_ms;
        if self.age_ms > ITEM_LIFETIME_MS {
            self.active = false;
        }
        self.float_offset = (self.age_ms / FLOAT_PERIOD_DIVISOR).sin() * FLOAT_AMPLITUDE;
    }

    /// Vertical bob in pixels
    pub fn float_offset(&self) -> f32 {
        self.float_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_after_lifetime() {
        let mut item = Item::new(Vec2::new(3.0, 7.0), 10);
        item.tick(ITEM_LIFETIME_MS);
        assert!(item.active);
        item.tick(1.0);
        assert!(!item.active);
    }

    #[test]
    fn test_float_offset_stays_bounded() {
        let mut item = Item::new(Vec2::ZERO, 1);
        for _ in 0..300 {
            item.tick(16.0);
            assert!(item.float_offset().abs() <= FLOAT_AMPLITUDE);
        }
        item = Item::new(Vec2::ZERO, 1);
        item.tick(100.0);
        assert!((item.float_offset() - 0.5f32.sin() * 5.0).abs() < 1e-5);
    }
}
