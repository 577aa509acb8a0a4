//! Technology tree definitions

use serde::{Deserialize, Serialize};

/// Global upgrades bought with gems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechId {
    /// Widens the placeable column range
    BoardExpansion,
    /// Shortens every plant's attack cooldown by 5% per level
    GlobalSpeed,
    /// Raises the plant cap by 2 per level
    MaxPlants,
}

/// Static data for one technology
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechRecord {
    pub name: &'static str,
    pub description: &'static str,
    pub max_level: u32,
    pub base_cost: u64,
    pub cost_mult: f64,
}

impl TechId {
    pub const ALL: [TechId; 3] = [TechId::BoardExpansion, TechId::GlobalSpeed, TechId::MaxPlants];

    pub fn as_str(&self) -> &'static str {
        match self {
            TechId::BoardExpansion => "board_expansion",
            TechId::GlobalSpeed => "global_speed",
            TechId::MaxPlants => "max_plants",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }

    pub fn record(&self) -> TechRecord {
        match self {
            TechId::BoardExpansion => TechRecord {
                name: "Field Expansion",
                description: "Unlocks more columns for planting",
                max_level: 5,
                base_cost: 500,
                cost_mult: 2.0,
            },
            TechId::GlobalSpeed => TechRecord {
                name: "Selective Breeding",
                description: "All plants attack 5% faster",
                max_level: 10,
                base_cost: 300,
                cost_mult: 1.5,
            },
            TechId::MaxPlants => TechRecord {
                name: "Cultivation Management",
                description: "Two more plants may be placed at once",
                max_level: 10,
                base_cost: 400,
                cost_mult: 1.5,
            },
        }
    }

    /// Gem cost to go from `level` to `level + 1`, or None when maxed
    pub fn cost_at(&self, level: u32) -> Option<u64> {
        let record = self.record();
        if level >= record.max_level {
            return None;
        }
        Some((record.base_cost as f64 * record.cost_mult.powi(level as i32)).floor() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_curve() {
        assert_eq!(TechId::BoardExpansion.cost_at(0), Some(500));
        assert_eq!(TechId::BoardExpansion.cost_at(1), Some(1000));
        assert_eq!(TechId::GlobalSpeed.cost_at(1), Some(450));
        assert_eq!(TechId::GlobalSpeed.cost_at(2), Some(675));
        assert_eq!(TechId::MaxPlants.cost_at(3), Some(1350));
    }

    #[test]
    fn test_maxed_tech_has_no_cost() {
        assert_eq!(TechId::BoardExpansion.cost_at(5), None);
        assert_eq!(TechId::GlobalSpeed.cost_at(10), None);
    }
}
