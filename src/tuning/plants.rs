//! Plant records: the static stat block each plant type starts from

use serde::{Deserialize, Serialize};

/// Every plant type in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantKind {
    Seed,
    Peashooter,
    Slow,
    Thorn,
    Cactus,
    BombFlower,
    FrostLotus,
    Sunflare,
    WorldTree,
}

impl PlantKind {
    pub const ALL: [PlantKind; 9] = [
        PlantKind::Seed,
        PlantKind::Peashooter,
        PlantKind::Slow,
        PlantKind::Thorn,
        PlantKind::Cactus,
        PlantKind::BombFlower,
        PlantKind::FrostLotus,
        PlantKind::Sunflare,
        PlantKind::WorldTree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlantKind::Seed => "seed",
            PlantKind::Peashooter => "peashooter",
            PlantKind::Slow => "slow",
            PlantKind::Thorn => "thorn",
            PlantKind::Cactus => "cactus",
            PlantKind::BombFlower => "bomb_flower",
            PlantKind::FrostLotus => "frost_lotus",
            PlantKind::Sunflare => "sunflare",
            PlantKind::WorldTree => "world_tree",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

/// Gacha rarity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
        }
    }
}

/// On-hit effect carried by a plant's projectiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Slows the target on hit
    Ice,
    /// Explosion flash at the target (visual only)
    Splash,
    /// Large explosion flash at the target (visual only)
    Nuke,
}

/// Static data for one plant type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub id: PlantKind,
    pub name: String,
    pub rarity: Rarity,
    /// Mana cost to place
    pub cost: u32,
    /// Damage per projectile at level 1
    pub damage: f32,
    /// Targeting range in tiles
    pub range: f32,
    /// Base attack cooldown, also the in-wave placement cooldown (ms)
    pub cooldown: u32,
    /// CSS color used when drawing the plant and its projectiles
    pub color: String,
    #[serde(default)]
    pub effect: Option<Effect>,
}

impl PlantRecord {
    /// Stat block used when the catalog has no record for a plant type
    pub fn fallback(id: PlantKind) -> Self {
        Self {
            id,
            name: id.as_str().to_string(),
            rarity: Rarity::Common,
            cost: 50,
            damage: 10.0,
            range: 3.5,
            cooldown: 1000,
            color: "#ccc".to_string(),
            effect: None,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn record(
    id: PlantKind,
    name: &str,
    rarity: Rarity,
    cost: u32,
    damage: f32,
    range: f32,
    cooldown: u32,
    color: &str,
    effect: Option<Effect>,
) -> PlantRecord {
    PlantRecord {
        id,
        name: name.to_string(),
        rarity,
        cost,
        damage,
        range,
        cooldown,
        color: color.to_string(),
        effect,
    }
}

/// Built-in plant table
pub fn builtin_plants() -> Vec<PlantRecord> {
    use Effect::*;
    use PlantKind::*;
    use Rarity::*;

    vec![
        record(Seed, "Seedling", Common, 25, 5.0, 2.5, 800, "#b8e0d2", None),
        record(Peashooter, "Peashooter", Common, 50, 15.0, 3.5, 1000, "#76c7c0", None),
        record(Slow, "Frost Sprout", Common, 75, 8.0, 3.0, 1200, "#a8dadc", Some(Ice)),
        record(Thorn, "Thornbush", Common, 60, 12.0, 2.0, 600, "#6a994e", None),
        record(Cactus, "Cactus", Rare, 100, 30.0, 4.5, 1500, "#588157", None),
        record(BombFlower, "Bomb Flower", Rare, 125, 40.0, 2.5, 2000, "#f4a261", Some(Splash)),
        record(FrostLotus, "Frost Lotus", Rare, 110, 18.0, 4.0, 1100, "#90e0ef", Some(Ice)),
        record(Sunflare, "Sunflare", Legendary, 200, 80.0, 5.0, 2500, "#ffb703", Some(Nuke)),
        record(WorldTree, "World Tree", Legendary, 250, 45.0, 6.0, 900, "#2d6a4f", None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_string_round_trip() {
        for kind in PlantKind::ALL {
            assert_eq!(PlantKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(PlantKind::from_str("triffid"), None);
    }

    #[test]
    fn test_serde_ids_match_as_str() {
        for kind in PlantKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_builtin_covers_every_kind_once() {
        let plants = builtin_plants();
        assert_eq!(plants.len(), PlantKind::ALL.len());
        for kind in PlantKind::ALL {
            assert_eq!(plants.iter().filter(|p| p.id == kind).count(), 1);
        }
    }
}
