//! Data-driven game balance
//!
//! Plant stats, enemy presets, stage layouts and tech costs. The plant and
//! stage tables can be replaced by loading a catalog from JSON.

pub mod enemies;
pub mod plants;
pub mod stages;
pub mod tech;

pub use enemies::{EnemyKind, EnemyPreset, EnemyShape};
pub use plants::{Effect, PlantKind, PlantRecord, Rarity};
pub use stages::{Stage, WaveDef, WaveKind};
pub use tech::{TechId, TechRecord};

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gacha rarity weights, rolled in the fixed order common, rare, legendary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityWeights {
    pub common: u32,
    pub rare: u32,
    pub legendary: u32,
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self {
            common: 70,
            rare: 25,
            legendary: 5,
        }
    }
}

impl RarityWeights {
    pub fn entries(&self) -> [(Rarity, u32); 3] {
        [
            (Rarity::Common, self.common),
            (Rarity::Rare, self.rare),
            (Rarity::Legendary, self.legendary),
        ]
    }

    pub fn total(&self) -> u32 {
        self.common + self.rare + self.legendary
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog has no stages")]
    NoStages,
}

/// All static tables the game reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub plants: Vec<PlantRecord>,
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub rarity_weights: RarityWeights,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            plants: plants::builtin_plants(),
            stages: stages::builtin_stages(),
            rarity_weights: RarityWeights::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        if catalog.stages.is_empty() {
            return Err(CatalogError::NoStages);
        }
        log::info!(
            "Loaded catalog: {} plants, {} stages",
            catalog.plants.len(),
            catalog.stages.len()
        );
        Ok(catalog)
    }

    pub fn plant(&self, kind: PlantKind) -> Option<&PlantRecord> {
        self.plants.iter().find(|p| p.id == kind)
    }

    /// Plant record, or the fallback stat block if the catalog lacks it
    pub fn plant_or_fallback(&self, kind: PlantKind) -> Cow<'_, PlantRecord> {
        match self.plant(kind) {
            Some(record) => Cow::Borrowed(record),
            None => {
                log::error!("Plant type {} not found in catalog, using fallback", kind.as_str());
                Cow::Owned(PlantRecord::fallback(kind))
            }
        }
    }

    pub fn plants_of_rarity(&self, rarity: Rarity) -> impl Iterator<Item = &PlantRecord> {
        self.plants.iter().filter(move |p| p.rarity == rarity)
    }

    pub fn stage(&self, id: u32) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_every_rarity() {
        let catalog = Catalog::builtin();
        for (rarity, _) in catalog.rarity_weights.entries() {
            assert!(catalog.plants_of_rarity(rarity).next().is_some());
        }
    }

    #[test]
    fn test_missing_plant_uses_fallback() {
        let mut catalog = Catalog::builtin();
        catalog.plants.retain(|p| p.id != PlantKind::Cactus);

        let record = catalog.plant_or_fallback(PlantKind::Cactus);
        assert_eq!(record.range, 3.5);
        assert_eq!(record.damage, 10.0);
        assert_eq!(record.cooldown, 1000);
        assert_eq!(record.effect, None);
    }

    #[test]
    fn test_from_json_round_trip() {
        let json = serde_json::to_string(&Catalog::builtin()).unwrap();
        let catalog = Catalog::from_json(&json).unwrap();
        assert_eq!(catalog.stages.len(), 15);
        assert_eq!(catalog.plant(PlantKind::Slow).unwrap().effect, Some(Effect::Ice));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(Catalog::from_json("{oops"), Err(CatalogError::Parse(_))));
        assert!(matches!(
            Catalog::from_json(r#"{"plants": [], "stages": []}"#),
            Err(CatalogError::NoStages)
        ));
    }
}
