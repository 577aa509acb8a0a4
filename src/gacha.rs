//! Gacha: spend gems on random plants
//!
//! A pull first rolls a rarity by weight, then picks uniformly among the
//! catalog's plants of that rarity. Duplicates level the plant up.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::progress::PlayerState;
use crate::tuning::{Catalog, PlantKind, PlantRecord, Rarity, RarityWeights};

pub const SINGLE_PULL_COST: u64 = 100;
pub const MULTI_PULL_COST: u64 = 1000;
pub const MULTI_PULL_COUNT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GachaError {
    #[error("not enough gems: need {cost}, have {gems}")]
    InsufficientGems { cost: u64, gems: u64 },
    #[error("pulls come in 1 or 10, not {0}")]
    InvalidCount(u32),
    #[error("no {} plants in the catalog", .0.as_str())]
    EmptyPool(Rarity),
}

/// One plant drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullEntry {
    pub kind: PlantKind,
    pub rarity: Rarity,
    /// First copy owned
    pub is_new: bool,
    /// Level after this pull
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullResult {
    pub gems_spent: u64,
    pub entries: Vec<PullEntry>,
}

pub struct GachaSystem {
    rng: Pcg32,
}

impl GachaSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn cost_for(count: u32) -> Result<u64, GachaError> {
        match count {
            1 => Ok(SINGLE_PULL_COST),
            MULTI_PULL_COUNT => Ok(MULTI_PULL_COST),
            other => Err(GachaError::InvalidCount(other)),
        }
    }

    /// Roll a rarity. Weights are subtracted in fixed order; the first to
    /// bring the roll to zero or below wins.
    pub fn roll_rarity(&mut self, weights: &RarityWeights) -> Rarity {
        let mut roll = self.rng.random::<f64>() * weights.total() as f64;
        for (rarity, weight) in weights.entries() {
            roll -= weight as f64;
            if roll <= 0.0 {
                return rarity;
            }
        }
        Rarity::Common
    }

    /// Roll one plant from the catalog
    pub fn roll<'c>(&mut self, catalog: &'c Catalog) -> Result<&'c PlantRecord, GachaError> {
        let rarity = self.roll_rarity(&catalog.rarity_weights);
        let pool: Vec<&PlantRecord> = catalog.plants_of_rarity(rarity).collect();
        if pool.is_empty() {
            return Err(GachaError::EmptyPool(rarity));
        }
        let pick = self.rng.random_range(0..pool.len());
        Ok(pool[pick])
    }

    /// Charge the player and draw `count` plants into their inventory.
    ///
    /// Nothing is charged if the player can't afford it or the catalog can't
    /// supply every rollable rarity.
    pub fn pull(
        &mut self,
        count: u32,
        player: &mut PlayerState,
        catalog: &Catalog,
    ) -> Result<PullResult, GachaError> {
        let cost = Self::cost_for(count)?;
        if player.gems() < cost {
            return Err(GachaError::InsufficientGems {
                cost,
                gems: player.gems(),
            });
        }
        for (rarity, weight) in catalog.rarity_weights.entries() {
            if weight > 0 && catalog.plants_of_rarity(rarity).next().is_none() {
                return Err(GachaError::EmptyPool(rarity));
            }
        }

        player
            .spend_gems(cost)
            .map_err(|_| GachaError::InsufficientGems {
                cost,
                gems: player.gems(),
            })?;

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let record = self.roll(catalog)?;
            let is_new = player.add_to_inventory(record.id);
            entries.push(PullEntry {
                kind: record.id,
                rarity: record.rarity,
                is_new,
                level: player.plant_level(record.id),
            });
        }

        log::info!(
            "Gacha pull x{}: {}",
            count,
            entries
                .iter()
                .map(|e| e.kind.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(PullResult {
            gems_spent: cost,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn player() -> PlayerState {
        PlayerState::load(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_rarity_distribution() {
        let mut gacha = GachaSystem::new(42);
        let weights = RarityWeights::default();
        let mut counts = [0u32; 3];
        let rolls = 100_000;
        for _ in 0..rolls {
            match gacha.roll_rarity(&weights) {
                Rarity::Common => counts[0] += 1,
                Rarity::Rare => counts[1] += 1,
                Rarity::Legendary => counts[2] += 1,
            }
        }
        let share = |n: u32| n as f64 / rolls as f64;
        assert!((share(counts[0]) - 0.70).abs() < 0.01);
        assert!((share(counts[1]) - 0.25).abs() < 0.01);
        assert!((share(counts[2]) - 0.05).abs() < 0.01);
    }

    #[test]
    fn test_rolled_plant_matches_rarity() {
        let catalog = Catalog::builtin();
        let mut gacha = GachaSystem::new(7);
        for _ in 0..500 {
            let record = gacha.roll(&catalog).unwrap();
            assert_eq!(catalog.plant(record.id).unwrap().rarity, record.rarity);
        }
    }

    #[test]
    fn test_single_pull_charges_and_grants() {
        let catalog = Catalog::builtin();
        let mut gacha = GachaSystem::new(1);
        let mut player = player();

        let result = gacha.pull(1, &mut player, &catalog).unwrap();
        assert_eq!(result.gems_spent, 100);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(player.gems(), 900);

        let entry = &result.entries[0];
        assert!(player.owns(entry.kind));
        assert_eq!(player.plant_level(entry.kind), entry.level);
    }

    #[test]
    fn test_multi_pull_tracks_duplicates() {
        let catalog = Catalog::builtin();
        let mut gacha = GachaSystem::new(3);
        let mut player = player();

        let result = gacha.pull(10, &mut player, &catalog).unwrap();
        assert_eq!(result.entries.len(), 10);
        assert_eq!(player.gems(), 0);

        // A plant that shows up again within the pull is never new the second time
        for (i, entry) in result.entries.iter().enumerate() {
            if result.entries[..i].iter().any(|e| e.kind == entry.kind) {
                assert!(!entry.is_new);
            }
        }
        let last = result.entries.last().unwrap();
        assert_eq!(player.plant_level(last.kind), last.level);
    }

    #[test]
    fn test_insufficient_gems_leaves_player_untouched() {
        let catalog = Catalog::builtin();
        let mut gacha = GachaSystem::new(1);
        let mut player = player();
        player.spend_gems(950).unwrap();
        let before = player.progress().clone();

        assert_eq!(
            gacha.pull(1, &mut player, &catalog),
            Err(GachaError::InsufficientGems { cost: 100, gems: 50 })
        );
        assert_eq!(player.progress(), &before);
    }

    #[test]
    fn test_invalid_count() {
        let catalog = Catalog::builtin();
        let mut gacha = GachaSystem::new(1);
        let mut player = player();
        assert_eq!(gacha.pull(5, &mut player, &catalog), Err(GachaError::InvalidCount(5)));
        assert_eq!(player.gems(), 1000);
    }

    #[test]
    fn test_empty_pool_is_refused_before_charging() {
        let mut catalog = Catalog::builtin();
        catalog.plants.retain(|p| p.rarity != Rarity::Legendary);
        let mut gacha = GachaSystem::new(1);
        let mut player = player();
        assert_eq!(
            gacha.pull(1, &mut player, &catalog),
            Err(GachaError::EmptyPool(Rarity::Legendary))
        );
        assert_eq!(player.gems(), 1000);
    }
}
