//! Persistent player progress
//!
//! Gems, owned plants and their levels, the deck, the highest unlocked stage
//! and tech levels. Every mutation is written through to the store right away.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::DECK_SLOTS;
use crate::persistence::KeyValueStore;
use crate::persistence::save::{SAVE_KEY, decode_progress, encode_progress};
use crate::sim::Loadout;
use crate::tuning::{PlantKind, TechId};

/// Gem cost per current level to upgrade a plant
pub const UPGRADE_COST_PER_LEVEL: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("not enough gems: need {cost}, have {gems}")]
    InsufficientGems { cost: u64, gems: u64 },
    #[error("{0} is already at max level")]
    MaxLevel(&'static str),
    #[error("plant {0} is not owned")]
    NotOwned(&'static str),
    #[error("deck slot {slot} does not exist")]
    InvalidSlot { slot: usize },
    #[error("{kind} is already in deck slot {slot}")]
    AlreadyInDeck { kind: &'static str, slot: usize },
}

/// The saved record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub gems: u64,
    /// Owned plants and their levels
    pub inventory: BTreeMap<PlantKind, u32>,
    pub deck: [Option<PlantKind>; DECK_SLOTS],
    #[serde(rename = "maxStage")]
    pub max_stage: u32,
    pub technologies: BTreeMap<TechId, u32>,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            gems: 1000,
            inventory: [
                (PlantKind::Seed, 1),
                (PlantKind::Peashooter, 1),
                (PlantKind::Slow, 1),
            ]
            .into_iter()
            .collect(),
            deck: [
                Some(PlantKind::Seed),
                Some(PlantKind::Peashooter),
                Some(PlantKind::Slow),
                None,
                None,
            ],
            max_stage: 1,
            technologies: TechId::ALL.into_iter().map(|id| (id, 0)).collect(),
        }
    }
}

/// Player progress bound to the store it persists to
pub struct PlayerState {
    progress: PlayerProgress,
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerState")
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl PlayerState {
    /// Load from the store, or start fresh if nothing usable is saved
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let progress = match store.get(SAVE_KEY) {
            Ok(Some(json)) => {
                log::info!("Loaded save");
                decode_progress(&json)
            }
            Ok(None) => {
                log::info!("No save found, starting fresh");
                PlayerProgress::default()
            }
            Err(e) => {
                log::warn!("Could not read save: {}", e);
                PlayerProgress::default()
            }
        };
        Self { progress, store }
    }

    pub fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    pub fn gems(&self) -> u64 {
        self.progress.gems
    }

    pub fn deck(&self) -> &[Option<PlantKind>; DECK_SLOTS] {
        &self.progress.deck
    }

    pub fn max_stage(&self) -> u32 {
        self.progress.max_stage
    }

    pub fn owns(&self, kind: PlantKind) -> bool {
        self.progress.inventory.contains_key(&kind)
    }

    /// Level of a plant; unowned plants count as level 1
    pub fn plant_level(&self, kind: PlantKind) -> u32 {
        self.progress.inventory.get(&kind).copied().unwrap_or(1)
    }

    pub fn tech_level(&self, id: TechId) -> u32 {
        self.progress.technologies.get(&id).copied().unwrap_or(0)
    }

    fn save(&mut self) {
        let json = match encode_progress(&self.progress) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to encode save: {}", e);
                return;
            }
        };
        match self.store.set(SAVE_KEY, &json) {
            Ok(()) => log::debug!("Game saved"),
            Err(e) => log::warn!("Failed to write save: {}", e),
        }
    }

    /// Add a plant. Returns true if it was new; a duplicate levels it up.
    pub fn add_to_inventory(&mut self, kind: PlantKind) -> bool {
        let is_new = match self.progress.inventory.get_mut(&kind) {
            Some(level) => {
                *level += 1;
                false
            }
            None => {
                self.progress.inventory.insert(kind, 1);
                true
            }
        };
        self.save();
        is_new
    }

    pub fn upgrade_cost(&self, kind: PlantKind) -> u64 {
        self.plant_level(kind) as u64 * UPGRADE_COST_PER_LEVEL
    }

    /// Spend gems to raise a plant's level. Returns the new level.
    pub fn upgrade_plant(&mut self, kind: PlantKind) -> Result<u32, PurchaseError> {
        if !self.owns(kind) {
            return Err(PurchaseError::NotOwned(kind.as_str()));
        }
        let cost = self.upgrade_cost(kind);
        self.charge(cost)?;

        let level = self.progress.inventory.entry(kind).or_insert(1);
        *level += 1;
        let level = *level;
        self.save();
        log::info!("Upgraded {} to level {}", kind.as_str(), level);
        Ok(level)
    }

    /// Gem cost of the next tech level, None when maxed
    pub fn tech_cost(&self, id: TechId) -> Option<u64> {
        id.cost_at(self.tech_level(id))
    }

    /// Spend gems on a tech level. Returns the new level.
    pub fn upgrade_tech(&mut self, id: TechId) -> Result<u32, PurchaseError> {
        let cost = self
            .tech_cost(id)
            .ok_or(PurchaseError::MaxLevel(id.as_str()))?;
        self.charge(cost)?;

        let level = self.progress.technologies.entry(id).or_insert(0);
        *level += 1;
        let level = *level;
        self.save();
        log::info!("Researched {} level {}", id.as_str(), level);
        Ok(level)
    }

    /// Put a plant (or nothing) in a deck slot. A plant occupies at most one slot.
    pub fn set_deck(&mut self, slot: usize, kind: Option<PlantKind>) -> Result<(), PurchaseError> {
        if slot >= DECK_SLOTS {
            return Err(PurchaseError::InvalidSlot { slot });
        }
        if let Some(kind) = kind {
            if !self.owns(kind) {
                return Err(PurchaseError::NotOwned(kind.as_str()));
            }
            let existing = self
                .progress
                .deck
                .iter()
                .position(|equipped| *equipped == Some(kind));
            if let Some(other) = existing {
                if other != slot {
                    return Err(PurchaseError::AlreadyInDeck {
                        kind: kind.as_str(),
                        slot: other,
                    });
                }
            }
        }
        self.progress.deck[slot] = kind;
        self.save();
        Ok(())
    }

    /// Raise the highest unlocked stage. Never lowers it.
    pub fn unlock_stage(&mut self, stage: u32) {
        if stage > self.progress.max_stage {
            self.progress.max_stage = stage;
            self.save();
            log::info!("Unlocked stage {}", stage);
        }
    }

    pub fn add_gems(&mut self, amount: u64) {
        self.progress.gems = self.progress.gems.saturating_add(amount);
        self.save();
    }

    pub fn spend_gems(&mut self, amount: u64) -> Result<(), PurchaseError> {
        self.charge(amount)?;
        self.save();
        Ok(())
    }

    fn charge(&mut self, cost: u64) -> Result<(), PurchaseError> {
        if self.progress.gems < cost {
            return Err(PurchaseError::InsufficientGems {
                cost,
                gems: self.progress.gems,
            });
        }
        self.progress.gems -= cost;
        Ok(())
    }

    /// What the player takes into a match
    pub fn loadout(&self) -> Loadout {
        Loadout {
            deck: self.progress.deck,
            plant_levels: self.progress.inventory.clone(),
            techs: self.progress.technologies.clone(),
        }
    }
}
