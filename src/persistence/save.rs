//! Player save record encoding
//!
//! The record is a flat JSON object:
//! `{gems, inventory, deck, maxStage, technologies}`. Decoding never fails;
//! each field that is missing or has the wrong shape falls back to its
//! default on its own.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::consts::DECK_SLOTS;
use crate::progress::PlayerProgress;
use crate::tuning::{PlantKind, TechId};

/// Storage key for the player save
pub const SAVE_KEY: &str = "symbiosis_save";

pub fn encode_progress(progress: &PlayerProgress) -> Result<String, serde_json::Error> {
    serde_json::to_string(progress)
}

/// Decode a save record, defaulting anything unusable
pub fn decode_progress(json: &str) -> PlayerProgress {
    let defaults = PlayerProgress::default();

    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to parse save, using defaults: {}", e);
            return defaults;
        }
    };
    let Some(record) = value.as_object() else {
        log::warn!("Save is not an object, using defaults");
        return defaults;
    };

    let gems = record
        .get("gems")
        .and_then(Value::as_u64)
        .unwrap_or(defaults.gems);

    let inventory = record
        .get("inventory")
        .and_then(decode_inventory)
        .unwrap_or(defaults.inventory);

    let deck = record
        .get("deck")
        .and_then(decode_deck)
        .unwrap_or(defaults.deck);

    let max_stage = record
        .get("maxStage")
        .and_then(Value::as_u64)
        .filter(|&stage| stage >= 1)
        .map(|stage| stage as u32)
        .unwrap_or(defaults.max_stage);

    let technologies = record
        .get("technologies")
        .and_then(decode_technologies)
        .unwrap_or(defaults.technologies);

    PlayerProgress {
        gems,
        inventory,
        deck,
        max_stage,
        technologies,
    }
}

fn plant_id(value: &Value) -> Option<PlantKind> {
    let id = value.as_str()?;
    let kind = PlantKind::from_str(id);
    if kind.is_none() {
        log::warn!("Dropping unknown plant id '{}' from save", id);
    }
    kind
}

fn decode_inventory(value: &Value) -> Option<BTreeMap<PlantKind, u32>> {
    match value {
        // Older saves stored owned plant ids as a list
        Value::Array(ids) => {
            log::info!("Migrating list inventory ({} plants)", ids.len());
            Some(ids.iter().filter_map(plant_id).map(|kind| (kind, 1)).collect())
        }
        Value::Object(levels) => Some(
            levels
                .iter()
                .filter_map(|(id, level)| {
                    let kind = plant_id(&Value::String(id.clone()))?;
                    let level = level.as_u64().filter(|&l| l >= 1).unwrap_or(1);
                    Some((kind, level as u32))
                })
                .collect(),
        ),
        _ => None,
    }
}

fn decode_deck(value: &Value) -> Option<[Option<PlantKind>; DECK_SLOTS]> {
    let slots = value.as_array()?;
    let mut deck = [None; DECK_SLOTS];
    for (slot, entry) in deck.iter_mut().zip(slots) {
        *slot = plant_id(entry);
    }
    Some(deck)
}

fn decode_technologies(value: &Value) -> Option<BTreeMap<TechId, u32>> {
    let levels = value.as_object()?;
    Some(
        TechId::ALL
            .into_iter()
            .map(|id| {
                let level = levels
                    .get(id.as_str())
                    .and_then(Value::as_u64)
                    .map(|l| (l as u32).min(id.record().max_level))
                    .unwrap_or(0);
                (id, level)
            })
            .collect(),
    )
}
