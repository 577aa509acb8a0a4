//! Enemy presets, fixed per kind at construction

use serde::{Deserialize, Serialize};

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Normal,
    Fast,
    Tank,
    Boss,
    Tiny,
}

/// Silhouette drawn for an enemy kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyShape {
    Circle,
    Triangle,
    Square,
    /// Eight-pointed star
    Star,
    Diamond,
}

/// Stat block for one enemy kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyPreset {
    /// Movement speed in tiles per second
    pub speed: f32,
    pub max_health: f32,
    /// Mana credited when killed
    pub reward: u32,
    /// Damage dealt to a blocking plant per attack
    pub attack_damage: f32,
    pub color: &'static str,
    pub shape: EnemyShape,
}

impl EnemyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Normal => "normal",
            EnemyKind::Fast => "fast",
            EnemyKind::Tank => "tank",
            EnemyKind::Boss => "boss",
            EnemyKind::Tiny => "tiny",
        }
    }

    pub fn preset(&self) -> EnemyPreset {
        match self {
            EnemyKind::Normal => EnemyPreset {
                speed: 2.0,
                max_health: 100.0,
                reward: 10,
                attack_damage: 10.0,
                color: "#e76f51",
                shape: EnemyShape::Circle,
            },
            EnemyKind::Fast => EnemyPreset {
                speed: 4.0,
                max_health: 60.0,
                reward: 15,
                attack_damage: 5.0,
                color: "#e9c46a",
                shape: EnemyShape::Triangle,
            },
            EnemyKind::Tank => EnemyPreset {
                speed: 1.0,
                max_health: 300.0,
                reward: 25,
                attack_damage: 20.0,
                color: "#2a9d8f",
                shape: EnemyShape::Square,
            },
            EnemyKind::Boss => EnemyPreset {
                speed: 0.8,
                max_health: 2000.0,
                reward: 500,
                attack_damage: 50.0,
                color: "#000",
                shape: EnemyShape::Star,
            },
            EnemyKind::Tiny => EnemyPreset {
                speed: 3.0,
                max_health: 20.0,
                reward: 2,
                attack_damage: 2.0,
                color: "#8e44ad",
                shape: EnemyShape::Diamond,
            },
        }
    }
}
