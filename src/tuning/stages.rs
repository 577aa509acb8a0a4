//! Stage and wave definitions

use serde::{Deserialize, Serialize};

use super::EnemyKind;

/// What a wave spawns: a single enemy kind, or one of the composite groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveKind {
    Normal,
    Fast,
    Tank,
    Tiny,
    /// Each unit picked at random (weighted)
    Mix,
    /// Each unit is a boss escorted by five tanks
    Boss,
}

impl WaveKind {
    /// The enemy kind for single-kind waves
    pub fn single_kind(&self) -> Option<EnemyKind> {
        match self {
            WaveKind::Normal => Some(EnemyKind::Normal),
            WaveKind::Fast => Some(EnemyKind::Fast),
            WaveKind::Tank => Some(EnemyKind::Tank),
            WaveKind::Tiny => Some(EnemyKind::Tiny),
            WaveKind::Mix | WaveKind::Boss => None,
        }
    }
}

/// One wave of a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveDef {
    pub count: u32,
    #[serde(rename = "type")]
    pub kind: WaveKind,
    /// Milliseconds between spawns
    pub interval: u32,
}

/// A playable stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_background")]
    pub background: String,
    pub waves: Vec<WaveDef>,
    /// Gems awarded on victory
    pub reward: u64,
}

fn default_background() -> String {
    "#2d4a3e".to_string()
}

fn wave(count: u32, kind: WaveKind, interval: u32) -> WaveDef {
    WaveDef {
        count,
        kind,
        interval,
    }
}

fn stage(id: u32, name: &str, background: &str, waves: Vec<WaveDef>, reward: u64) -> Stage {
    Stage {
        id,
        name: name.to_string(),
        background: background.to_string(),
        waves,
        reward,
    }
}

/// Built-in stage list
pub fn builtin_stages() -> Vec<Stage> {
    use WaveKind::*;

    vec![
        stage(1, "Stage 1: Beginnings", "#2d4a3e", vec![wave(10, Normal, 1500), wave(5, Fast, 1200)], 100),
        stage(2, "Stage 2: Charge", "#2b4538", vec![wave(15, Fast, 800), wave(10, Normal, 1000)], 150),
        stage(3, "Stage 3: Heavy Armor", "#283f33", vec![wave(8, Tank, 2500), wave(15, Normal, 1000)], 200),
        stage(4, "Stage 4: Mixed Company", "#263a2e", vec![wave(20, Mix, 1000), wave(10, Tank, 2000)], 250),
        stage(5, "Stage 5: The Boss Appears", "#233429", vec![wave(20, Fast, 600), wave(1, Boss, 5000)], 500),
        stage(6, "Stage 6: The Horde", "#2d4a3e", vec![wave(50, Normal, 400)], 300),
        stage(7, "Stage 7: Armored Division", "#2b4538", vec![wave(20, Tank, 1500), wave(3, Boss, 8000)], 350),
        stage(8, "Stage 8: Chaos", "#283f33", vec![wave(30, Mix, 700), wave(40, Mix, 500)], 400),
        stage(
            9,
            "Stage 9: Sundown",
            "#1a2f23",
            vec![wave(20, Fast, 300), wave(15, Tank, 1500), wave(30, Fast, 300)],
            450,
        ),
        stage(10, "Stage 10: Final Stand", "#0f1c15", vec![wave(3, Boss, 6000), wave(50, Mix, 500)], 1000),
        stage(11, "Stage 11: A New Threat", "#2d4a3e", vec![wave(100, Tiny, 200), wave(20, Mix, 800)], 600),
        stage(12, "Stage 12: Iron March", "#2b4538", vec![wave(30, Tank, 1500), wave(50, Tiny, 300)], 700),
        stage(
            13,
            "Stage 13: Encirclement",
            "#283f33",
            vec![wave(100, Tiny, 150), wave(50, Mix, 400), wave(2, Boss, 8000)],
            800,
        ),
        stage(14, "Stage 14: Night Parade", "#1a2f23", vec![wave(5, Boss, 5000), wave(50, Fast, 300)], 900),
        stage(
            15,
            "Stage 15: The Abyss",
            "#05100e",
            vec![
                wave(1, Boss, 1000),
                wave(200, Tiny, 100),
                wave(100, Mix, 250),
                wave(5, Boss, 4000),
            ],
            2000,
        ),
    ]
}
