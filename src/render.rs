//! Canvas 2D rendering of a match
//!
//! Reads simulation state only; nothing here feeds back into the match.

use std::f64::consts::{PI, TAU};

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::settings::Settings;
use crate::sim::{Enemy, GameState, GrowthStage, Plant, TileKind};
use crate::tuning::{Catalog, Effect, EnemyShape};

/// How long an attack line stays visible (ms of battle clock)
const ATTACK_FLASH_MS: f64 = 100.0;

const PATH_COLOR: &str = "#6b4f3a";
const ROCK_COLOR: &str = "#555555";
const LOCKED_COLOR: &str = "#111111";
const SEED_COLOR: &str = "#b8e0d2";
const COIN_COLOR: &str = "#ffd700";
const SLOW_RING_COLOR: &str = "#7fdbff";

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            ctx,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
        })
    }

    pub fn draw(&self, game: &GameState, catalog: &Catalog, settings: &Settings) {
        let ctx = &self.ctx;
        let size = game.grid.tile_size() as f64;

        ctx.clear_rect(0.0, 0.0, self.width, self.height);

        for tile in game.grid.tiles() {
            let x = tile.coord.col as f64 * size;
            let y = tile.coord.row as f64 * size;
            let fill = match tile.kind {
                TileKind::Empty => game.stage.background.as_str(),
                TileKind::Path => PATH_COLOR,
                TileKind::Rock => ROCK_COLOR,
                TileKind::Locked => LOCKED_COLOR,
            };
            ctx.set_fill_style_str(fill);
            ctx.fill_rect(x, y, size, size);
            ctx.set_stroke_style_str("rgba(0,0,0,0.2)");
            ctx.set_line_width(1.0);
            ctx.stroke_rect(x, y, size, size);

            if let Some(plant) = &tile.plant {
                self.draw_plant(plant, catalog, settings, game.clock_ms, size);
            }
        }

        for enemy in &game.enemies {
            self.draw_enemy(enemy, settings, size);
        }

        for projectile in &game.projectiles {
            let color = catalog
                .plant(projectile.source)
                .map(|p| p.color.as_str())
                .unwrap_or("yellow");
            ctx.begin_path();
            ctx.set_fill_style_str(color);
            ctx.arc(projectile.pos.x as f64, projectile.pos.y as f64, 4.0, 0.0, TAU)
                .ok();
            ctx.fill();
        }

        for item in &game.items {
            let bob = if settings.reduced_motion {
                0.0
            } else {
                item.float_offset() as f64
            };
            let cx = item.pos.x as f64 * size + size / 2.0;
            let cy = item.pos.y as f64 * size + size / 2.0 + bob;
            ctx.begin_path();
            ctx.set_fill_style_str(COIN_COLOR);
            ctx.arc(cx, cy, 10.0, 0.0, TAU).ok();
            ctx.fill();
            ctx.set_stroke_style_str("#fff");
            ctx.set_line_width(2.0);
            ctx.stroke();
        }
    }

    fn draw_plant(
        &self,
        plant: &Plant,
        catalog: &Catalog,
        settings: &Settings,
        clock_ms: f64,
        size: f64,
    ) {
        let ctx = &self.ctx;
        let record = catalog.plant_or_fallback(plant.kind());
        let cx = plant.coord().col as f64 * size + size / 2.0;
        let cy = plant.coord().row as f64 * size + size / 2.0;

        if let Some(attack) = plant.last_attack() {
            if clock_ms - attack.at_ms < ATTACK_FLASH_MS {
                let tx = attack.target_pos.x as f64 * size + size / 2.0;
                let ty = attack.target_pos.y as f64 * size + size / 2.0;
                ctx.begin_path();
                match plant.effect() {
                    Some(Effect::Splash) | Some(Effect::Nuke) => {
                        let radius = if plant.effect() == Some(Effect::Nuke) {
                            size * 2.0
                        } else {
                            size
                        };
                        ctx.arc(tx, ty, radius, 0.0, TAU).ok();
                        ctx.set_fill_style_str("rgba(255, 100, 0, 0.5)");
                        ctx.fill();
                    }
                    _ => {
                        ctx.move_to(cx, cy);
                        ctx.line_to(tx, ty);
                        ctx.set_stroke_style_str(&record.color);
                        ctx.set_line_width(2.0);
                        ctx.stroke();
                    }
                }
            }
        }

        ctx.begin_path();
        match plant.stage() {
            GrowthStage::Seed => {
                ctx.set_fill_style_str(SEED_COLOR);
                ctx.arc(cx, cy, size * 0.2, 0.0, TAU).ok();
            }
            GrowthStage::Sprout | GrowthStage::Mature => {
                ctx.set_fill_style_str(&record.color);
                ctx.arc(cx, cy, size * 0.35, 0.0, TAU).ok();
            }
        }
        ctx.fill();

        if settings.show_ranges {
            ctx.begin_path();
            ctx.set_stroke_style_str("rgba(255,255,255,0.15)");
            ctx.set_line_width(1.0);
            ctx.arc(cx, cy, plant.stats().range as f64 * size, 0.0, TAU)
                .ok();
            ctx.stroke();
        }

        if settings.show_health_bars {
            self.health_bar(cx, cy - size * 0.45, size, plant.health(), plant.stats().max_health);
        }

        if settings.show_plant_levels && plant.level() > 1 {
            ctx.set_fill_style_str("#fff");
            ctx.set_font("10px sans-serif");
            ctx.fill_text(&format!("Lv{}", plant.level()), cx - size * 0.45, cy + size * 0.45)
                .ok();
        }
    }

    fn draw_enemy(&self, enemy: &Enemy, settings: &Settings, size: f64) {
        let ctx = &self.ctx;
        let pos = if settings.reduced_motion {
            enemy.pos
        } else {
            enemy.draw_pos()
        };
        let cx = pos.x as f64 * size + size / 2.0;
        let cy = pos.y as f64 * size + size / 2.0;

        let preset = enemy.kind.preset();
        ctx.set_fill_style_str(preset.color);
        ctx.set_stroke_style_str("#fff");
        ctx.set_line_width(1.0);
        ctx.begin_path();
        match preset.shape {
            EnemyShape::Circle => {
                ctx.arc(cx, cy, 8.0, 0.0, TAU).ok();
                ctx.fill();
            }
            EnemyShape::Triangle => {
                ctx.move_to(cx + 10.0, cy);
                ctx.line_to(cx - 10.0, cy - 10.0 / 1.5);
                ctx.line_to(cx - 10.0, cy + 10.0 / 1.5);
                ctx.close_path();
                ctx.fill();
                ctx.stroke();
            }
            EnemyShape::Square => {
                ctx.rect(cx - 12.0, cy - 12.0, 24.0, 24.0);
                ctx.fill();
                ctx.stroke();
                ctx.set_fill_style_str("rgba(0,0,0,0.3)");
                ctx.fill_rect(cx - 5.0, cy - 5.0, 10.0, 10.0);
            }
            EnemyShape::Star => {
                let spikes = 8;
                let step = PI / spikes as f64;
                let mut rot = PI * 1.5;
                ctx.move_to(cx, cy - 18.0);
                for _ in 0..spikes {
                    ctx.line_to(cx + rot.cos() * 18.0, cy + rot.sin() * 18.0);
                    rot += step;
                    ctx.line_to(cx + rot.cos() * 10.0, cy + rot.sin() * 10.0);
                    rot += step;
                }
                ctx.close_path();
                ctx.fill();
                ctx.stroke();
            }
            EnemyShape::Diamond => {
                ctx.move_to(cx, cy - 6.0);
                ctx.line_to(cx + 6.0, cy);
                ctx.line_to(cx, cy + 6.0);
                ctx.line_to(cx - 6.0, cy);
                ctx.close_path();
                ctx.fill();
            }
        }

        if enemy.is_slowed() {
            ctx.begin_path();
            ctx.set_stroke_style_str(SLOW_RING_COLOR);
            ctx.set_line_width(2.0);
            ctx.arc(cx, cy, size * 0.35, 0.0, TAU).ok();
            ctx.stroke();
        }

        if settings.show_health_bars {
            self.health_bar(cx, cy - size * 0.45, size, enemy.health, enemy.max_health);
        }
    }

    /// Drawn only when damaged
    fn health_bar(&self, cx: f64, top: f64, size: f64, health: f32, max_health: f32) {
        if max_health <= 0.0 || health >= max_health {
            return;
        }
        let ctx = &self.ctx;
        let width = size * 0.8;
        let fraction = (health / max_health).clamp(0.0, 1.0) as f64;
        ctx.set_fill_style_str("red");
        ctx.fill_rect(cx - width / 2.0, top, width, 4.0);
        ctx.set_fill_style_str("#2ecc71");
        ctx.fill_rect(cx - width / 2.0, top, width * fraction, 4.0);
    }
}
