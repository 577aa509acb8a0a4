//! Symbiosis entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use symbiosis::consts::*;
    use symbiosis::persistence::{KeyValueStore, LocalStore, MemoryStore};
    use symbiosis::render::CanvasRenderer;
    use symbiosis::sim::{GameEvent, GamePhase, Selection};
    use symbiosis::{Catalog, PlayerState, Session, Settings};

    /// Game instance holding all state
    struct Game {
        session: Session,
        settings: Settings,
        renderer: CanvasRenderer,
        last_time: f64,
        /// Cleared when the simulation hits an error; the loop stops for good
        running: bool,
    }

    impl Game {
        /// Advance the match by one frame
        fn update(&mut self, dt_ms: f32) {
            let dt_ms = self.settings.clamp_frame(dt_ms);
            match self.session.tick(dt_ms) {
                Ok(events) => {
                    for event in events {
                        log_event(&event);
                    }
                }
                Err(e) => {
                    self.running = false;
                    log::error!("Simulation stopped: {}", e);
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(&format!("Game error: {}", e));
                    }
                }
            }
        }

        fn render(&self) {
            if let Some(game) = self.session.game() {
                self.renderer
                    .draw(game, self.session.catalog(), &self.settings);
            }
        }

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let Some(game) = self.session.game() else {
                return;
            };

            if let Some(el) = document.get_element_by_id("mana-display") {
                el.set_text_content(Some(&game.mana.to_string()));
            }
            if let Some(el) = document.get_element_by_id("health-display") {
                el.set_text_content(Some(&game.health.max(0).to_string()));
            }
            if let Some(el) = document.get_element_by_id("enemy-count") {
                el.set_text_content(Some(&game.enemies_remaining().to_string()));
            }
            if let Some(el) = document.get_element_by_id("wave-display") {
                el.set_text_content(Some(&format!(
                    "{}/{}",
                    game.wave_index,
                    game.total_waves()
                )));
            }
            if let Some(el) = document.get_element_by_id("gem-display") {
                el.set_text_content(Some(&self.session.player().gems().to_string()));
            }
            if let Some(el) = document.get_element_by_id("result-banner") {
                let text = match game.phase {
                    GamePhase::Victory => "Victory!",
                    GamePhase::Defeat => "Defeat",
                    _ => "",
                };
                el.set_text_content(Some(text));
            }
        }

        fn handle_key(&mut self, key: &str) {
            let result = match key {
                "1" | "2" | "3" | "4" | "5" => {
                    let slot = key.parse::<usize>().unwrap_or(1) - 1;
                    let kind = self
                        .session
                        .game()
                        .and_then(|g| g.loadout.deck.get(slot).copied().flatten());
                    match kind {
                        Some(kind) => self.session.select_plant(Selection::Plant(kind)),
                        None => return,
                    }
                }
                "s" | "S" => self.session.select_plant(Selection::Shovel),
                "n" | "N" | " " => self.session.start_next_wave(),
                "r" | "R" => {
                    let stage = self.session.game().map(|g| g.stage.id).unwrap_or(1);
                    self.session.select_stage(stage)
                }
                _ => return,
            };
            if let Err(e) = result {
                log::warn!("{}", e);
            }
        }
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::WaveStarted { wave, enemies } => {
                log::info!("Wave {} incoming ({} enemies)", wave, enemies)
            }
            GameEvent::WaveComplete { wave } => log::info!("Wave {} cleared", wave),
            GameEvent::Victory => log::info!("Victory!"),
            GameEvent::Defeat => log::info!("Defeat"),
            GameEvent::EnemyKilled { kind, reward, .. } => {
                log::debug!("{} down, +{} mana", kind.as_str(), reward)
            }
            GameEvent::EnemyLeaked { kind, .. } => {
                log::debug!("{} reached the base", kind.as_str())
            }
        }
    }

    /// LocalStorage when the browser allows it, otherwise an in-memory store
    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("LocalStorage unavailable ({}), progress will not persist", e);
                Box::new(MemoryStore::new())
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let settings = Settings::load(&*open_store());
        let level = settings
            .log_level
            .filter()
            .to_level()
            .unwrap_or(log::Level::Info);
        console_log::init_with_level(level).map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Symbiosis starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;
        canvas.set_width(CANVAS_WIDTH as u32);
        canvas.set_height(CANVAS_HEIGHT as u32);

        let renderer = CanvasRenderer::new(&canvas)?;

        let player = PlayerState::load(open_store());
        let stage = player.max_stage();
        let seed = js_sys::Date::now() as u64;
        let mut session = Session::new(Catalog::builtin(), player, seed);
        if let Err(e) = session.select_stage(stage) {
            log::warn!("Stage {} unavailable ({}), starting stage 1", stage, e);
            session
                .select_stage(1)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
        }

        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session,
            settings,
            renderer,
            last_time: 0.0,
            running: true,
        }));

        setup_input_handlers(&canvas, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Symbiosis running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Board click - plant or dig
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                if rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return;
                }
                // Canvas may be scaled by CSS
                let scale_x = canvas_clone.width() as f64 / rect.width();
                let scale_y = canvas_clone.height() as f64 / rect.height();
                let x = (event.client_x() as f64 - rect.left()) * scale_x;
                let y = (event.client_y() as f64 - rect.top()) * scale_y;

                let mut g = game.borrow_mut();
                if let Err(e) = g.session.place_or_clear(x as f32, y as f32) {
                    log::info!("{}", e);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().handle_key(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt_ms = if g.last_time > 0.0 {
                (time - g.last_time) as f32
            } else {
                FRAME_DT_MS
            };
            g.last_time = time;

            g.update(dt_ms);
            g.render();
            g.update_hud();

            if !g.running {
                return;
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Symbiosis (native) starting...");
    log::info!("Native mode runs a headless autoplay - use `trunk serve` for the playable web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(42);
    autoplay::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless match on stage 1 with a fixed planting plan
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use symbiosis::consts::*;
    use symbiosis::persistence::MemoryStore;
    use symbiosis::session::SessionError;
    use symbiosis::sim::{GamePhase, PlacementError, Selection};
    use symbiosis::tuning::PlantKind;
    use symbiosis::{Catalog, PlayerState, Session};

    /// Two hours of battle clock
    const MAX_FRAMES: u32 = 450_000;

    /// (kind, col, row) in planting order; the path runs along row 7
    const PLAN: &[(PlantKind, i32, i32)] = &[
        (PlantKind::Peashooter, 14, 6),
        (PlantKind::Slow, 13, 8),
        (PlantKind::Peashooter, 12, 6),
        (PlantKind::Peashooter, 11, 8),
        (PlantKind::Slow, 10, 6),
        (PlantKind::Peashooter, 9, 8),
        (PlantKind::Peashooter, 8, 6),
        (PlantKind::Peashooter, 7, 8),
        (PlantKind::Slow, 6, 6),
        (PlantKind::Peashooter, 5, 8),
    ];

    pub fn run(seed: u64) {
        let player = PlayerState::load(Box::new(MemoryStore::new()));
        let mut session = Session::new(Catalog::builtin(), player, seed);
        if let Err(e) = session.select_stage(1) {
            log::error!("Could not start stage 1: {}", e);
            return;
        }

        let mut next = 0;
        let mut frames = 0;
        while frames < MAX_FRAMES {
            let phase = match session.game() {
                Some(game) => game.phase,
                None => break,
            };
            if phase.is_over() {
                break;
            }
            if phase == GamePhase::AwaitingWave {
                if let Err(e) = session.start_next_wave() {
                    log::warn!("{}", e);
                }
            }

            if let Some(&(kind, col, row)) = PLAN.get(next) {
                match try_plant(&mut session, kind, col, row) {
                    Ok(()) => next += 1,
                    // Wait for mana or cooldown
                    Err(SessionError::Placement(
                        PlacementError::InsufficientMana { .. } | PlacementError::Cooldown { .. },
                    )) => {}
                    Err(e) => {
                        log::warn!("Skipping {} at ({}, {}): {}", kind.as_str(), col, row, e);
                        next += 1;
                    }
                }
            }

            if let Err(e) = session.tick(FRAME_DT_MS) {
                log::error!("Simulation stopped: {}", e);
                return;
            }
            frames += 1;
        }

        match session.game() {
            Some(game) => log::info!(
                "Stage {} ended {:?} after {:.1}s: wave {}/{}, base health {}, {} plants",
                game.stage.id,
                game.phase,
                game.clock_ms / 1000.0,
                game.wave_index,
                game.total_waves(),
                game.health,
                game.grid.plant_count()
            ),
            None => log::warn!("No match running"),
        }
        log::info!(
            "Gems {}, highest stage {}",
            session.player().gems(),
            session.player().max_stage()
        );
    }

    fn try_plant(
        session: &mut Session,
        kind: PlantKind,
        col: i32,
        row: i32,
    ) -> Result<(), SessionError> {
        session.select_plant(Selection::Plant(kind))?;
        let x = (col as f32 + 0.5) * TILE_SIZE;
        let y = (row as f32 + 0.5) * TILE_SIZE;
        session.place_or_clear(x, y)?;
        Ok(())
    }
}
