//! Flappy Daily entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlInputElement, HtmlSelectElement, KeyboardEvent, MouseEvent};

    use flappy_daily::consts::*;
    use flappy_daily::persistence::LocalStore;
    use flappy_daily::platform::SystemClock;
    use flappy_daily::skins::RECONCILE_PERIOD_SECS;

    // Drawing is done by the page; we hand it one JSON frame per display frame
    #[wasm_bindgen(inline_js = "
        export function present(frame) {
            if (typeof window.flappyRender === 'function') {
                window.flappyRender(JSON.parse(frame));
            }
        }
    ")]
    extern "C" {
        fn present(frame: &str);
    }

    type Game = flappy_daily::Game<LocalStore, SystemClock>;

    /// Browser shell around the core game
    struct App {
        game: Game,
        accumulator: f32,
        last_time: f64,
    }

    impl App {
        fn new(seed: u64) -> Self {
            Self {
                game: Game::new(LocalStore, SystemClock, seed),
                accumulator: 0.0,
                last_time: 0.0,
            }
        }

        /// Run simulation frames for the elapsed wall time
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.game.frame();
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
            // Drop backlog we could not catch up on
            if substeps == MAX_SUBSTEPS {
                self.accumulator = self.accumulator.min(SIM_DT);
            }
        }

        fn render(&self) {
            match serde_json::to_string(&self.game.snapshot()) {
                Ok(frame) => present(&frame),
                Err(e) => log::warn!("Failed to encode frame: {e}"),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let state = self.game.state();

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&state.score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-coins .hud-value").ok().flatten() {
                el.set_text_content(Some(&state.coins.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-best .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.game.profile().best_score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-streak .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.game.challenges().streak().to_string()));
            }

            if let Some(el) = document.get_element_by_id("game-over") {
                let class = if state.phase == flappy_daily::sim::RunPhase::Ended {
                    ""
                } else {
                    "hidden"
                };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Flappy Daily starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        sync_controls(&app.borrow().game);
        setup_input_handlers(app.clone());
        setup_restart_button(app.clone());
        setup_difficulty_controls(app.clone());
        setup_claim_buttons(app.clone());
        setup_unlock_reconciler(app.clone());

        request_animation_frame(app);

        log::info!("Flappy Daily running!");
    }

    /// Reflect persisted settings in the settings panel
    fn sync_controls(game: &Game) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(select) = document
            .get_element_by_id("difficulty-select")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        {
            select.set_value(game.difficulty().preset().as_str());
        }
        if let Some(toggle) = document
            .get_element_by_id("adaptive-toggle")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            toggle.set_checked(game.difficulty().adaptive_enabled());
        }
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    " " | "ArrowUp" => {
                        event.prevent_default();
                        a.game.jump();
                    }
                    "Enter" | "r" | "R" => a.game.restart(),
                    "t" | "T" => {
                        let theme = a.game.cycle_theme();
                        log::info!("Theme: {}", theme.as_str());
                    }
                    "1" => a.game.select_difficulty("easy"),
                    "2" => a.game.select_difficulty("normal"),
                    "3" => a.game.select_difficulty("hard"),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse / tap on the playfield
        if let Some(canvas) = window
            .document()
            .and_then(|d| d.get_element_by_id("canvas"))
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().game.jump();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            // Calculate delta time
            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render();
            a.update_hud();
        }

        request_animation_frame(app);
    }

    fn setup_restart_button(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().game.restart();
                log::info!("Restart requested");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_difficulty_controls(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(select) = document
            .get_element_by_id("difficulty-select")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        {
            let app = app.clone();
            let select_clone = select.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().game.select_difficulty(&select_clone.value());
            });
            let _ = select
                .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(toggle) = document
            .get_element_by_id("adaptive-toggle")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            let toggle_clone = toggle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().game.set_adaptive(toggle_clone.checked());
            });
            let _ = toggle
                .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Claim buttons carry the challenge id in `data-challenge-id`
    fn setup_claim_buttons(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(panel) = document.get_element_by_id("challenge-list") else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(id) = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .and_then(|el| el.get_attribute("data-challenge-id"))
            else {
                return;
            };
            let payout = app.borrow_mut().game.claim_challenge(&id);
            if payout == 0 {
                log::info!("Nothing to claim for {id}");
            }
        });
        let _ = panel.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Background unlock pass, independent of the frame loop
    fn setup_unlock_reconciler(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            // Skip if the frame loop holds the borrow; the next pass catches up
            if let Ok(mut a) = app.try_borrow_mut() {
                a.game.reconcile_unlocks();
            }
        });
        let period_ms = (RECONCILE_PERIOD_SECS * 1000.0) as i32;
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            period_ms,
        );
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Flappy Daily (native) starting...");
    log::info!("Native mode runs a headless autopilot - build for wasm32 to play");

    autopilot::run(std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(7));
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use flappy_daily::consts::*;
    use flappy_daily::sim::{GameState, RunPhase};
    use flappy_daily::{Game, MemoryStore, SystemClock};

    /// Longest run we simulate (ten minutes of play)
    const MAX_FRAMES: u32 = FRAME_RATE * 600;

    /// Flap when the bird sinks below the middle of the next gap
    fn should_jump(state: &GameState) -> bool {
        let bird = &state.bird;
        let target = state
            .pipes
            .iter()
            .find(|p| p.right() >= bird.left())
            .map(|p| p.top_height + p.gap * 0.5 + p.gap * 0.15)
            .unwrap_or(PLAYFIELD_HEIGHT * 0.5);
        bird.bottom() > target && bird.vel >= 0.0
    }

    pub fn run(runs: u32) {
        let seed = 0x5eed_u64 ^ runs as u64;
        let mut game = Game::new(MemoryStore::new(), SystemClock, seed);

        for _ in 0..runs {
            game.restart();
            let mut frames = 0;
            while frames < MAX_FRAMES {
                if should_jump(game.state()) {
                    game.jump();
                }
                game.frame();
                frames += 1;
                game.advance_timers(SIM_DT);
                if game.state().phase == RunPhase::Ended {
                    break;
                }
            }
            let state = game.state();
            println!(
                "run: score {:>3}  coins {:>3}  {:>3}s  speed {:.2}  gap {:.0}",
                state.score,
                state.coins,
                state.elapsed_seconds(),
                game.difficulty().current_speed(),
                game.difficulty().current_gap()
            );
        }

        println!("\nDaily challenges (streak {}):", game.challenges().streak());
        for challenge in game.challenges().challenges() {
            println!(
                "  {} {:<28} {:>3}/{:<3} {:<6} {}",
                challenge.template().icon,
                challenge.description(),
                challenge.progress,
                challenge.target,
                challenge.tier.as_str(),
                if challenge.completed { "done" } else { "" }
            );
        }

        let profile = game.profile();
        println!(
            "\nBest {} over {} runs, {} coins banked",
            profile.best_score, profile.runs_played, profile.banked_coins
        );
        let skins: Vec<&str> = game.skins().unlocked().map(|s| s.as_str()).collect();
        println!("Skins: {}", skins.join(", "));
    }
}
