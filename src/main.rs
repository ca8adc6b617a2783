//! Ball Dodge entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, TouchEvent};

    use ball_dodge::audio::AudioManager;
    use ball_dodge::platform::DomView;
    use ball_dodge::sim::{Direction, Game, GameEvent, InputEvent, Screen};
    use ball_dodge::tuning::Tuning;

    /// Longest frame we simulate; longer gaps (tab switches) are dropped
    const MAX_FRAME_MS: f64 = 100.0;

    /// Game instance plus everything it drives on the page
    struct App {
        game: Game,
        view: DomView,
        audio: AudioManager,
        muted: bool,
        accumulator: f64,
        last_time: f64,
    }

    impl App {
        /// Re-measure the page so the simulation matches the layout
        fn measure(&mut self) {
            let (w, h, player_w) = self.view.measure();
            if w > 0.0 && h > 0.0 && player_w > 0.0 {
                self.game.resize(w, h, player_w);
            } else {
                log::warn!("Play area not laid out yet ({}x{}), keeping previous size", w, h);
            }
        }

        fn start(&mut self) {
            // Measure after the play area becomes visible
            self.view.show_screen(Screen::Play);
            self.measure();
            self.game.start();
            self.apply_events();
        }

        fn restart(&mut self) {
            self.game.reset();
            self.apply_events();
            self.measure();
            self.game.start();
            self.apply_events();
            log::info!("Game restarted ({} ball elements left)", self.view.ball_elements());
        }

        fn toggle_mute(&mut self) {
            self.muted = !self.muted;
            self.audio.set_muted(self.muted);
            log::info!("Muted: {}", self.muted);
        }

        /// Apply simulation side effects to the page and speakers
        fn apply_events(&mut self) {
            for event in self.game.drain_events() {
                match event {
                    GameEvent::ScreenChanged(screen) => self.view.show_screen(screen),
                    GameEvent::MusicStarted => self.audio.start_music(),
                    GameEvent::MusicPaused => self.audio.pause_music(),
                    GameEvent::Sound(effect) => self.audio.play(effect),
                    GameEvent::Collision { id } => log::info!("Ball {} hit the player", id),
                    GameEvent::BallSpawned { .. }
                    | GameEvent::BallPassed { .. }
                    | GameEvent::SpawnIntervalChanged(_) => {}
                }
            }
            let ball_size = self.game.tuning().ball_size;
            if let Err(e) = self.view.render(self.game.state(), ball_size) {
                log::warn!("Render error: {:?}", e);
            }
        }

        /// Advance virtual time by whole milliseconds
        fn update(&mut self, dt_ms: f64) {
            self.accumulator += dt_ms.clamp(0.0, MAX_FRAME_MS);
            let whole = self.accumulator.floor();
            self.accumulator -= whole;
            self.game.advance(whole as u64);
            self.apply_events();
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Ball Dodge starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let tuning = Tuning::load();
        let audio = AudioManager::new(tuning.music_volume);
        let view = DomView::new(document)?;
        view.show_screen(Screen::Intro);

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App {
            game: Game::new(tuning, seed),
            view,
            audio,
            muted: false,
            accumulator: 0.0,
            last_time: 0.0,
        }));

        log::info!("Game initialized with seed: {}", seed);

        setup_buttons(app.clone())?;
        setup_input_handlers(app.clone())?;

        request_animation_frame(app);

        log::info!("Ball Dodge running!");
        Ok(())
    }

    fn on_click(id: &str, handler: impl FnMut(web_sys::MouseEvent) + 'static) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("No #{} button on the page", id);
            return Ok(());
        };
        let closure = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(handler);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_buttons(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        {
            let app = app.clone();
            on_click("startButton", move |_| app.borrow_mut().start())?;
        }
        on_click("restartButton", move |_| app.borrow_mut().restart())
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;

        // Key down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                let key = event.key();
                if key == "m" || key == "M" {
                    a.toggle_mute();
                }
                a.game.handle_input(InputEvent::KeyDown(Direction::from_key(&key)));
            });
            document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key up
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: KeyboardEvent| {
                app.borrow_mut().game.handle_input(InputEvent::KeyUp);
            });
            document.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch start - left or right half of the viewport
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let viewport_width = web_sys::window()
                    .and_then(|w| w.inner_width().ok())
                    .and_then(|w| w.as_f64())
                    .unwrap_or(0.0) as f32;
                app.borrow_mut().game.handle_input(InputEvent::TouchStart {
                    x: touch.client_x() as f32,
                    viewport_width,
                });
            });
            document
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch end
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                app.borrow_mut().game.handle_input(InputEvent::TouchEnd);
            });
            document.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
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
            let dt = if a.last_time > 0.0 { time - a.last_time } else { 0.0 };
            a.last_time = time;
            a.update(dt);
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Ball Dodge failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ball Dodge (native) starting...");
    log::info!("The browser version runs with `trunk serve`; running a headless demo instead");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: a simple bot sidesteps whatever ball is above it
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use ball_dodge::sim::{Direction, Game, GamePhase, GameState, InputEvent};
    use ball_dodge::tuning::Tuning;

    const STEP_MS: u64 = 20;
    const TIME_LIMIT_MS: u64 = 120_000;

    /// Which way to dodge the lowest ball overlapping the player
    fn dodge_direction(state: &GameState, ball_size: f32) -> Option<Direction> {
        let player = state.player.span();
        let threat = state
            .balls
            .iter()
            .filter(|b| b.span(ball_size).overlaps(&player))
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))?;

        let ball_center = threat.pos.x + ball_size / 2.0;
        let player_center = state.player.x + state.player.width / 2.0;
        let max_x = state.player_max_x();

        let away = if player_center < ball_center {
            Direction::Left
        } else {
            Direction::Right
        };
        // Pinned against a wall: squeeze past the other way
        match away {
            Direction::Left if state.player.x <= 0.0 => Some(Direction::Right),
            Direction::Right if state.player.x >= max_x => Some(Direction::Left),
            _ => Some(away),
        }
    }

    pub fn run(seed: u64) {
        let tuning = Tuning::load();
        let ball_size = tuning.ball_size;
        let mut game = Game::new(tuning, seed);
        game.start();

        let mut held = None;
        while game.state().phase == GamePhase::Playing && game.elapsed_ms() < TIME_LIMIT_MS {
            let want = dodge_direction(game.state(), ball_size);
            if want != held {
                game.handle_input(match want {
                    Some(direction) => InputEvent::KeyDown(Some(direction)),
                    None => InputEvent::KeyUp,
                });
                held = want;
            }
            game.advance(STEP_MS);
            game.drain_events();
        }

        let state = game.state();
        log::info!(
            "Seed {}: {} after {:.1}s",
            seed,
            state.score_text(),
            game.elapsed_ms() as f64 / 1000.0
        );
        println!(
            "seed={} score={} survived_ms={} phase={:?}",
            seed,
            state.score,
            game.elapsed_ms(),
            state.phase
        );
        match game.snapshot_json() {
            Ok(json) => log::debug!("Final state: {}", json),
            Err(e) => log::warn!("Could not serialize final state: {}", e),
        }
    }
}
