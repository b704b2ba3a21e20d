//! Rain Bucket entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use glam::Vec2;
    use rain_bucket::assets::Assets;
    use rain_bucket::audio::{AudioManager, SoundEffect};
    use rain_bucket::consts::*;
    use rain_bucket::Settings;
    use rain_bucket::renderer::SpriteRenderState;
    use rain_bucket::sim::{GameEvent, GameState, TickInput, tick};

    /// Game instance holding all state for one session
    struct Game {
        state: GameState,
        render_state: Option<SpriteRenderState>,
        audio: AudioManager,
        settings: Settings,
        last_time: f64,
        /// Pointer state sampled by DOM handlers, in world coordinates
        pointer_down: bool,
        pointer_pos: Vec2,
        /// Screen height in CSS pixels, for flipping the pointer y axis
        screen: Vec2,
        /// Mute chosen by the player, distinct from blur auto-mute
        user_muted: bool,
        music_started: bool,
    }

    impl Game {
        fn new(screen: Vec2, bucket_size: Vec2, droplet_size: Vec2, seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_volumes(
                settings.master_volume,
                settings.sfx_volume,
                settings.music_volume,
            );
            let muted = settings.muted;
            audio.set_muted(muted);
            Self {
                state: GameState::new(screen, bucket_size, droplet_size, seed),
                render_state: None,
                audio,
                settings,
                last_time: 0.0,
                pointer_down: false,
                pointer_pos: Vec2::ZERO,
                screen,
                user_muted: muted,
                music_started: false,
            }
        }

        /// Convert canvas-relative CSS pixels (y-down) to world coords (y-up)
        fn pointer_to_world(&self, x: f32, y: f32) -> Vec2 {
            Vec2::new(x, self.screen.y - y)
        }

        /// Music may only start after a user gesture; call from input handlers
        fn ensure_audio_started(&mut self) {
            self.audio.resume();
            if !self.music_started {
                self.audio.start_music();
                self.music_started = true;
            }
        }

        fn toggle_mute(&mut self) {
            self.user_muted = !self.user_muted;
            self.audio.set_muted(self.user_muted);
            self.settings.muted = self.user_muted;
            self.settings.save();
            log::info!("muted: {}", self.user_muted);
        }

        /// Advance the simulation and fire queued sound effects
        fn update(&mut self, dt: f32) {
            let input = TickInput {
                pointer: self.pointer_down.then_some(self.pointer_pos),
            };
            tick(&mut self.state, &input, dt);

            for event in self.state.take_events() {
                match event {
                    GameEvent::DropletCaught => self.audio.play(SoundEffect::DropletCaught),
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Teardown: stop the rain loop. GPU and audio resources are released
        /// when the session drops; calling this early is harmless.
        fn dispose(&mut self) {
            self.audio.stop_music();
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Rain Bucket starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Physical canvas size follows the device pixel ratio; game world
        // coordinates stay in CSS pixels
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let screen = Vec2::new(client_w as f32, client_h as f32);
        log::info!("screen {}x{} (dpr {})", screen.x, screen.y, dpr);

        // Missing or corrupt sprites are a fatal startup error
        let assets = Assets::load().expect("Failed to load sprite assets");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(
            screen,
            assets.bucket.size(),
            assets.droplet.size(),
            seed,
        )));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state =
            SpriteRenderState::new(surface, &adapter, width, height, screen, &assets).await;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());
        setup_auto_mute(game.clone());

        request_animation_frame(game);

        log::info!("Rain Bucket running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse down - grab the bucket and unlock audio
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.ensure_audio_started();
                g.pointer_down = true;
                g.pointer_pos = g.pointer_to_world(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - only tracked while pressed, like a touch drag
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.pointer_down {
                    g.pointer_pos =
                        g.pointer_to_world(event.offset_x() as f32, event.offset_y() as f32);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up - release
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().pointer_down = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    g.ensure_audio_started();
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    g.pointer_down = true;
                    g.pointer_pos = g.pointer_to_world(x, y);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    g.pointer_pos = g.pointer_to_world(x, y);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().pointer_down = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard - mute toggle
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if matches!(event.key().as_str(), "m" | "M") {
                    game.borrow_mut().toggle_mute();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_mute(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Tab hidden/shown
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if !g.settings.mute_on_blur {
                    return;
                }
                let hidden =
                    document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                g.audio.set_muted(hidden || g.user_muted);
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur/focus
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let user_muted = g.user_muted;
                g.audio.set_muted(user_muted);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page teardown - stop the rain loop
        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().dispose();
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                (((time - g.last_time) / 1000.0) as f32).min(MAX_FRAME_DT)
            } else {
                0.0
            };
            g.last_time = time;

            // Draw the previous tick's state first, then advance
            g.render();
            g.update(dt);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use rain_bucket::assets::Assets;
    use rain_bucket::sim::{GameEvent, GameState, TickInput, tick};

    env_logger::init();
    log::info!("Rain Bucket (native) starting...");
    log::info!("Native windowing is not wired up - run the web build for the real game");

    // Headless demo: a few seconds of simulated rain with the bucket parked
    // under the spawn column average
    let assets = Assets::load().expect("Failed to load sprite assets");
    let screen = Vec2::new(480.0, 320.0);
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut state = GameState::new(screen, assets.bucket.size(), assets.droplet.size(), seed);
    let input = TickInput {
        pointer: Some(Vec2::new(240.0, 50.0)),
    };

    let mut caught = 0usize;
    for _ in 0..600 {
        tick(&mut state, &input, 1.0 / 60.0);
        caught += state
            .take_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::DropletCaught))
            .count();
    }

    log::info!(
        "10 s headless run (seed {}): {} caught, {} still falling",
        seed,
        caught,
        state.droplets.len()
    );
    println!("caught {caught} droplets");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
