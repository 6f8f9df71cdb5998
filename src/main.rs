//! Dash Runner entry point
//!
//! On the web: loads the level, wires DOM input and runs the frame loop.
//! Natively: replays a level headlessly with a scripted jump cadence.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use dash_runner::platform::JumpInput;
    use dash_runner::renderer::{CanvasPainter, SceneOptions, build_scene};
    use dash_runner::{AttemptController, FrameReport, LevelData, Settings};

    /// Nominal frame length, used for the very first frame
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Longest wall-clock gap fed to the respawn timer in one frame
    const MAX_FRAME_GAP_MS: f64 = 250.0;

    /// Runtime instance holding all state
    struct Game {
        controller: AttemptController,
        input: JumpInput,
        painter: Option<CanvasPainter>,
        settings: Settings,
        last_time: f64,
        last_report: Option<FrameReport>,
        /// False once the player exits; the frame loop stops re-arming
        running: bool,
    }

    impl Game {
        fn new(level: &LevelData, settings: Settings) -> Self {
            let controller = AttemptController::with_effects(level.course(), settings.effects());
            Self {
                controller,
                input: JumpInput::new(),
                painter: None,
                settings,
                last_time: 0.0,
                last_report: None,
                running: true,
            }
        }

        /// Run one simulation frame
        fn update(&mut self, time: f64) {
            let elapsed = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, MAX_FRAME_GAP_MS)
            } else {
                FRAME_MS
            };
            self.last_time = time;

            let report = self.controller.frame(&self.input.tick_input(), elapsed);
            // The edge is single-frame no matter who looked at it
            self.input.end_frame();
            self.last_report = Some(report);
        }

        /// Render the current frame
        fn render(&self) {
            let Some(painter) = &self.painter else {
                return;
            };
            let options = SceneOptions {
                grid_lines: self.settings.quality.grid_lines(),
            };
            let cmds = build_scene(self.controller.avatar(), self.controller.course(), options);
            if let Err(e) = painter.paint(&cmds) {
                log::warn!("Render error: {:?}", e);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(report) = self.last_report else {
                return;
            };
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-attempt .hud-value").ok().flatten() {
                el.set_text_content(Some(&report.attempt.to_string()));
            }
            set_hidden(&document, "hud-attempt", !self.settings.show_attempts || report.won);

            if let Some(el) = document.query_selector("#hud-progress .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{}%", report.progress)));
            }
            if let Some(el) = document.get_element_by_id("progress-fill") {
                let _ = el.set_attribute("style", &format!("width: {}%", report.progress));
            }
            set_hidden(&document, "hud-progress", !self.settings.show_progress);

            set_hidden(&document, "death-flash", !report.dead);
            set_hidden(&document, "win-overlay", !report.won);
        }

        fn retry(&mut self) {
            self.input.release_all();
            self.controller.retry();
        }

        fn exit(&mut self) {
            self.input.release_all();
            self.controller.stop();
            self.running = false;
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    /// Presses that land on UI buttons never reach the jump signal
    fn from_button(event: &Event) -> bool {
        event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            .and_then(|el| el.closest("button").ok().flatten())
            .is_some()
    }

    /// Level document embedded in the page, or the demo level
    fn load_level(document: &Document) -> LevelData {
        let Some(json) = document
            .get_element_by_id("level-data")
            .and_then(|el| el.text_content())
            .filter(|s| !s.trim().is_empty())
        else {
            log::info!("No embedded level, loading demo");
            return LevelData::demo();
        };
        match LevelData::from_json(&json) {
            Ok(level) => level,
            Err(e) => {
                log::warn!("Embedded level rejected ({}), loading demo", e);
                LevelData::demo()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Dash Runner starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        set_hidden(&document, "loading", true);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let level = load_level(&document);
        log::info!(
            "Level '{}' ({}) by {}: {} objects",
            level.metadata.name,
            level.metadata.difficulty.as_str(),
            level.metadata.author,
            level.objects.len()
        );
        if let Some(el) = document.get_element_by_id("level-name") {
            el.set_text_content(Some(&level.metadata.name));
        }

        let game = Rc::new(RefCell::new(Game::new(&level, Settings::load())));

        match CanvasPainter::new(&canvas) {
            Ok(painter) => game.borrow_mut().painter = Some(painter),
            Err(e) => log::error!("Canvas 2D unavailable: {:?}", e),
        }

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_auto_release(game.clone());

        set_hidden(&document, "hud", false);

        // Start frame loop
        request_animation_frame(game);

        log::info!("Dash Runner running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.key_down(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.code());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() == 0 && !from_button(&event) {
                    game.borrow_mut().input.pointer_down();
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.pointer_up();
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if from_button(&event) {
                    return;
                }
                event.prevent_default();
                game.borrow_mut().input.touch_start();
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        for name in ["touchend", "touchcancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().input.touch_end();
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
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
            if !g.running {
                return;
            }

            g.update(time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        for id in ["retry-btn", "win-retry-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    game.borrow_mut().retry();
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        for id in ["exit-btn", "win-exit-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    game.borrow_mut().exit();
                    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                        set_hidden(&document, "hud", true);
                        set_hidden(&document, "win-overlay", true);
                        set_hidden(&document, "exited", false);
                    }
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    /// Drop held input when the page loses focus so no jump sticks down
    fn setup_auto_release(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().input.release_all();
                    log::debug!("Input released (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().input.release_all();
                log::debug!("Input released (window blur)");
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use dash_runner::generate::{generation_prompt, parse_section};
    use dash_runner::platform::JumpInput;
    use dash_runner::sim::ObjectKind;
    use dash_runner::{AttemptController, Difficulty, LevelData, QualityPreset, Settings};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    #[derive(Parser, Debug)]
    #[command(
        author,
        version,
        about = "Replay a level headlessly with a scripted jump cadence",
        long_about = None
    )]
    struct Args {
        /// Level document (JSON); the built-in demo level when omitted
        level: Option<PathBuf>,
        /// Frames to simulate before giving up
        #[arg(long, default_value_t = 3600)]
        frames: u32,
        /// Press jump every N frames (0 = never)
        #[arg(long, default_value_t = 0)]
        jump_every: u32,
        /// Frames each scripted press is held
        #[arg(long, default_value_t = 1)]
        hold: u32,
        /// Quality preset for death effects (low, medium, high)
        #[arg(long, default_value = "medium")]
        quality: String,
        /// Generated section (`[{type, x, y}]`) to merge before playing
        #[arg(long)]
        merge: Option<PathBuf>,
        /// Write the (possibly merged) level document here
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the generation request for the next section and exit
        #[arg(long)]
        prompt: Option<String>,
        /// Rename the level before writing it
        #[arg(long)]
        name: Option<String>,
        /// Difficulty rating stored in the written document
        #[arg(long)]
        difficulty: Option<String>,
        /// List every placeable object kind and exit
        #[arg(long)]
        palette: bool,
    }

    /// One line per placeable kind: wire name and palette label
    fn palette_lines() -> Vec<String> {
        ObjectKind::ALL
            .iter()
            .map(|kind| format!("{:<20} {}", kind.as_str(), kind.label()))
            .collect()
    }

    /// Whether the scripted jump is down on `frame`
    fn scripted_hold(frame: u32, every: u32, hold: u32) -> bool {
        every > 0 && frame % every < hold.max(1)
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();

        if args.palette {
            for line in palette_lines() {
                println!("{line}");
            }
            return Ok(());
        }

        let mut level = match &args.level {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("read level {:?}", path))?;
                LevelData::from_json(&json).with_context(|| format!("parse level {:?}", path))?
            }
            None => LevelData::demo(),
        };

        if let Some(text) = &args.prompt {
            println!("{}", generation_prompt(text, level.next_batch_x()));
            return Ok(());
        }

        if let Some(path) = &args.merge {
            let json = fs::read_to_string(path)
                .with_context(|| format!("read section {:?}", path))?;
            let batch = parse_section(&json).context("parse generated section")?;
            level
                .merge_generated(&mut rand::rng(), &batch)
                .context("merge generated section")?;
        }

        if let Some(name) = &args.name {
            level.metadata.name = name.clone();
        }
        if let Some(text) = &args.difficulty {
            level.metadata.difficulty = Difficulty::from_str(text)
                .with_context(|| format!("unknown difficulty '{}'", text))?;
        }

        if let Some(path) = &args.out {
            let target = if path.is_dir() {
                path.join(level.export_file_name())
            } else {
                path.clone()
            };
            fs::write(&target, level.to_json()?)
                .with_context(|| format!("write level {:?}", target))?;
            log::info!("Level written to {:?}", target);
        }

        let quality = QualityPreset::from_str(&args.quality)
            .with_context(|| format!("unknown quality preset '{}'", args.quality))?;
        let settings = Settings::from_preset(quality);

        log::info!(
            "Replaying '{}' ({} objects) for {} frames",
            level.metadata.name,
            level.objects.len(),
            args.frames
        );

        let mut controller = AttemptController::with_effects(level.course(), settings.effects());
        let mut input = JumpInput::new();
        let mut deaths = 0u32;
        let mut best = 0u8;
        let mut was_dead = false;
        let mut won = false;

        for frame in 0..args.frames {
            if scripted_hold(frame, args.jump_every, args.hold) {
                if !input.is_held() {
                    input.pointer_down();
                }
            } else {
                input.pointer_up();
            }

            let report = controller.frame(&input.tick_input(), FRAME_MS);
            input.end_frame();

            best = best.max(report.progress);
            if report.dead && !was_dead {
                deaths += 1;
            }
            was_dead = report.dead;
            if report.won {
                won = true;
                break;
            }
        }
        controller.stop();

        println!(
            "{}: {} after {} attempt(s), {} death(s), best progress {}%",
            level.metadata.name,
            if won { "complete" } else { "not complete" },
            controller.attempt(),
            deaths,
            best
        );
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_scripted_hold() {
            assert!(!scripted_hold(0, 0, 1));
            assert!(scripted_hold(0, 10, 1));
            assert!(!scripted_hold(1, 10, 1));
            assert!(scripted_hold(12, 10, 3));
            assert!(!scripted_hold(13, 10, 3));
        }

        #[test]
        fn test_palette_lists_every_kind() {
            let lines = palette_lines();
            assert_eq!(lines.len(), ObjectKind::ALL.len());
            assert!(
                lines
                    .iter()
                    .any(|l| l.starts_with("GRAVITY_UP_PORTAL") && l.ends_with("Flip Grav"))
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
