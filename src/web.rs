//! Browser host shell.
//!
//! Owns the single [`Session`] in a thread-local, schedules `update()` +
//! `draw()` with `requestAnimationFrame`, forwards keyboard / touch / click
//! input into `jump()`, toggles the overlay screens and persists the theme in
//! local storage. Everything game-related lives in the session; this module
//! only translates between it and the DOM.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlAudioElement, HtmlCanvasElement, Storage, window,
};

use crate::config::GameConfig;
use crate::render::{DrawStyle, Surface};
use crate::session::{HostHooks, Session, SoundCue};
use crate::settings::{ContrastCycle, KeyValueStore, MemoryStore, Theme, ThemeSettings};

const CANVAS_ID: &str = "game-canvas";
const LOADING_ID: &str = "loading-screen";
const THEME_MODAL_ID: &str = "theme-modal";
const GAME_OVER_MODAL_ID: &str = "game-over-modal";
const SCORE_ID: &str = "score";
const FINAL_SCORE_ID: &str = "final-score";
const LOADING_DELAY_MS: i32 = 2000;

// --- Host capabilities --------------------------------------------------------

/// `Surface` over the 2D canvas context.
struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl Surface for CanvasSurface {
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        self.ctx.set_fill_style(&JsValue::from_str(color));
        self.ctx.fill_rect(x, y, w, h);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str) {
        self.ctx.set_fill_style(&JsValue::from_str(color));
        self.ctx.begin_path();
        if self.ctx.arc(cx, cy, r, 0.0, std::f64::consts::TAU).is_ok() {
            self.ctx.fill();
        }
    }
}

/// `HostHooks` writing into the score label and the game-over overlay.
struct DomHooks {
    doc: Document,
}

impl HostHooks for DomHooks {
    fn on_score_changed(&mut self, score: u64) {
        if let Some(el) = self.doc.get_element_by_id(SCORE_ID) {
            el.set_text_content(Some(&format!("Score: {score}")));
        }
    }

    fn on_game_over(&mut self, final_score: u64) {
        if let Some(el) = self.doc.get_element_by_id(FINAL_SCORE_ID) {
            el.set_text_content(Some(&final_score.to_string()));
        }
        set_hidden(&self.doc, GAME_OVER_MODAL_ID, false);
    }

    fn play_sound(&mut self, cue: SoundCue) {
        let id = match cue {
            SoundCue::Jump => "jump-sound",
            SoundCue::Coin => "coin-sound",
        };
        let Some(audio) = self
            .doc
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok())
        else {
            return;
        };
        audio.set_current_time(0.0);
        // Autoplay policies may reject the promise; a silent game is fine.
        let _ = audio.play();
    }
}

/// Local storage when the browser grants it.
struct BrowserStore {
    storage: Storage,
}

impl KeyValueStore for BrowserStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        if self.storage.set_item(key, value).is_err() {
            log::warn!("local storage rejected write of {key:?}");
        }
    }
}

enum Store {
    Browser(BrowserStore),
    Memory(MemoryStore),
}

impl KeyValueStore for Store {
    fn get_item(&self, key: &str) -> Option<String> {
        match self {
            Store::Browser(s) => s.get_item(key),
            Store::Memory(s) => s.get_item(key),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) {
        match self {
            Store::Browser(s) => s.set_item(key, value),
            Store::Memory(s) => s.set_item(key, value),
        }
    }
}

fn open_store() -> Store {
    match window().and_then(|w| w.local_storage().ok().flatten()) {
        Some(storage) => Store::Browser(BrowserStore { storage }),
        None => {
            log::warn!("local storage unavailable; theme will not persist");
            Store::Memory(MemoryStore::default())
        }
    }
}

// --- Application state ----------------------------------------------------------

/// Everything the shell owns for the lifetime of the page.
struct App {
    doc: Document,
    surface: CanvasSurface,
    session: Session<DomHooks>,
    settings: ThemeSettings<Store>,
    theme: Theme,
    contrast: ContrastCycle,
    /// True while a frame callback is scheduled.
    looping: bool,
}

impl App {
    fn style(&self) -> DrawStyle {
        DrawStyle {
            theme: self.theme,
            high_contrast: self.contrast.enabled(),
        }
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Some(root) = self.doc.document_element() {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
        self.session.set_style(self.style());
    }

    fn tick(&mut self) {
        self.session.update();
        if let Some(enabled) = self.contrast.advance(self.session.config().frame_dt) {
            if let Some(root) = self.doc.document_element() {
                let _ = root.set_attribute("data-contrast", if enabled { "true" } else { "false" });
            }
            log::info!("contrast mode {}", if enabled { "on" } else { "off" });
            self.session.set_style(self.style());
        }
        self.session.draw(&mut self.surface);
    }
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|cell| cell.borrow_mut().as_mut().map(f))
}

// --- Entry points -------------------------------------------------------------

/// Boot with default tunables sized to the window.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    boot(None)
}

/// Boot with a partial JSON override of [`GameConfig`]. Canvas size always
/// follows the window.
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let cfg = GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    boot(Some(cfg))
}

#[wasm_bindgen]
pub fn select_theme(name: &str) -> Result<(), JsValue> {
    let theme = Theme::parse(name).ok_or_else(|| JsValue::from_str("unknown theme"))?;
    with_app(|app| {
        app.settings.save(theme);
        app.apply_theme(theme);
        set_hidden(&app.doc, THEME_MODAL_ID, true);
    })
    .ok_or_else(|| JsValue::from_str("game not started"))
}

#[wasm_bindgen]
pub fn restart_game() -> Result<(), JsValue> {
    with_app(|app| {
        set_hidden(&app.doc, GAME_OVER_MODAL_ID, true);
        app.session.restart();
        app.contrast.reset();
        if let Some(root) = app.doc.document_element() {
            let _ = root.set_attribute("data-contrast", "false");
        }
        app.session.set_style(app.style());
    })
    .ok_or_else(|| JsValue::from_str("game not started"))?;
    ensure_loop();
    Ok(())
}

#[wasm_bindgen]
pub fn go_home() -> Result<(), JsValue> {
    with_app(|app| {
        set_hidden(&app.doc, GAME_OVER_MODAL_ID, true);
        set_hidden(&app.doc, THEME_MODAL_ID, false);
    })
    .ok_or_else(|| JsValue::from_str("game not started"))
}

fn boot(config: Option<GameConfig>) -> Result<(), JsValue> {
    if with_app(|_| ()).is_some() {
        return Err(JsValue::from_str("game already started"));
    }
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas: HtmlCanvasElement = doc
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("game canvas not found"))?
        .dyn_into()?;
    let width = win.inner_width()?.as_f64().unwrap_or(800.0);
    let height = win.inner_height()?.as_f64().unwrap_or(600.0);
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()?;

    let mut config = config.unwrap_or_else(|| GameConfig::for_canvas(width, height));
    config.canvas_width = width;
    config.canvas_height = height;
    config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;
    if config.seed.is_none() {
        config.seed = Some(run_seed(&win));
    }
    log::info!("booting {}x{} canvas, seed {:?}", width, height, config.seed);

    let contrast = ContrastCycle::new(config.contrast_period);
    let settings = ThemeSettings::new(open_store());
    let stored_theme = settings.load();

    let mut app = App {
        doc: doc.clone(),
        surface: CanvasSurface { ctx },
        session: Session::new(config, DomHooks { doc: doc.clone() }),
        settings,
        theme: stored_theme.unwrap_or_default(),
        contrast,
        looping: false,
    };
    if let Some(theme) = stored_theme {
        app.apply_theme(theme);
    }
    app.session.set_style(app.style());
    app.session.start();

    APP.with(|cell| *cell.borrow_mut() = Some(app));

    reveal_after_loading(&win, stored_theme.is_some())?;
    install_input(&doc, &canvas)?;
    ensure_loop();
    Ok(())
}

#[cfg(feature = "rng")]
fn run_seed(win: &web_sys::Window) -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            log::warn!("getrandom failed ({e}); falling back to clock seed");
            clock_seed(win)
        }
    }
}

#[cfg(not(feature = "rng"))]
fn run_seed(win: &web_sys::Window) -> u64 {
    clock_seed(win)
}

fn clock_seed(win: &web_sys::Window) -> u64 {
    win.performance().map(|p| p.now().to_bits()).unwrap_or(0)
}

// --- Overlays -------------------------------------------------------------------

fn set_hidden(doc: &Document, id: &str, hidden: bool) {
    let Some(el) = doc.get_element_by_id(id) else {
        log::debug!("overlay #{id} missing");
        return;
    };
    let classes = el.class_list();
    let res = if hidden {
        classes.add_1("hidden")
    } else {
        classes.remove_1("hidden")
    };
    if res.is_err() {
        log::warn!("could not toggle overlay #{id}");
    }
}

/// Hide the loading screen after a fixed delay, then ask for a theme if none
/// was stored.
fn reveal_after_loading(win: &web_sys::Window, has_theme: bool) -> Result<(), JsValue> {
    let closure = Closure::once(move || {
        if let Some(doc) = window().and_then(|w| w.document()) {
            set_hidden(&doc, LOADING_ID, true);
            if !has_theme {
                set_hidden(&doc, THEME_MODAL_ID, false);
            }
        }
    });
    win.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        LOADING_DELAY_MS,
    )?;
    closure.forget();
    Ok(())
}

// --- Input ----------------------------------------------------------------------

fn request_jump() {
    with_app(|app| app.session.jump());
}

fn install_input(doc: &Document, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let code = evt.code();
            if code == "Space" || code == "ArrowUp" {
                evt.prevent_default();
                request_jump();
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::TouchEvent| {
            evt.prevent_default();
            request_jump();
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            request_jump();
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

// --- Frame loop -------------------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

thread_local! {
    // One long-lived frame closure, reused by every restart.
    static FRAME: FrameCallback = Rc::new(RefCell::new(None));
}

/// Start the frame loop unless one is already scheduled. The loop stops by
/// itself once the session leaves `Running`.
fn ensure_loop() {
    let already = with_app(|app| std::mem::replace(&mut app.looping, true)).unwrap_or(true);
    if already {
        return;
    }

    FRAME.with(|f| {
        if f.borrow().is_none() {
            let g = f.clone();
            *f.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
                let keep_going = with_app(|app| {
                    app.tick();
                    app.looping = app.session.is_running();
                    app.looping
                })
                .unwrap_or(false);
                if keep_going {
                    schedule(&g);
                }
            }) as Box<dyn FnMut(f64)>));
        }
        schedule(f);
    });
}

/// Queue the next frame. Any failure clears `looping` so a later
/// `ensure_loop` (e.g. from `restart_game`) can start a fresh loop.
fn schedule(cb: &FrameCallback) {
    if !request_frame(cb) {
        log::error!("requestAnimationFrame failed; frame loop halted");
        with_app(|app| app.looping = false);
    }
}

fn request_frame(cb: &FrameCallback) -> bool {
    let Some(w) = window() else { return false };
    let slot = cb.borrow();
    let Some(closure) = slot.as_ref() else { return false };
    let requested = w.request_animation_frame(closure.as_ref().unchecked_ref());
    requested.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn boot_with_canvas() {
        let doc = window().and_then(|w| w.document()).unwrap();
        if doc.get_element_by_id(CANVAS_ID).is_none() {
            let canvas = doc.create_element("canvas").unwrap();
            canvas.set_id(CANVAS_ID);
            doc.body().unwrap().append_child(&canvas).unwrap();
        }
        if with_app(|_| ()).is_none() {
            start_game().unwrap();
        }
    }

    #[wasm_bindgen_test]
    fn failed_schedule_lets_restart_loop_again() {
        boot_with_canvas();
        assert_eq!(with_app(|app| app.looping), Some(true));

        // Nothing to hand the browser, so the request fails.
        let empty: FrameCallback = Rc::new(RefCell::new(None));
        schedule(&empty);
        assert_eq!(with_app(|app| app.looping), Some(false));

        restart_game().unwrap();
        assert_eq!(with_app(|app| app.looping), Some(true));
        assert_eq!(with_app(|app| app.session.score()), Some(0));
    }
}
