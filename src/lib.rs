//! Dragon Jump core crate.
//!
//! An endless jumper: the dragon runs along a ground line, obstacles scroll in
//! from the right, a grounded jump clears them. The simulation ([`Session`]) is
//! plain Rust and runs natively under `cargo test`; the browser shell in
//! `web` (wasm32 only) owns the canvas, the input listeners and the overlays.

pub mod config;
pub mod render;
pub mod session;
pub mod settings;

#[cfg(target_arch = "wasm32")]
mod web;

pub use config::{ConfigError, GameConfig, MAX_PARTICLES_PER_BURST};
pub use render::{DrawStyle, Palette, Surface};
pub use session::{Coin, HostHooks, Obstacle, Particle, Player, Rect, Session, SessionState, SoundCue};
pub use settings::{ContrastCycle, KeyValueStore, MemoryStore, Theme, ThemeSettings};

#[cfg(target_arch = "wasm32")]
pub use web::{go_home, restart_game, select_theme, start_game, start_game_with_config};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second init (hot reload) only fails because a logger is already set.
    let _ = console_log::init_with_level(log::Level::Info);
}
