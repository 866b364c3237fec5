#![cfg(target_arch = "wasm32")]

use dragon_jump::{GameConfig, HostHooks, Session, SessionState};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

struct Silent;

impl HostHooks for Silent {
    fn on_score_changed(&mut self, _score: u64) {}
    fn on_game_over(&mut self, _final_score: u64) {}
}

#[wasm_bindgen_test]
fn session_runs_inside_browser() {
    let mut s = Session::new(GameConfig::default(), Silent);
    s.start();
    for _ in 0..10 {
        s.update();
    }
    assert_eq!(s.state(), SessionState::Running);
    assert_eq!(s.score(), 10);
}

#[wasm_bindgen_test]
fn start_game_without_canvas_reports_error() {
    let document = web_sys::window().unwrap().document().unwrap();
    assert!(document.get_element_by_id("game-canvas").is_none());
    assert!(dragon_jump::start_game().is_err());
}
