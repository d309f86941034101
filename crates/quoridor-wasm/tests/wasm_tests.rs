#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use quoridor_wasm::QuoridorEngine;

#[wasm_bindgen_test]
fn create_game() {
    let engine = QuoridorEngine::new();
    assert_eq!(engine.turn(), 1);
    assert!(!engine.is_game_over());
    assert_eq!(engine.winner(), None);
    assert_eq!(engine.fence_counts(), vec![10, 10]);
}

#[wasm_bindgen_test]
fn legal_moves_returns_array() {
    let engine = QuoridorEngine::new();
    let moves = engine.legal_moves().unwrap();
    assert!(js_sys::Array::is_array(&moves));
    let arr = js_sys::Array::from(&moves);
    assert_eq!(arr.length(), 131);
}

#[wasm_bindgen_test]
fn make_move_and_undo() {
    let mut engine = QuoridorEngine::new();
    let original = engine.encode_state();

    let moves = engine.legal_moves().unwrap();
    let arr = js_sys::Array::from(&moves);
    let first = arr.get(0);
    let notation: String = js_sys::Reflect::get(&first, &"notation".into())
        .unwrap()
        .as_string()
        .unwrap();

    engine.make_move(&notation).unwrap();
    assert_ne!(engine.encode_state(), original);
    assert_eq!(engine.turn(), 2);

    assert!(engine.undo());
    assert_eq!(engine.encode_state(), original);
    assert_eq!(engine.turn(), 1);
}

#[wasm_bindgen_test]
fn undo_on_empty_history_returns_false() {
    let mut engine = QuoridorEngine::new();
    assert!(!engine.undo());
}

#[wasm_bindgen_test]
fn illegal_move_errors() {
    let mut engine = QuoridorEngine::new();
    assert!(engine.make_move("not_a_move").is_err());
    assert!(engine.make_move("3e").is_err());
}

#[wasm_bindgen_test]
fn load_state_rejects_garbage() {
    assert!(QuoridorEngine::load_state(&[0u8; 4]).is_err());
    let engine = QuoridorEngine::new();
    assert!(QuoridorEngine::load_state(&engine.encode_state()).is_ok());
}

#[wasm_bindgen_test]
fn evaluate_returns_object() {
    let engine = QuoridorEngine::new();
    let value = engine.evaluate().unwrap();
    let score = js_sys::Reflect::get(&value, &"score".into()).unwrap();
    assert_eq!(score.as_f64(), Some(1.0));
}

#[wasm_bindgen_test]
fn best_move_returns_notation() {
    let mut engine = QuoridorEngine::new();
    engine.set_tt_size(1);
    let notation = engine.best_move(2).unwrap();
    assert!(!notation.is_empty());
    assert!(engine.best_move(0).is_err());
}
