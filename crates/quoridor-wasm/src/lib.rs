use wasm_bindgen::prelude::*;

use quoridor_core::{
    codec::{decode_position, encode_position},
    eval::Evaluator,
    notation::{move_to_notation, parse_notation},
    position::Position,
    search::SearchLimits,
    types::{FenceOrientation, Move, Player},
};
use quoridor_engine::{
    format_score, win_in_n, AlphaBetaConfig, AlphaBetaSearcher, ClassicalEval,
};
use serde::Serialize;

/// Initialize panic hook for readable error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Serializable move representation for JS consumers.
#[derive(Serialize)]
struct JsMove {
    notation: String,
    kind: &'static str,
    row: u8,
    col: u8,
}

impl JsMove {
    fn from_move(mv: &Move) -> Self {
        let (kind, row, col) = match *mv {
            Move::Pawn { to, .. } => ("pawn", to.row, to.col),
            Move::Fence { orientation, slot } => {
                let kind = match orientation {
                    FenceOrientation::Vertical => "vertical",
                    FenceOrientation::Horizontal => "horizontal",
                };
                (kind, slot.row, slot.col)
            }
        };
        Self {
            notation: move_to_notation(mv),
            kind,
            row,
            col,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsEvaluation {
    score: i32,
    score_display: String,
    win_in: Option<i32>,
}

/// Main WASM-exported Quoridor engine.
#[wasm_bindgen]
pub struct QuoridorEngine {
    position: Position,
    history: Vec<Move>,
    searcher: AlphaBetaSearcher,
    evaluator: ClassicalEval,
}

#[wasm_bindgen]
impl QuoridorEngine {
    /// New game from the standard start position.
    #[wasm_bindgen(constructor)]
    pub fn new() -> QuoridorEngine {
        Self::from_position(Position::new())
    }

    /// Restore a game from the 23-byte state encoding. History starts empty.
    #[wasm_bindgen(js_name = "loadState")]
    pub fn load_state(bytes: &[u8]) -> Result<QuoridorEngine, JsError> {
        let position = decode_position(bytes).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self::from_position(position))
    }

    #[wasm_bindgen(js_name = "encodeState")]
    pub fn encode_state(&self) -> Vec<u8> {
        encode_position(&self.position).to_vec()
    }

    /// All legal moves as a JSON array of `{ notation, kind, row, col }`.
    #[wasm_bindgen(js_name = "legalMoves")]
    pub fn legal_moves(&self) -> Result<JsValue, JsError> {
        let moves: Vec<JsMove> = self
            .position
            .legal_moves()
            .iter()
            .map(JsMove::from_move)
            .collect();
        serde_wasm_bindgen::to_value(&moves).map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen(js_name = "makeMove")]
    pub fn make_move(&mut self, notation: &str) -> Result<(), JsError> {
        if self.position.is_terminal() {
            return Err(JsError::new("game is over"));
        }
        let mv = parse_notation(&self.position, notation).map_err(|e| JsError::new(&e.to_string()))?;
        self.position = self
            .position
            .apply(&mv)
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.history.push(mv);
        Ok(())
    }

    /// Undo the last move. Returns true if successful.
    pub fn undo(&mut self) -> bool {
        let Some(mv) = self.history.pop() else {
            return false;
        };
        match self.position.unapply(&mv) {
            Ok(previous) => {
                self.position = previous;
                true
            }
            Err(_) => {
                self.history.push(mv);
                false
            }
        }
    }

    /// Notation of every move played since the game was created or loaded.
    #[wasm_bindgen(js_name = "moveHistory")]
    pub fn move_history(&self) -> Vec<String> {
        self.history.iter().map(move_to_notation).collect()
    }

    #[wasm_bindgen(js_name = "isGameOver")]
    pub fn is_game_over(&self) -> bool {
        self.position.is_terminal()
    }

    /// 1 or 2 once a pawn has reached its goal row.
    pub fn winner(&self) -> Option<u8> {
        self.position.winner().map(Player::to_code)
    }

    /// 1 or 2 for the side to move.
    pub fn turn(&self) -> u8 {
        self.position.side_to_move.to_code()
    }

    /// Fences left as `[player_one, player_two]`.
    #[wasm_bindgen(js_name = "fenceCounts")]
    pub fn fence_counts(&self) -> Vec<u8> {
        vec![
            self.position.fences_left(Player::One),
            self.position.fences_left(Player::Two),
        ]
    }

    /// Search at the given depth and return the chosen move's notation
    /// without playing it.
    #[wasm_bindgen(js_name = "bestMove")]
    pub fn best_move(&mut self, depth: u8) -> Result<String, JsError> {
        self.searcher
            .best_move(&self.position, SearchLimits::depth(depth))
            .map(|mv| move_to_notation(&mv))
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Static evaluation for the side to move: `{ score, scoreDisplay, winIn }`.
    pub fn evaluate(&self) -> Result<JsValue, JsError> {
        let score = self.evaluator.evaluate(&self.position).0;
        let result = JsEvaluation {
            score,
            score_display: format_score(score),
            win_in: win_in_n(score),
        };
        serde_wasm_bindgen::to_value(&result).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Configure the transposition table size in megabytes.
    #[wasm_bindgen(js_name = "setTtSize")]
    pub fn set_tt_size(&mut self, mb: u32) {
        self.searcher = AlphaBetaSearcher::new(AlphaBetaConfig {
            tt_size_mb: mb as usize,
            ..AlphaBetaConfig::default()
        });
    }

    /// ASCII rendering of the board.
    pub fn display(&self) -> String {
        self.position.to_string()
    }
}

impl QuoridorEngine {
    fn from_position(position: Position) -> Self {
        Self {
            position,
            history: Vec::new(),
            searcher: AlphaBetaSearcher::new(AlphaBetaConfig::default()),
            evaluator: ClassicalEval::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }
}

impl Default for QuoridorEngine {
    fn default() -> Self {
        Self::new()
    }
}
