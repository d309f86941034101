use quoridor_core::{
    board::Walls, constants::NUM_SQUARES, eval::Evaluator, path::shortest_path_len,
    position::Position, types::Player, types::Score,
};
use serde::{Deserialize, Serialize};

/// Distance charged for a pawn with no route to its goal row. Legal play
/// never produces one; decoded positions might.
const UNREACHABLE_DISTANCE: i32 = NUM_SQUARES as i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalWeights {
    /// Per step of shortest-path advantage.
    pub path: i32,
    /// Per fence held in reserve beyond the opponent's count.
    pub fence: i32,
    /// Flat bonus for having the move.
    pub tempo: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            path: 10,
            fence: 3,
            tempo: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicalEval {
    weights: EvalWeights,
}

impl ClassicalEval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: EvalWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> EvalWeights {
        self.weights
    }
}

impl Evaluator for ClassicalEval {
    fn evaluate(&self, position: &Position) -> Score {
        let walls = position.walls();
        let own = position.side_to_move;
        let opponent = own.opponent();

        let path_gap = distance(&walls, position, opponent) - distance(&walls, position, own);
        let fence_gap =
            i32::from(position.fences_left(own)) - i32::from(position.fences_left(opponent));

        Score(self.weights.path * path_gap + self.weights.fence * fence_gap + self.weights.tempo)
    }
}

fn distance(walls: &Walls, position: &Position, player: Player) -> i32 {
    shortest_path_len(walls, position.pawn(player), player.goal_row())
        .map_or(UNREACHABLE_DISTANCE, i32::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quoridor_core::{FenceOrientation, FenceSlot, Move, Square};

    #[test]
    fn start_position_is_tempo_only() {
        let eval = ClassicalEval::new();
        assert_eq!(eval.evaluate(&Position::new()), Score(1));
    }

    #[test]
    fn advancing_pawn_helps_the_mover() {
        let eval = ClassicalEval::new();
        let position = Position::new()
            .apply(&Move::pawn(
                Square::new_unchecked(8, 4),
                Square::new_unchecked(7, 4),
            ))
            .unwrap();
        // Player Two to move, one step behind in the race.
        assert_eq!(eval.evaluate(&position), Score(-10 + 1));
    }

    #[test]
    fn fence_reserve_counts() {
        let eval = ClassicalEval::with_weights(EvalWeights {
            path: 0,
            fence: 5,
            tempo: 0,
        });
        let position = Position::new()
            .apply(&Move::fence(
                FenceOrientation::Vertical,
                FenceSlot::new_unchecked(0, 0),
            ))
            .unwrap();
        assert_eq!(eval.evaluate(&position), Score(5));
    }
}
