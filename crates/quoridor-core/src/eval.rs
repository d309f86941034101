use crate::position::Position;
use crate::types::Score;

/// Static evaluation, always from the side to move's point of view.
pub trait Evaluator {
    fn evaluate(&self, position: &Position) -> Score;
}
