pub mod board;
pub mod codec;
pub mod constants;
pub mod eval;
pub mod movegen;
pub mod notation;
pub mod path;
pub mod position;
pub mod search;
pub mod types;
pub mod zobrist;

pub use board::{FenceLayout, Walls};
pub use codec::{
    decode_move, decode_position, encode_move, encode_position, CodecError, EncodedMove,
    MoveKind, ENCODED_POSITION_LEN,
};
pub use eval::Evaluator;
pub use movegen::{generate_legal_moves, LegalMoveSet};
pub use notation::{move_to_notation, parse_notation, NotationError};
pub use path::{has_path, shortest_path_len};
pub use position::{Position, PositionError};
pub use search::{SearchError, SearchLimits, SearchResult, Searcher};
pub use types::{FenceOrientation, FenceSlot, Move, MoveList, PawnDirection, Player, Score, Square};
