//! Board representation, move generation and position-level rules.
//!
//! Positions are bitboard based with an owned undo history. Static data
//! (magic attack tables, Zobrist keys, the cuckoo table of reversible moves)
//! lives in a shared [`Tables`] context built once on first use.
//!
//! # Example
//! ```
//! use chess_core::board::{perft, Position};
//!
//! let mut pos = Position::new();
//! assert_eq!(pos.legal_moves().len(), 20);
//! assert_eq!(perft(&mut pos, 2), 400);
//! ```

mod attack_tables;
mod cuckoo;
mod debug;
mod error;
mod fen;
mod legality;
mod make_unmake;
mod movegen;
pub mod prelude;
mod repetition;
mod see;
mod state;
mod tables;
mod types;

#[cfg(test)]
mod tests;

pub use attack_tables::AttackTables;
pub use cuckoo::{Cuckoo, CUCKOO_ENTRIES};
pub use debug::pretty;
pub use error::{FenError, MoveParseError, SquareError};
pub use fen::START_FEN;
pub use movegen::{generate, perft, perft_divide, GenType};
pub use state::{Position, StateInfo};
pub use tables::Tables;
pub use types::{
    file_distance, pawn_push, rank_distance, relative_rank, Bitboard, BitboardIter,
    CastlingRights, Color, ColoredPiece, Direction, Move, MoveKind, MoveList, MoveListIntoIter,
    Piece, Square, MAX_MOVES,
};
