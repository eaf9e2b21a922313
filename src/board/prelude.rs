//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions.
//!
//! # Example
//! ```
//! use chess_core::board::prelude::*;
//!
//! let pos = Position::from_fen(START_FEN);
//! assert_eq!(pos.side_to_move(), Color::White);
//! ```

pub use super::{
    generate, perft, CastlingRights, Color, FenError, GenType, Move, MoveList, MoveParseError,
    Piece, Position, Square, SquareError, START_FEN,
};
pub use crate::tt::{Bound, TranspositionTable};
