//! Core chess types.
//!
//! This module contains the fundamental value types used throughout the crate:
//! - `Piece`, `Color` and `ColoredPiece`
//! - `Square` and `Direction`
//! - `Bitboard` - 64-bit board representation
//! - `Move` and `MoveList` - 16-bit move encoding
//! - `CastlingRights` - castling state

mod bitboard;
mod castling;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use castling::CastlingRights;
pub use moves::{Move, MoveKind, MoveList, MoveListIntoIter, MAX_MOVES};
pub use piece::{Color, ColoredPiece, Piece};
pub use square::{
    file_distance, pawn_push, rank_distance, relative_rank, Direction, Square,
};
