//! Position representation and move generation core of a chess engine.
//!
//! * [`board`]: bitboard positions, FEN, make/unmake, legal move
//!   generation, static exchange evaluation and repetition detection.
//! * [`tt`]: the lock-free transposition table shared by search threads.
//! * [`memory`]: the allocator interface the table draws its block from.
//! * [`zobrist`]: hashing keys.
//!
//! Search, evaluation and protocol handling are left to the embedding
//! program.

pub mod board;
pub mod memory;
pub mod tt;
pub mod zobrist;

pub use board::{Color, Move, Piece, Position, Square};
pub use tt::TranspositionTable;
