//! Zobrist hashing for chess positions.
//!
//! Provides incrementally-updatable 64-bit position hashes for transposition tables.
//! Keys are drawn once from a fixed seed so hashes are stable across runs.

use rand::prelude::*;

use crate::board::{CastlingRights, ColoredPiece, Square};

/// Seed for the default key set
pub const ZOBRIST_SEED: u64 = 1_070_372;

/// Random keys for every hashed feature of a position.
pub struct Zobrist {
    /// `psq[colored_piece][square]`. Also indexed by piece count for the
    /// material key.
    pub(crate) psq: [[u64; 64]; 12],
    pub(crate) en_passant: [u64; 8],
    pub(crate) castling: [u64; CastlingRights::COUNT],
    pub(crate) side: u64,
    pub(crate) no_pawns: u64,
}

impl Zobrist {
    #[must_use]
    pub fn new() -> Self {
        Zobrist::with_seed(ZOBRIST_SEED)
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut psq = [[0u64; 64]; 12];
        let mut en_passant = [0u64; 8];
        let mut castling = [0u64; CastlingRights::COUNT];

        for piece in &mut psq {
            for key in piece.iter_mut() {
                *key = rng.gen();
            }
        }

        for key in &mut en_passant {
            *key = rng.gen();
        }

        for key in &mut castling {
            *key = rng.gen();
        }

        let side = rng.gen();
        let no_pawns = rng.gen();

        Zobrist {
            psq,
            en_passant,
            castling,
            side,
            no_pawns,
        }
    }

    #[inline]
    #[must_use]
    pub fn piece_square(&self, pc: ColoredPiece, sq: Square) -> u64 {
        self.psq[pc.index()][sq.index()]
    }

    /// Material-key term for the `count`-th piece of this kind (0-based)
    #[inline]
    #[must_use]
    pub fn material(&self, pc: ColoredPiece, count: usize) -> u64 {
        self.psq[pc.index()][count]
    }

    #[inline]
    #[must_use]
    pub fn en_passant(&self, file: u8) -> u64 {
        self.en_passant[file as usize]
    }

    #[inline]
    #[must_use]
    pub fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.index()]
    }

    /// XORed in when Black is to move
    #[inline]
    #[must_use]
    pub fn side(&self) -> u64 {
        self.side
    }

    /// Initial value of the pawn key, so a pawnless pawn key is non-zero
    #[inline]
    #[must_use]
    pub fn no_pawns(&self) -> u64 {
        self.no_pawns
    }
}

impl Default for Zobrist {
    fn default() -> Self {
        Zobrist::new()
    }
}

/// Knuth's MMIX linear congruential step, used to derive extra key
/// material from a small integer.
#[inline]
#[must_use]
pub const fn make_key(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}
