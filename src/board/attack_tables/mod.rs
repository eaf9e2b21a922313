//! Attack tables for move generation.
//!
//! Sliding pieces (bishop, rook, queen) use fancy magic bitboards over two
//! shared attack vectors. Leapers and pawns use plain per-square tables.
//! Square-pair geometry (`between`, `line`, `distance`) is precomputed as well.
//!
//! The tables are built once inside [`crate::board::Tables`] and are
//! read-only afterwards. Queries never allocate or fail.

mod magic;
mod tables;

use magic::{init_magics, Magic, BISHOP_TABLE_SIZE, ROOK_TABLE_SIZE};
use tables::{chebyshev, king_table, knight_table, pawn_table};

pub(crate) use magic::relevant_mask;
pub(crate) use tables::sliding_attack;

use crate::board::types::{Bitboard, Color, Piece, Square};

/// All precomputed attack and geometry tables.
pub struct AttackTables {
    rook_magics: [Magic; 64],
    bishop_magics: [Magic; 64],
    rook_table: Box<[Bitboard]>,
    bishop_table: Box<[Bitboard]>,
    pawn: [[Bitboard; 64]; 2],
    pseudo: [[Bitboard; 64]; Piece::COUNT],
    between: Box<[[Bitboard; 64]]>,
    line: Box<[[Bitboard; 64]]>,
    distance: Box<[[u8; 64]]>,
}

impl AttackTables {
    /// Build every table. Deterministic: the magic search uses fixed seeds.
    #[must_use]
    pub fn new() -> Self {
        let mut rook_table = vec![Bitboard::EMPTY; ROOK_TABLE_SIZE].into_boxed_slice();
        let mut bishop_table = vec![Bitboard::EMPTY; BISHOP_TABLE_SIZE].into_boxed_slice();
        let rook_magics = init_magics(Piece::Rook, &mut rook_table);
        let bishop_magics = init_magics(Piece::Bishop, &mut bishop_table);

        let mut tables = AttackTables {
            rook_magics,
            bishop_magics,
            rook_table,
            bishop_table,
            pawn: pawn_table(),
            pseudo: [[Bitboard::EMPTY; 64]; Piece::COUNT],
            between: vec![[Bitboard::EMPTY; 64]; 64].into_boxed_slice(),
            line: vec![[Bitboard::EMPTY; 64]; 64].into_boxed_slice(),
            distance: vec![[0u8; 64]; 64].into_boxed_slice(),
        };

        tables.pseudo[Piece::Knight.index()] = knight_table();
        tables.pseudo[Piece::King.index()] = king_table();

        for s1 in Square::all() {
            let bishop = tables.bishop_attacks(s1, Bitboard::EMPTY);
            let rook = tables.rook_attacks(s1, Bitboard::EMPTY);
            tables.pseudo[Piece::Bishop.index()][s1.index()] = bishop;
            tables.pseudo[Piece::Rook.index()][s1.index()] = rook;
            tables.pseudo[Piece::Queen.index()][s1.index()] = bishop | rook;

            for s2 in Square::all() {
                tables.distance[s1.index()][s2.index()] = chebyshev(s1, s2);
            }

            for piece in [Piece::Bishop, Piece::Rook] {
                for s2 in Square::all() {
                    if tables.pseudo[piece.index()][s1.index()].contains(s2) {
                        let line = (tables.attacks(piece, s1, Bitboard::EMPTY)
                            & tables.attacks(piece, s2, Bitboard::EMPTY))
                            | s1
                            | s2;
                        let between = tables.attacks(piece, s1, Bitboard::from_square(s2))
                            & tables.attacks(piece, s2, Bitboard::from_square(s1));
                        tables.line[s1.index()][s2.index()] = line;
                        tables.between[s1.index()][s2.index()] = between;
                    }
                }
            }
            for s2 in Square::all() {
                tables.between[s1.index()][s2.index()] |= s2;
            }
        }

        tables
    }

    /// Bishop attacks from `sq` given the board occupancy
    #[inline]
    #[must_use]
    pub fn bishop_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop_table[self.bishop_magics[sq.index()].index(occupied)]
    }

    /// Rook attacks from `sq` given the board occupancy
    #[inline]
    #[must_use]
    pub fn rook_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rook_table[self.rook_magics[sq.index()].index(occupied)]
    }

    #[inline]
    #[must_use]
    pub fn queen_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop_attacks(sq, occupied) | self.rook_attacks(sq, occupied)
    }

    /// Squares attacked by a pawn of `color` standing on `sq`
    #[inline]
    #[must_use]
    pub fn pawn_attacks(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn[color.index()][sq.index()]
    }

    /// Attacks on an empty board. Pawns have no entry here; use
    /// [`AttackTables::pawn_attacks`].
    #[inline]
    #[must_use]
    pub fn pseudo_attacks(&self, piece: Piece, sq: Square) -> Bitboard {
        debug_assert!(piece != Piece::Pawn);
        self.pseudo[piece.index()][sq.index()]
    }

    /// Attacks of a non-pawn piece from `sq`. Sliders stop at (and include)
    /// the first occupied square on each ray.
    #[inline]
    #[must_use]
    pub fn attacks(&self, piece: Piece, sq: Square, occupied: Bitboard) -> Bitboard {
        debug_assert!(piece != Piece::Pawn);
        match piece {
            Piece::Bishop => self.bishop_attacks(sq, occupied),
            Piece::Rook => self.rook_attacks(sq, occupied),
            Piece::Queen => self.queen_attacks(sq, occupied),
            Piece::Knight | Piece::King | Piece::Pawn => self.pseudo[piece.index()][sq.index()],
        }
    }

    /// Squares strictly between `s1` and `s2`, plus `s2` itself. When the
    /// two are not on a common line this is just `s2`.
    #[inline]
    #[must_use]
    pub fn between(&self, s1: Square, s2: Square) -> Bitboard {
        self.between[s1.index()][s2.index()]
    }

    /// The full edge-to-edge line through `s1` and `s2`, or empty if they
    /// are not aligned.
    #[inline]
    #[must_use]
    pub fn line(&self, s1: Square, s2: Square) -> Bitboard {
        self.line[s1.index()][s2.index()]
    }

    /// True if the three squares lie on one rank, file or diagonal
    #[inline]
    #[must_use]
    pub fn aligned(&self, s1: Square, s2: Square, s3: Square) -> bool {
        self.line(s1, s2).contains(s3)
    }

    /// Chebyshev (king-move) distance
    #[inline]
    #[must_use]
    pub fn distance(&self, s1: Square, s2: Square) -> u8 {
        self.distance[s1.index()][s2.index()]
    }
}

impl Default for AttackTables {
    fn default() -> Self {
        AttackTables::new()
    }
}
