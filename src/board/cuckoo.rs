//! Cuckoo table of reversible moves, used to detect that the side to move
//! can force a repetition of an earlier position.
//!
//! Every non-pawn move that can be taken back (`s1 -> s2` and `s2 -> s1`
//! for the same piece) is stored under the key
//! `psq[p][s1] ^ psq[p][s2] ^ side`, which is exactly the difference between
//! the two position keys.

use super::attack_tables::AttackTables;
use super::types::{Bitboard, Color, ColoredPiece, Move, Piece, Square};
use crate::zobrist::Zobrist;

pub(crate) const CUCKOO_SIZE: usize = 8192;

/// Number of reversible (piece, square pair) combinations on an empty board
pub const CUCKOO_ENTRIES: usize = 3668;

#[inline]
pub(crate) const fn h1(key: u64) -> usize {
    (key & 0x1fff) as usize
}

#[inline]
pub(crate) const fn h2(key: u64) -> usize {
    ((key >> 16) & 0x1fff) as usize
}

/// Displacements allowed for one insertion before the build is abandoned
const MAX_DISPLACEMENTS: usize = 4096;

pub struct Cuckoo {
    keys: Box<[u64]>,
    moves: Box<[Move]>,
    len: usize,
}

impl Cuckoo {
    /// Build the table for the given keys. Returns `None` if some insertion
    /// runs into an eviction cycle; the caller then retries with fresh keys.
    #[must_use]
    pub fn try_new(zobrist: &Zobrist, attacks: &AttackTables) -> Option<Self> {
        let mut keys = vec![0u64; CUCKOO_SIZE].into_boxed_slice();
        let mut moves = vec![Move::NONE; CUCKOO_SIZE].into_boxed_slice();
        let mut len = 0;

        for color in Color::BOTH {
            for piece in [
                Piece::Knight,
                Piece::Bishop,
                Piece::Rook,
                Piece::Queen,
                Piece::King,
            ] {
                let pc = ColoredPiece::new(color, piece);
                for s1 in Square::all() {
                    let reach = attacks.pseudo_attacks(piece, s1);
                    for s2 in (s1.index() + 1..64).map(Square::from_index) {
                        if !reach.contains(s2) {
                            continue;
                        }
                        let mut mv = Move::new(s1, s2);
                        let mut key = zobrist.piece_square(pc, s1)
                            ^ zobrist.piece_square(pc, s2)
                            ^ zobrist.side();
                        let mut i = h1(key);
                        let mut displaced = 0;
                        loop {
                            std::mem::swap(&mut keys[i], &mut key);
                            std::mem::swap(&mut moves[i], &mut mv);
                            if mv.is_none() {
                                break;
                            }
                            displaced += 1;
                            if displaced > MAX_DISPLACEMENTS {
                                return None;
                            }
                            // Push the evicted entry to its other slot
                            i = if i == h1(key) { h2(key) } else { h1(key) };
                        }
                        len += 1;
                    }
                }
            }
        }

        debug_assert_eq!(len, CUCKOO_ENTRIES);
        log::debug!("cuckoo table built with {len} reversible moves");
        Some(Cuckoo { keys, moves, len })
    }

    /// Look up the reversible move whose key difference is `key`.
    #[inline]
    #[must_use]
    pub fn lookup(&self, key: u64) -> Option<Move> {
        let i = h1(key);
        if self.keys[i] == key {
            return Some(self.moves[i]);
        }
        let j = h2(key);
        if self.keys[j] == key {
            return Some(self.moves[j]);
        }
        None
    }

    /// Number of stored moves
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if the path of a stored move is clear in `occupied`
    /// (both end squares excluded).
    #[inline]
    pub(crate) fn path_clear(attacks: &AttackTables, mv: Move, occupied: Bitboard) -> bool {
        ((attacks.between(mv.from(), mv.to()) ^ mv.to()) & occupied).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Tables;

    #[test]
    fn test_entry_count() {
        let cuckoo = &Tables::global().cuckoo;
        assert_eq!(cuckoo.len(), CUCKOO_ENTRIES);
    }

    #[test]
    fn test_every_reversible_move_is_found() {
        let tables = Tables::global();
        let z = &tables.zobrist;
        let pc = ColoredPiece::new(Color::Black, Piece::Knight);
        let g8: Square = "g8".parse().unwrap();
        let f6: Square = "f6".parse().unwrap();
        let key = z.piece_square(pc, g8) ^ z.piece_square(pc, f6) ^ z.side();
        let mv = tables.cuckoo.lookup(key).expect("knight move stored");
        assert_eq!(mv, Move::new(f6, g8));
    }

    #[test]
    fn test_pawn_moves_are_not_stored() {
        let tables = Tables::global();
        let z = &tables.zobrist;
        let pc = ColoredPiece::new(Color::White, Piece::Pawn);
        let e2: Square = "e2".parse().unwrap();
        let e3: Square = "e3".parse().unwrap();
        let key = z.piece_square(pc, e2) ^ z.piece_square(pc, e3) ^ z.side();
        assert_eq!(tables.cuckoo.lookup(key), None);
    }
}
