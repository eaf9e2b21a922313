//! Precomputed attack tables for leaper pieces (knights, kings, pawns)
//! and the ray-walking reference used to build slider tables.

use crate::board::types::{Bitboard, Color, Direction, Piece, Square};

const KNIGHT_STEPS: [i8; 8] = [-17, -15, -10, -6, 6, 10, 15, 17];
const KING_STEPS: [i8; 8] = [-9, -8, -7, -1, 1, 7, 8, 9];

/// Chebyshev distance between two squares
#[inline]
pub(crate) fn chebyshev(a: Square, b: Square) -> u8 {
    a.file().abs_diff(b.file()).max(a.rank().abs_diff(b.rank()))
}

/// The square `step` away from `sq`, as a bitboard, or empty if that lands
/// off the board or wraps around an edge.
pub(crate) fn safe_destination(sq: Square, step: i8) -> Bitboard {
    let to = sq.index() as i16 + step as i16;
    if !(0..64).contains(&to) {
        return Bitboard::EMPTY;
    }
    let to = Square::from_index(to as usize);
    if chebyshev(sq, to) <= 2 {
        Bitboard::from_square(to)
    } else {
        Bitboard::EMPTY
    }
}

fn leaper_table(steps: &[i8; 8]) -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    for (idx, slot) in attacks.iter_mut().enumerate() {
        let sq = Square::from_index(idx);
        *slot = steps
            .iter()
            .fold(Bitboard::EMPTY, |acc, &step| acc | safe_destination(sq, step));
    }
    attacks
}

pub(crate) fn knight_table() -> [Bitboard; 64] {
    leaper_table(&KNIGHT_STEPS)
}

pub(crate) fn king_table() -> [Bitboard; 64] {
    leaper_table(&KING_STEPS)
}

pub(crate) fn pawn_table() -> [[Bitboard; 64]; 2] {
    let mut attacks = [[Bitboard::EMPTY; 64]; 2];
    for color in Color::BOTH {
        for (idx, slot) in attacks[color.index()].iter_mut().enumerate() {
            *slot = Bitboard::from_square(Square::from_index(idx)).pawn_attacks(color);
        }
    }
    attacks
}

/// Slider attacks found by walking each ray until the first occupied
/// square, which is included.
pub(crate) fn sliding_attack(piece: Piece, sq: Square, occupied: Bitboard) -> Bitboard {
    let dirs = match piece {
        Piece::Bishop => &Direction::DIAGONAL,
        Piece::Rook => &Direction::ORTHOGONAL,
        _ => unreachable!("sliding_attack only handles bishops and rooks"),
    };
    let mut attacks = Bitboard::EMPTY;
    for &dir in dirs {
        let mut s = sq;
        while safe_destination(s, dir.0).any() {
            s = s.shifted(dir);
            attacks |= s;
            if occupied.contains(s) {
                break;
            }
        }
    }
    attacks
}
