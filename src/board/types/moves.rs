//! Move types and move list.

use std::fmt;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::square::Square;

const TO_MASK: u16 = 0x3F;
const FROM_SHIFT: u16 = 6;
const PROMO_SHIFT: u16 = 12;
const KIND_SHIFT: u16 = 14;

/// Special-move flag stored in the top two bits of a `Move`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    Promotion,
    EnPassant,
    Castling,
}

impl MoveKind {
    #[inline]
    const fn bits(self) -> u16 {
        match self {
            MoveKind::Normal => 0,
            MoveKind::Promotion => 1 << KIND_SHIFT,
            MoveKind::EnPassant => 2 << KIND_SHIFT,
            MoveKind::Castling => 3 << KIND_SHIFT,
        }
    }
}

/// Compact 16-bit move representation.
///
/// Encoding:
/// - bits 0-5:   destination square
/// - bits 6-11:  origin square
/// - bits 12-13: promotion piece minus knight
/// - bits 14-15: kind (normal, promotion, en passant, castling)
///
/// Castling moves are stored as king origin to the castling rook's square.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move(u16);

impl Move {
    /// No move. Also the zero value of an empty table slot.
    pub const NONE: Move = Move(0);
    /// The null move (b1b1), used for passing the turn.
    pub const NULL: Move = Move(65);

    /// Create a normal move
    #[inline]
    #[must_use]
    pub const fn new(from: Square, to: Square) -> Self {
        Move(((from.index() as u16) << FROM_SHIFT) | to.index() as u16)
    }

    /// Create a move of the given kind. `promo` is only meaningful for
    /// promotions and must be a knight, bishop, rook or queen.
    #[inline]
    #[must_use]
    pub const fn make(kind: MoveKind, from: Square, to: Square, promo: Piece) -> Self {
        let promo_bits = (promo.index() as u16).saturating_sub(Piece::Knight.index() as u16) & 3;
        Move(
            kind.bits()
                | (promo_bits << PROMO_SHIFT)
                | ((from.index() as u16) << FROM_SHIFT)
                | to.index() as u16,
        )
    }

    #[inline]
    #[must_use]
    pub const fn promotion(from: Square, to: Square, piece: Piece) -> Self {
        Move::make(MoveKind::Promotion, from, to, piece)
    }

    #[inline]
    #[must_use]
    pub const fn en_passant(from: Square, to: Square) -> Self {
        Move::make(MoveKind::EnPassant, from, to, Piece::Knight)
    }

    /// Castling move from the king's square to the rook's square.
    #[inline]
    #[must_use]
    pub const fn castling(king_from: Square, rook_from: Square) -> Self {
        Move::make(MoveKind::Castling, king_from, rook_from, Piece::Knight)
    }

    /// Get the origin square
    #[inline]
    #[must_use]
    pub const fn from(self) -> Square {
        Square::from_index(((self.0 >> FROM_SHIFT) & 0x3F) as usize)
    }

    /// Get the destination square (the rook's square for castling)
    #[inline]
    #[must_use]
    pub const fn to(self) -> Square {
        Square::from_index((self.0 & TO_MASK) as usize)
    }

    #[inline]
    #[must_use]
    pub const fn kind(self) -> MoveKind {
        match self.0 >> KIND_SHIFT {
            0 => MoveKind::Normal,
            1 => MoveKind::Promotion,
            2 => MoveKind::EnPassant,
            _ => MoveKind::Castling,
        }
    }

    /// Promotion piece. Only meaningful when `kind()` is `Promotion`.
    #[inline]
    #[must_use]
    pub const fn promotion_piece(self) -> Piece {
        Piece::from_index(((self.0 >> PROMO_SHIFT) & 3) as usize + Piece::Knight.index())
    }

    #[inline]
    #[must_use]
    pub const fn is_promotion(self) -> bool {
        matches!(self.kind(), MoveKind::Promotion)
    }

    #[inline]
    #[must_use]
    pub const fn is_en_passant(self) -> bool {
        matches!(self.kind(), MoveKind::EnPassant)
    }

    #[inline]
    #[must_use]
    pub const fn is_castling(self) -> bool {
        matches!(self.kind(), MoveKind::Castling)
    }

    /// True for anything except `NONE` and `NULL`
    #[inline]
    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.0 != Move::NONE.0 && self.0 != Move::NULL.0
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw 16-bit value (for hashing/storage)
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Create from raw 16-bit value
    #[inline]
    #[must_use]
    pub const fn from_u16(value: u16) -> Self {
        Move(value)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Move::NONE => write!(f, "Move(none)"),
            Move::NULL => write!(f, "Move(null)"),
            m => {
                write!(f, "Move({}{}", m.from(), m.to())?;
                match m.kind() {
                    MoveKind::Normal => {}
                    MoveKind::Promotion => {
                        write!(f, "={}", m.promotion_piece().to_char().to_ascii_uppercase())?
                    }
                    MoveKind::EnPassant => write!(f, " ep")?,
                    MoveKind::Castling => write!(f, " castle")?,
                }
                write!(f, ")")
            }
        }
    }
}

/// Coordinate notation. Castling prints the king's destination square.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Move::NONE => return write!(f, "(none)"),
            Move::NULL => return write!(f, "0000"),
            _ => {}
        }
        let from = self.from();
        let mut to = self.to();
        if self.is_castling() {
            let file = if to > from { 6 } else { 2 };
            to = Square::new(file, from.rank());
        }
        write!(f, "{from}{to}")?;
        if self.is_promotion() {
            write!(f, "{}", self.promotion_piece().to_char())?;
        }
        Ok(())
    }
}

pub const MAX_MOVES: usize = 256;

/// List of moves with fixed-size backing array.
#[derive(Clone, Debug)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    #[must_use]
    pub fn new() -> Self {
        MoveList {
            moves: [Move::NONE; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES);
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }

    /// Remove the move at `idx` by moving the last move into its slot.
    #[inline]
    pub fn swap_remove(&mut self, idx: usize) -> Move {
        debug_assert!(idx < self.len);
        let mv = self.moves[idx];
        self.len -= 1;
        self.moves[idx] = self.moves[self.len];
        mv
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Move> {
        if idx < self.len {
            Some(self.moves[idx])
        } else {
            None
        }
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList::new()
    }
}

/// Owning iterator over moves in a `MoveList`
pub struct MoveListIntoIter {
    list: MoveList,
    idx: usize,
}

impl Iterator for MoveListIntoIter {
    type Item = Move;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx < self.list.len {
            let mv = self.list.moves[self.idx];
            self.idx += 1;
            Some(mv)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.len - self.idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MoveListIntoIter {}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = MoveListIntoIter;

    fn into_iter(self) -> Self::IntoIter {
        MoveListIntoIter { list: self, idx: 0 }
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, idx: usize) -> &Self::Output {
        assert!(
            idx < self.len,
            "MoveList index {} out of bounds (len {})",
            idx,
            self.len
        );
        &self.moves[idx]
    }
}
