//! Bitboard type and operations.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use super::piece::Color;
use super::square::{Direction, Square};

/// A 64-bit bitboard representing piece positions or attack squares.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

// File masks (columns)
impl Bitboard {
    pub const FILE_A: Bitboard = Bitboard(0x0101010101010101);
    pub const FILE_B: Bitboard = Bitboard(0x0202020202020202);
    pub const FILE_G: Bitboard = Bitboard(0x4040404040404040);
    pub const FILE_H: Bitboard = Bitboard(0x8080808080808080);

    pub const RANK_1: Bitboard = Bitboard(0x00000000000000FF);
    pub const RANK_2: Bitboard = Bitboard(0x000000000000FF00);
    pub const RANK_3: Bitboard = Bitboard(0x0000000000FF0000);
    pub const RANK_6: Bitboard = Bitboard(0x0000FF0000000000);
    pub const RANK_7: Bitboard = Bitboard(0x00FF000000000000);
    pub const RANK_8: Bitboard = Bitboard(0xFF00000000000000);

    pub const EMPTY: Bitboard = Bitboard(0);
    pub const ALL: Bitboard = Bitboard(!0);
}

impl Bitboard {
    /// Create a bitboard with a single square set
    #[inline]
    #[must_use]
    pub const fn from_square(sq: Square) -> Self {
        Bitboard(1 << sq.index())
    }

    /// Returns an iterator over the squares set in this bitboard
    #[inline]
    #[must_use]
    pub fn iter(self) -> BitboardIter {
        BitboardIter(self)
    }

    /// Returns true if the bitboard is empty
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn any(self) -> bool {
        self.0 != 0
    }

    /// Returns the number of set bits (population count)
    #[inline]
    #[must_use]
    pub const fn popcount(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns true if two or more bits are set
    #[inline]
    #[must_use]
    pub const fn more_than_one(self) -> bool {
        self.0 & self.0.wrapping_sub(1) != 0
    }

    /// Returns true if the given square is set
    #[inline]
    #[must_use]
    pub const fn contains(self, sq: Square) -> bool {
        (self.0 >> sq.index()) & 1 != 0
    }

    /// Least significant set square. The bitboard must not be empty.
    #[inline]
    #[must_use]
    pub const fn lsb(self) -> Square {
        debug_assert!(self.0 != 0);
        Square::from_index(self.0.trailing_zeros() as usize)
    }

    /// Most significant set square. The bitboard must not be empty.
    #[inline]
    #[must_use]
    pub const fn msb(self) -> Square {
        debug_assert!(self.0 != 0);
        Square::from_index(63 - self.0.leading_zeros() as usize)
    }

    /// Remove and return the least significant set square
    #[inline]
    pub fn pop_lsb(&mut self) -> Square {
        let sq = self.lsb();
        self.0 &= self.0 - 1;
        sq
    }

    /// Get the file mask for a given file index (0-7)
    #[inline]
    #[must_use]
    pub const fn file_mask(file: u8) -> Self {
        Bitboard(Self::FILE_A.0 << file)
    }

    /// Get the rank mask for a given rank index (0-7)
    #[inline]
    #[must_use]
    pub const fn rank_mask(rank: u8) -> Self {
        Bitboard(Self::RANK_1.0 << (rank * 8))
    }

    #[inline]
    #[must_use]
    pub const fn file_of(sq: Square) -> Self {
        Self::file_mask(sq.file())
    }

    #[inline]
    #[must_use]
    pub const fn rank_of(sq: Square) -> Self {
        Self::rank_mask(sq.rank())
    }

    /// Shift every bit one step in `dir`, dropping bits that would wrap
    /// around the a/h files or fall off the board.
    #[inline]
    #[must_use]
    pub const fn shift(self, dir: Direction) -> Self {
        let b = self.0;
        Bitboard(match dir.0 {
            8 => b << 8,
            -8 => b >> 8,
            16 => b << 16,
            -16 => b >> 16,
            1 => (b & !Self::FILE_H.0) << 1,
            -1 => (b & !Self::FILE_A.0) >> 1,
            9 => (b & !Self::FILE_H.0) << 9,
            7 => (b & !Self::FILE_A.0) << 7,
            -7 => (b & !Self::FILE_H.0) >> 7,
            -9 => (b & !Self::FILE_A.0) >> 9,
            _ => 0,
        })
    }

    /// Squares attacked by all pawns of `color` in this bitboard
    #[inline]
    #[must_use]
    pub const fn pawn_attacks(self, color: Color) -> Self {
        match color {
            Color::White => Bitboard(
                self.shift(Direction::NORTH_WEST).0 | self.shift(Direction::NORTH_EAST).0,
            ),
            Color::Black => Bitboard(
                self.shift(Direction::SOUTH_WEST).0 | self.shift(Direction::SOUTH_EAST).0,
            ),
        }
    }
}

impl BitAnd for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}

impl BitOr for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}

impl BitXor for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl Not for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

impl BitAnd<Square> for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitand(self, rhs: Square) -> Self::Output {
        self & Bitboard::from_square(rhs)
    }
}

impl BitOr<Square> for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitor(self, rhs: Square) -> Self::Output {
        self | Bitboard::from_square(rhs)
    }
}

impl BitXor<Square> for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitxor(self, rhs: Square) -> Self::Output {
        self ^ Bitboard::from_square(rhs)
    }
}

impl BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitXorAssign for Bitboard {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl BitOrAssign<Square> for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Square) {
        self.0 |= 1 << rhs.index();
    }
}

impl BitXorAssign<Square> for Bitboard {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Square) {
        self.0 ^= 1 << rhs.index();
    }
}

impl From<Square> for Bitboard {
    #[inline]
    fn from(sq: Square) -> Self {
        Bitboard::from_square(sq)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitboard({:#018x})", self.0)
    }
}

/// Renders the board rank 8 first, `X` for set squares.
impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+---+---+---+---+---+---+---+---+")?;
        for rank in (0..8).rev() {
            for file in 0..8 {
                let c = if self.contains(Square::new(file, rank)) {
                    'X'
                } else {
                    ' '
                };
                write!(f, "| {c} ")?;
            }
            writeln!(f, "| {}", rank + 1)?;
            writeln!(f, "+---+---+---+---+---+---+---+---+")?;
        }
        writeln!(f, "  a   b   c   d   e   f   g   h")
    }
}

/// Iterator over set bits in a Bitboard
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.pop_lsb())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.popcount() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;

    fn into_iter(self) -> Self::IntoIter {
        BitboardIter(self)
    }
}
