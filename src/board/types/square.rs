//! Square, file and rank types.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Color;
use crate::board::error::SquareError;

/// Offset between two squares along one of the eight compass directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Direction(pub i8);

impl Direction {
    pub const NORTH: Direction = Direction(8);
    pub const SOUTH: Direction = Direction(-8);
    pub const EAST: Direction = Direction(1);
    pub const WEST: Direction = Direction(-1);
    pub const NORTH_EAST: Direction = Direction(9);
    pub const NORTH_WEST: Direction = Direction(7);
    pub const SOUTH_EAST: Direction = Direction(-7);
    pub const SOUTH_WEST: Direction = Direction(-9);

    /// The four rook directions
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::NORTH,
        Direction::SOUTH,
        Direction::EAST,
        Direction::WEST,
    ];

    /// The four bishop directions
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NORTH_EAST,
        Direction::SOUTH_EAST,
        Direction::SOUTH_WEST,
        Direction::NORTH_WEST,
    ];
}

/// A square on the board, `0..64` with a1 = 0, b1 = 1, ..., h8 = 63.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square(u8);

impl Square {
    pub const A1: Square = Square(0);
    pub const B1: Square = Square(1);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const E8: Square = Square(60);
    pub const H8: Square = Square(63);

    /// Number of squares on the board
    pub const COUNT: usize = 64;

    /// Create a square from file (0 = a) and rank (0 = rank 1).
    #[inline]
    #[must_use]
    pub const fn new(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// Create a square from its index.
    #[inline]
    #[must_use]
    pub const fn from_index(idx: usize) -> Self {
        debug_assert!(idx < 64);
        Square(idx as u8)
    }

    /// Square index, usable for table lookups
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    /// Rank as seen from `color`'s side of the board (0 = own back rank).
    #[inline]
    #[must_use]
    pub const fn relative_rank(self, color: Color) -> u8 {
        relative_rank(color, self.rank())
    }

    /// Mirror the square vertically for Black (a1 <-> a8), identity for White.
    #[inline]
    #[must_use]
    pub const fn relative(self, color: Color) -> Self {
        match color {
            Color::White => self,
            Color::Black => Square(self.0 ^ 56),
        }
    }

    /// Mirror vertically regardless of color.
    #[inline]
    #[must_use]
    pub const fn flip_vertical(self) -> Self {
        Square(self.0 ^ 56)
    }

    /// Step in a direction, returning `None` when leaving the board or
    /// wrapping around a file edge.
    #[inline]
    #[must_use]
    pub fn offset(self, dir: Direction) -> Option<Self> {
        let to = self.0 as i16 + dir.0 as i16;
        if !(0..64).contains(&to) {
            return None;
        }
        let to = Square(to as u8);
        if file_distance(self, to) > 2 {
            None
        } else {
            Some(to)
        }
    }

    /// Unchecked step, for moves already known to stay on the board.
    #[inline]
    #[must_use]
    pub const fn shifted(self, dir: Direction) -> Self {
        Square((self.0 as i8 + dir.0) as u8)
    }

    /// Iterate over all 64 squares in index order
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file()) as char,
            (b'1' + self.rank()) as char
        )
    }
}

impl TryFrom<(u8, u8)> for Square {
    type Error = SquareError;

    fn try_from((file, rank): (u8, u8)) -> Result<Self, Self::Error> {
        if rank >= 8 {
            return Err(SquareError::RankOutOfBounds { rank });
        }
        if file >= 8 {
            return Err(SquareError::FileOutOfBounds { file });
        }
        Ok(Square::new(file, rank))
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(SquareError::InvalidNotation {
                notation: s.to_string(),
            });
        }
        match (bytes[0], bytes[1]) {
            (f @ b'a'..=b'h', r @ b'1'..=b'8') => Ok(Square::new(f - b'a', r - b'1')),
            _ => Err(SquareError::InvalidNotation {
                notation: s.to_string(),
            }),
        }
    }
}

/// Rank index from `color`'s point of view
#[inline]
#[must_use]
pub const fn relative_rank(color: Color, rank: u8) -> u8 {
    match color {
        Color::White => rank,
        Color::Black => 7 - rank,
    }
}

#[inline]
#[must_use]
pub fn file_distance(a: Square, b: Square) -> u8 {
    a.file().abs_diff(b.file())
}

#[inline]
#[must_use]
pub fn rank_distance(a: Square, b: Square) -> u8 {
    a.rank().abs_diff(b.rank())
}

/// Direction a pawn of `color` advances in
#[inline]
#[must_use]
pub const fn pawn_push(color: Color) -> Direction {
    match color {
        Color::White => Direction::NORTH,
        Color::Black => Direction::SOUTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_parse_and_display() {
        let sq: Square = "e4".parse().unwrap();
        assert_eq!(sq.file(), 4);
        assert_eq!(sq.rank(), 3);
        assert_eq!(sq.index(), 28);
        assert_eq!(sq.to_string(), "e4");
        assert!("i9".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
    }

    #[test]
    fn test_offset_rejects_wraparound() {
        assert_eq!(Square::H1.offset(Direction::EAST), None);
        assert_eq!(Square::A1.offset(Direction::WEST), None);
        assert_eq!(Square::A1.offset(Direction::SOUTH), None);
        assert_eq!(Square::A1.offset(Direction::NORTH_EAST), Some(Square::new(1, 1)));
    }

    #[test]
    fn test_relative_square() {
        assert_eq!(Square::G1.relative(Color::Black), Square::new(6, 7));
        assert_eq!(Square::G1.relative(Color::White), Square::G1);
        assert_eq!(Square::new(0, 6).relative_rank(Color::Black), 1);
    }

    #[test]
    fn test_try_from_bounds() {
        assert!(Square::try_from((8u8, 0u8)).is_err());
        assert!(Square::try_from((0u8, 8u8)).is_err());
        assert_eq!(Square::try_from((7u8, 7u8)).unwrap(), Square::H8);
    }
}
