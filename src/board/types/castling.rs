//! Castling rights type.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Color;

/// Castling rights represented as a 4-bit mask.
///
/// A single right (one of the four `*_OO`/`*_OOO` constants) also serves
/// as an index into per-right tables such as rook squares and paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_OO: CastlingRights = CastlingRights(1);
    pub const WHITE_OOO: CastlingRights = CastlingRights(1 << 1);
    pub const BLACK_OO: CastlingRights = CastlingRights(1 << 2);
    pub const BLACK_OOO: CastlingRights = CastlingRights(1 << 3);

    pub const KING_SIDE: CastlingRights = CastlingRights(1 | 1 << 2);
    pub const QUEEN_SIDE: CastlingRights = CastlingRights(1 << 1 | 1 << 3);
    pub const WHITE: CastlingRights = CastlingRights(1 | 1 << 1);
    pub const BLACK: CastlingRights = CastlingRights(1 << 2 | 1 << 3);
    pub const ANY: CastlingRights = CastlingRights(0xF);

    /// Number of distinct right combinations
    pub const COUNT: usize = 16;

    /// Both rights belonging to `color`
    #[inline]
    #[must_use]
    pub const fn of(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE,
            Color::Black => Self::BLACK,
        }
    }

    /// The single right for `color` on the given wing
    #[inline]
    #[must_use]
    pub const fn single(color: Color, king_side: bool) -> Self {
        match (color, king_side) {
            (Color::White, true) => Self::WHITE_OO,
            (Color::White, false) => Self::WHITE_OOO,
            (Color::Black, true) => Self::BLACK_OO,
            (Color::Black, false) => Self::BLACK_OOO,
        }
    }

    /// True if any right in `other` is also present here
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: CastlingRights) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if this is one of the four single rights
    #[inline]
    #[must_use]
    pub const fn is_single(self) -> bool {
        self.0.is_power_of_two() && self.0 <= 8
    }

    #[inline]
    #[must_use]
    pub const fn is_king_side(self) -> bool {
        self.0 & Self::KING_SIDE.0 != 0
    }

    /// Table index for this combination (`0..16`)
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw bitmask value
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Create from raw bitmask value; bits above the low four are dropped.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        CastlingRights(value & 0xF)
    }
}

impl BitOr for CastlingRights {
    type Output = CastlingRights;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        CastlingRights(self.0 | rhs.0)
    }
}

impl BitAnd for CastlingRights {
    type Output = CastlingRights;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        CastlingRights(self.0 & rhs.0)
    }
}

impl Not for CastlingRights {
    type Output = CastlingRights;

    #[inline]
    fn not(self) -> Self {
        CastlingRights(!self.0 & 0xF)
    }
}

impl BitOrAssign for CastlingRights {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAndAssign for CastlingRights {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

/// FEN castling field, `-` when empty.
impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (right, c) in [
            (Self::WHITE_OO, 'K'),
            (Self::WHITE_OOO, 'Q'),
            (Self::BLACK_OO, 'k'),
            (Self::BLACK_OOO, 'q'),
        ] {
            if self.intersects(right) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}
