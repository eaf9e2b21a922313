//! Debug helpers: invariant checking, color flipping and a printable board.

use std::fmt;

use super::state::Position;
use super::types::{Bitboard, CastlingRights, Color, ColoredPiece, Piece, Square};

impl Position {
    /// Verify the internal invariants of the position: one king per side,
    /// bitboards and the square array agreeing, piece counts, the side not
    /// to move out of check, and every incrementally kept key and material
    /// sum matching a from-scratch recomputation.
    ///
    /// Meant for `debug_assert!` and tests. The first failing check is
    /// logged at debug level.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let fail = |what: &str| {
            log::debug!("inconsistent position {}: {what}", self.fen());
            false
        };

        for color in Color::BOTH {
            if self.count(color, Piece::King) != 1 {
                return fail("king count");
            }
        }

        if (self.colored(Color::White) & self.colored(Color::Black)).any() {
            return fail("color bitboards overlap");
        }
        if self.colored(Color::White) | self.colored(Color::Black) != self.pieces() {
            return fail("color and type bitboards disagree");
        }

        for (i, &p1) in Piece::ALL.iter().enumerate() {
            for &p2 in &Piece::ALL[i + 1..] {
                if (self.pieces_of(p1) & self.pieces_of(p2)).any() {
                    return fail("type bitboards overlap");
                }
            }
        }

        for sq in Square::all() {
            let on_board = self.piece_on(sq);
            let in_bitboards = Color::BOTH.iter().find_map(|&color| {
                Piece::ALL
                    .iter()
                    .find(|&&piece| self.colored_pieces(color, piece).contains(sq))
                    .map(|&piece| ColoredPiece::new(color, piece))
            });
            if on_board != in_bitboards {
                return fail("square array and bitboards disagree");
            }
        }

        for color in Color::BOTH {
            for piece in Piece::ALL {
                let pc = ColoredPiece::new(color, piece);
                if u32::from(self.piece_count[pc.index()])
                    != self.colored_pieces(color, piece).popcount()
                {
                    return fail("piece count");
                }
            }
        }

        let them = !self.side_to_move;
        if self.attackers_to_exist(self.king_square(them), self.pieces(), self.side_to_move) {
            return fail("side not to move is in check");
        }

        if let Some(ep) = self.ep_square() {
            if ep.relative_rank(self.side_to_move) != 5 {
                return fail("en passant square on the wrong rank");
            }
        }

        for color in Color::BOTH {
            for king_side in [true, false] {
                let cr = CastlingRights::single(color, king_side);
                if !self.can_castle(cr) {
                    continue;
                }
                let Some(rsq) = self.castling_rook_square(cr) else {
                    return fail("castling right without a rook square");
                };
                if self.piece_on(rsq) != Some(ColoredPiece::new(color, Piece::Rook))
                    || self.castling_rights_mask[rsq.index()] != cr
                    || (self.castling_rights_mask[self.king_square(color).index()] & cr) != cr
                {
                    return fail("castling rights");
                }
            }
        }

        let mut fresh = self.clone();
        fresh.set_state();
        let (kept, recomputed) = (self.st(), fresh.st());
        if kept.key != recomputed.key {
            return fail("zobrist key");
        }
        if kept.pawn_key != recomputed.pawn_key {
            return fail("pawn key");
        }
        if kept.material_key != recomputed.material_key {
            return fail("material key");
        }
        if kept.minor_piece_key != recomputed.minor_piece_key
            || kept.major_piece_key != recomputed.major_piece_key
            || kept.non_pawn_key != recomputed.non_pawn_key
        {
            return fail("structure keys");
        }
        if kept.non_pawn_material != recomputed.non_pawn_material {
            return fail("non-pawn material");
        }
        if kept.checkers != recomputed.checkers {
            return fail("checkers");
        }

        true
    }

    /// Mirror the position: colors swap and ranks reverse, so white pieces
    /// on the first rank become black pieces on the eighth. Evaluation
    /// symmetry tests rely on this. The undo history is discarded.
    pub fn flip(&mut self) {
        let mut flipped = Position::empty(self.tables);

        for sq in self.pieces() {
            if let Some(pc) = self.piece_on(sq) {
                flipped.put_piece(ColoredPiece::new(!pc.color, pc.piece), sq.flip_vertical());
            }
        }
        flipped.side_to_move = !self.side_to_move;

        for color in Color::BOTH {
            for king_side in [true, false] {
                let cr = CastlingRights::single(color, king_side);
                if let (true, Some(rsq)) = (self.can_castle(cr), self.castling_rook_square(cr)) {
                    flipped.set_castling_right(!color, rsq.flip_vertical());
                }
            }
        }

        let fullmove = 1 + (self.game_ply - i32::from(self.side_to_move == Color::Black)) / 2;
        flipped.game_ply =
            2 * (fullmove - 1) + i32::from(flipped.side_to_move == Color::Black);

        let st = flipped.st_mut();
        st.ep_square = self.ep_square().map(Square::flip_vertical);
        st.rule50 = self.rule50_count();

        flipped.set_state();
        debug_assert!(flipped.is_consistent());
        *self = flipped;
    }
}

/// ASCII board diagram, rank 8 at the top, followed by the FEN, the key and
/// any checking pieces.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SEPARATOR: &str = " +---+---+---+---+---+---+---+---+";

        writeln!(f, "{SEPARATOR}")?;
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                let c = self
                    .piece_on(Square::new(file, rank))
                    .map_or(' ', ColoredPiece::to_fen_char);
                write!(f, " | {c}")?;
            }
            writeln!(f, " | {}", rank + 1)?;
            writeln!(f, "{SEPARATOR}")?;
        }
        writeln!(f, "   a   b   c   d   e   f   g   h")?;
        writeln!(f)?;
        writeln!(f, "Fen: {}", self.fen())?;
        writeln!(f, "Key: {:016X}", self.key())?;

        write!(f, "Checkers:")?;
        for sq in self.checkers() {
            write!(f, " {sq}")?;
        }
        Ok(())
    }
}

/// Render a bitboard as an 8x8 grid of `1` and `.`.
#[must_use]
pub fn pretty(bb: Bitboard) -> String {
    let mut s = String::with_capacity(8 * 18);
    for rank in (0..8u8).rev() {
        for file in 0..8u8 {
            s.push(if bb.contains(Square::new(file, rank)) {
                '1'
            } else {
                '.'
            });
            if file < 7 {
                s.push(' ');
            }
        }
        s.push('\n');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::START_FEN;

    #[test]
    fn test_start_position_is_consistent() {
        assert!(Position::new().is_consistent());
    }

    #[test]
    fn test_corrupted_key_is_detected() {
        let mut pos = Position::new();
        pos.st_mut().key ^= 1;
        assert!(!pos.is_consistent());
    }

    #[test]
    fn test_flip_mirrors_colors() {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        );
        pos.flip();
        assert_eq!(
            pos.fen(),
            "r3k2r/pppbbppp/2n2q1P/1P2p3/3pn3/BN2PNP1/P1PPQPB1/R3K2R b KQkq - 0 1"
        );
        assert!(pos.is_consistent());

        pos.flip();
        assert_eq!(
            pos.fen(),
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        );
    }

    #[test]
    fn test_flip_keeps_en_passant() {
        let mut pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3");
        pos.flip();
        assert_eq!(pos.fen(), "4k3/8/8/8/3Pp3/8/8/4K3 b - d3 0 3");
    }

    #[test]
    fn test_display_shows_board_and_fen() {
        let text = Position::new().to_string();
        assert!(text.contains(" | r | n | b | q | k | b | n | r | 8"));
        assert!(text.contains(" | R | N | B | Q | K | B | N | R | 1"));
        assert!(text.contains(&format!("Fen: {START_FEN}")));
        assert!(text.ends_with("Checkers:"));
    }

    #[test]
    fn test_pretty_bitboard() {
        let grid = pretty(Bitboard::RANK_1);
        assert!(grid.ends_with("1 1 1 1 1 1 1 1\n"));
        assert!(grid.starts_with(". . . . . . . .\n"));
    }
}
