use std::str::FromStr;

use super::error::{FenError, MoveParseError};
use super::state::Position;
use super::tables::Tables;
use super::types::{
    pawn_push, relative_rank, Bitboard, CastlingRights, Color, ColoredPiece, Move, Piece, Square,
};

/// FEN of the standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::from_fen(START_FEN)
    }

    /// Parse a position from FEN notation.
    ///
    /// Returns an error if the FEN string is invalid.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        Self::try_from_fen_with(Tables::global(), fen)
    }

    /// Parse a position bound to a specific table context.
    pub fn try_from_fen_with(tables: &'static Tables, fen: &str) -> Result<Self, FenError> {
        let mut pos = Position::empty(tables);
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        // Piece placement, rank 8 first
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRank { rank: ranks.len() });
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    if file > 8 {
                        return Err(FenError::TooManyFiles {
                            rank: rank_idx,
                            files: file,
                        });
                    }
                    continue;
                }
                let pc = ColoredPiece::from_fen_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                if file >= 8 {
                    return Err(FenError::TooManyFiles {
                        rank: rank_idx,
                        files: file + 1,
                    });
                }
                pos.put_piece(pc, Square::new(file as u8, rank));
                file += 1;
            }
        }

        for color in Color::BOTH {
            let found = pos.count(color, Piece::King);
            if found != 1 {
                return Err(FenError::KingCount { color, found });
            }
        }

        pos.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        // The side that just moved cannot have left its king attacked
        let them = !pos.side_to_move;
        if pos.attackers_to_exist(pos.king_square(them), pos.pieces(), pos.side_to_move) {
            return Err(FenError::OpponentInCheck { color: them });
        }

        // Castling: KQkq, or the rook's file for Shredder-style FENs
        for c in parts[2].chars() {
            if c == '-' {
                continue;
            }
            let color = if c.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            let back_rank = relative_rank(color, 0);
            let king_file = pos.king_square(color).file();
            let rook = Some(ColoredPiece::new(color, Piece::Rook));
            // K and Q name the outermost rook on that side of the king
            let rfrom = match c.to_ascii_uppercase() {
                'K' => (king_file + 1..8)
                    .rev()
                    .map(|f| Square::new(f, back_rank))
                    .find(|&sq| pos.piece_on(sq) == rook),
                'Q' => (0..king_file)
                    .map(|f| Square::new(f, back_rank))
                    .find(|&sq| pos.piece_on(sq) == rook),
                f @ 'A'..='H' => Some(Square::new(f as u8 - b'A', back_rank)),
                _ => return Err(FenError::InvalidCastling { char: c }),
            };

            match rfrom {
                Some(rsq)
                    if pos.piece_on(rsq) == rook
                        && pos.king_square(color).relative_rank(color) == 0 =>
                {
                    pos.set_castling_right(color, rsq);
                }
                _ => log::warn!("ignoring castling right '{c}' without king and rook in place"),
            }
        }

        // En passant: kept only if a capture is actually possible
        let ep = match parts[3] {
            "-" => None,
            s => Some(s.parse::<Square>().map_err(|_| FenError::InvalidEnPassant {
                found: s.to_string(),
            })?),
        };
        let ep = ep.filter(|&sq| pos.ep_capturable(sq));
        pos.st_mut().ep_square = ep;

        let rule50 = match parts.get(4) {
            Some(s) => s.parse::<u32>().map_err(|_| FenError::InvalidCounter {
                found: (*s).to_string(),
            })?,
            None => 0,
        };
        let fullmove = match parts.get(5) {
            Some(s) => s.parse::<u32>().map_err(|_| FenError::InvalidCounter {
                found: (*s).to_string(),
            })?,
            None => 1,
        };
        pos.st_mut().rule50 = rule50 as i32;
        pos.game_ply = (2 * (fullmove as i32 - 1)).max(0)
            + i32::from(pos.side_to_move == Color::Black);

        pos.set_state();
        debug_assert!(pos.is_consistent());
        Ok(pos)
    }

    /// Parse a position from FEN notation.
    ///
    /// # Panics
    /// Panics if the FEN string is invalid. Use `try_from_fen` for fallible parsing.
    #[must_use]
    pub fn from_fen(fen: &str) -> Self {
        Self::try_from_fen(fen).expect("Invalid FEN string")
    }

    /// Replace this position with the one described by `fen`, keeping the
    /// table context. On error the position is left unchanged.
    pub fn set(&mut self, fen: &str) -> Result<(), FenError> {
        *self = Self::try_from_fen_with(self.tables, fen)?;
        Ok(())
    }

    /// True if the side to move could capture en passant on `ep`: the square
    /// is on the sixth rank, one of our pawns attacks it, the enemy pawn
    /// that just double-stepped is in front of it, and both `ep` and the
    /// square the pawn came from are empty.
    fn ep_capturable(&self, ep: Square) -> bool {
        let us = self.side_to_move;
        let them = !us;
        ep.relative_rank(us) == 5
            && (self.tables().attacks.pawn_attacks(them, ep) & self.colored_pieces(us, Piece::Pawn))
                .any()
            && self
                .colored_pieces(them, Piece::Pawn)
                .contains(ep.shifted(pawn_push(them)))
            && (self.pieces() & (Bitboard::from_square(ep) | ep.shifted(pawn_push(us)))).is_empty()
    }

    /// Register the castling right of `color` with the rook on `rfrom`.
    pub(super) fn set_castling_right(&mut self, color: Color, rfrom: Square) {
        let kfrom = self.king_square(color);
        let king_side = kfrom < rfrom;
        let cr = CastlingRights::single(color, king_side);

        self.st_mut().castling_rights |= cr;
        self.castling_rights_mask[kfrom.index()] |= cr;
        self.castling_rights_mask[rfrom.index()] |= cr;
        self.castling_rook_square[cr.index()] = Some(rfrom);

        let (kto, rto) = castling_destinations(color, king_side);
        let a = &self.tables().attacks;
        self.castling_path[cr.index()] = (a.between(rfrom, rto) | a.between(kfrom, kto))
            & !(Bitboard::from_square(kfrom) | rfrom);
    }

    /// Convert the position to FEN notation.
    #[must_use]
    pub fn fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_on(Square::new(file, rank)) {
                    Some(pc) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(pc.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push_str(if self.side_to_move == Color::White {
            " w "
        } else {
            " b "
        });

        let mut castling = String::new();
        for (cr, std_char, outer_file) in [
            (CastlingRights::WHITE_OO, 'K', 7),
            (CastlingRights::WHITE_OOO, 'Q', 0),
            (CastlingRights::BLACK_OO, 'k', 7),
            (CastlingRights::BLACK_OOO, 'q', 0),
        ] {
            if !self.can_castle(cr) {
                continue;
            }
            match self.castling_rook_square(cr) {
                Some(rsq) if rsq.file() != outer_file => {
                    let letter = (b'a' + rsq.file()) as char;
                    castling.push(if std_char.is_ascii_uppercase() {
                        letter.to_ascii_uppercase()
                    } else {
                        letter
                    });
                }
                _ => castling.push(std_char),
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }
        fen.push_str(&castling);

        let ep = self.ep_square().map_or_else(|| "-".to_string(), |sq| sq.to_string());
        let fullmove = 1 + (self.game_ply - i32::from(self.side_to_move == Color::Black)) / 2;
        fen.push_str(&format!(" {} {} {}", ep, self.st().rule50, fullmove));
        fen
    }

    /// Parse a move in long algebraic notation (e.g. "e2e4", "e7e8q").
    /// Castling is written as the king's destination, "0000" is the null move.
    ///
    /// Returns the matching legal move, or an error describing why parsing failed.
    ///
    /// # Example
    /// ```
    /// use chess_core::board::Position;
    ///
    /// let pos = Position::new();
    /// let mv = pos.parse_move("e2e4").unwrap();
    /// assert_eq!(mv.to_string(), "e2e4");
    /// ```
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveParseError> {
        if text == "0000" {
            return Ok(Move::NULL);
        }
        if text.len() < 4 || text.len() > 5 || !text.is_ascii() {
            return Err(MoveParseError::InvalidLength { len: text.len() });
        }

        if text[0..2].parse::<Square>().is_err() || text[2..4].parse::<Square>().is_err() {
            return Err(MoveParseError::InvalidSquare {
                notation: text.to_string(),
            });
        }

        let mut wanted = text[0..4].to_string();
        if let Some(c) = text[4..].chars().next() {
            match Piece::from_char(c) {
                Some(Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen) => {
                    wanted.push(c.to_ascii_lowercase());
                }
                _ => return Err(MoveParseError::InvalidPromotion { char: c }),
            }
        }

        self.legal_moves()
            .into_iter()
            .find(|m| m.to_string() == wanted)
            .ok_or(MoveParseError::IllegalMove {
                notation: text.to_string(),
            })
    }

    /// Parse a move and play it in one call.
    ///
    /// # Example
    /// ```
    /// use chess_core::board::Position;
    ///
    /// let mut pos = Position::new();
    /// pos.do_move_uci("e2e4").unwrap();
    /// pos.do_move_uci("e7e5").unwrap();
    /// ```
    pub fn do_move_uci(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_move(text)?;
        if mv == Move::NULL {
            self.do_null_move();
        } else {
            self.do_move(mv);
        }
        Ok(mv)
    }
}

/// King and rook destinations for castling on the given wing
pub(crate) fn castling_destinations(color: Color, king_side: bool) -> (Square, Square) {
    if king_side {
        (Square::G1.relative(color), Square::F1.relative(color))
    } else {
        (Square::C1.relative(color), Square::D1.relative(color))
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::try_from_fen(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_fen_round_trip() {
        for fen in [
            START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/8/8/8/8/8/8/R3K2R b Kq - 17 42",
        ] {
            let pos = Position::try_from_fen(fen).unwrap();
            assert_eq!(pos.fen(), fen);
        }
    }

    #[test]
    fn test_fen_black_to_move() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let pos = Position::try_from_fen(fen).unwrap();
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.game_ply(), 1);
    }

    #[test]
    fn test_uncapturable_ep_square_is_dropped() {
        // No black pawn can take on e3
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let pos = Position::try_from_fen(fen).unwrap();
        assert_eq!(pos.ep_square(), None);
        assert!(pos.fen().contains(" KQkq - "));
    }

    #[test]
    fn test_capturable_ep_square_is_kept() {
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        let pos = Position::try_from_fen(fen).unwrap();
        assert_eq!(pos.ep_square(), Some(sq("f6")));
    }

    #[test]
    fn test_fen_error_too_few_parts() {
        let result = Position::try_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w");
        assert!(matches!(result, Err(FenError::TooFewParts { .. })));
    }

    #[test]
    fn test_fen_error_invalid_piece() {
        let result =
            Position::try_from_fen("rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert!(matches!(result, Err(FenError::InvalidPiece { char: 'x' })));
    }

    #[test]
    fn test_fen_error_invalid_side_to_move() {
        let result =
            Position::try_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1");
        assert!(matches!(result, Err(FenError::InvalidSideToMove { .. })));
    }

    #[test]
    fn test_fen_error_invalid_castling() {
        let result =
            Position::try_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w XQkq - 0 1");
        assert!(matches!(result, Err(FenError::InvalidCastling { char: 'X' })));
    }

    #[test]
    fn test_fen_error_invalid_en_passant() {
        let result =
            Position::try_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1");
        assert!(matches!(result, Err(FenError::InvalidEnPassant { .. })));
    }

    #[test]
    fn test_fen_error_ranks_and_files() {
        let result = Position::try_from_fen("8/8/8/8/8/8/8 w - - 0 1");
        assert!(matches!(result, Err(FenError::InvalidRank { rank: 7 })));
        let result = Position::try_from_fen("k8/8/8/8/8/8/8/7K w - - 0 1");
        assert!(matches!(result, Err(FenError::TooManyFiles { rank: 0, .. })));
    }

    #[test]
    fn test_fen_error_king_count() {
        let result = Position::try_from_fen("8/8/8/8/8/8/8/K6K w - - 0 1");
        assert!(matches!(
            result,
            Err(FenError::KingCount {
                color: Color::White,
                found: 2
            })
        ));
        let result = Position::try_from_fen("8/8/8/8/8/8/8/K7 w - - 0 1");
        assert!(matches!(
            result,
            Err(FenError::KingCount {
                color: Color::Black,
                found: 0
            })
        ));
    }

    #[test]
    fn test_fen_error_side_not_to_move_in_check() {
        // White to move could take the black king on a8
        let result = Position::try_from_fen("k7/8/8/8/8/8/8/R6K w - - 0 1");
        assert!(matches!(
            result,
            Err(FenError::OpponentInCheck {
                color: Color::Black
            })
        ));

        // The same placement is fine with black to move
        let pos = Position::try_from_fen("k7/8/8/8/8/8/8/R6K b - - 0 1").unwrap();
        assert!(pos.in_check());

        let mut pos = Position::new();
        assert!(pos.set("k7/8/8/8/8/8/8/R6K w - - 0 1").is_err());
        assert_eq!(pos.fen(), START_FEN);
    }

    #[test]
    fn test_fen_error_counters() {
        let result = Position::try_from_fen("k7/8/8/8/8/8/8/7K w - - x 1");
        assert!(matches!(result, Err(FenError::InvalidCounter { .. })));
    }

    #[test]
    fn test_fen_no_castling() {
        let pos = Position::try_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1")
            .unwrap();
        assert_eq!(pos.castling_rights(), CastlingRights::NONE);
    }

    #[test]
    fn test_fen_partial_castling() {
        let pos = Position::try_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w Kq - 0 1")
            .unwrap();
        assert!(pos.can_castle(CastlingRights::WHITE_OO));
        assert!(!pos.can_castle(CastlingRights::WHITE_OOO));
        assert!(!pos.can_castle(CastlingRights::BLACK_OO));
        assert!(pos.can_castle(CastlingRights::BLACK_OOO));
    }

    #[test]
    fn test_castling_right_without_rook_is_ignored() {
        let pos = Position::try_from_fen("4k3/8/8/8/8/8/8/4K2R w KQ - 0 1").unwrap();
        assert_eq!(pos.castling_rights(), CastlingRights::WHITE_OO);
        let pos = Position::try_from_fen("4k3/8/8/8/8/8/4K3/R6R w KQ - 0 1").unwrap();
        assert_eq!(pos.castling_rights(), CastlingRights::NONE);
    }

    #[test]
    fn test_castling_rook_squares_and_paths() {
        let pos = Position::new();
        assert_eq!(pos.castling_rook_square(CastlingRights::WHITE_OO), Some(Square::H1));
        assert_eq!(pos.castling_rook_square(CastlingRights::BLACK_OOO), Some(Square::A8));
        assert!(pos.castling_impeded(CastlingRights::WHITE_OO));
        assert_eq!(
            pos.castling_path[CastlingRights::WHITE_OOO.index()],
            Bitboard::from_square(Square::B1) | Square::C1 | Square::D1
        );

        let pos = Position::try_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(!pos.castling_impeded(CastlingRights::WHITE_OO));
        assert!(!pos.castling_impeded(CastlingRights::BLACK_OOO));
    }

    #[test]
    fn test_shredder_castling_letters() {
        let fen = "1r2k1r1/8/8/8/8/8/8/1R2K1R1 w GBgb - 0 1";
        let pos = Position::try_from_fen(fen).unwrap();
        assert_eq!(pos.castling_rights(), CastlingRights::ANY);
        assert_eq!(pos.castling_rook_square(CastlingRights::WHITE_OO), Some(sq("g1")));
        assert_eq!(pos.castling_rook_square(CastlingRights::BLACK_OOO), Some(sq("b8")));
        assert_eq!(pos.fen(), fen);
    }

    #[test]
    fn test_game_ply_from_fullmove() {
        let pos = Position::try_from_fen("k7/8/8/8/8/8/8/7K b - - 0 10").unwrap();
        assert_eq!(pos.game_ply(), 19);
        let pos = Position::try_from_fen("k7/8/8/8/8/8/8/7K w - - 0 0").unwrap();
        assert_eq!(pos.game_ply(), 0);
    }

    #[test]
    fn test_halfmove_clock_parsing() {
        let pos = Position::try_from_fen("8/8/8/8/8/8/8/K1k5 w - - 42 1").unwrap();
        assert_eq!(pos.rule50_count(), 42);
    }

    #[test]
    fn test_set_failure_leaves_position() {
        let mut pos = Position::new();
        let before = pos.fen();
        assert!(pos.set("not a fen").is_err());
        assert_eq!(pos.fen(), before);
        pos.set("k7/8/8/8/8/8/8/7K w - - 0 1").unwrap();
        assert_eq!(pos.count(Color::White, Piece::Pawn), 0);
    }

    #[test]
    fn test_parse_move_e2e4() {
        let pos = Position::new();
        let mv = pos.parse_move("e2e4").unwrap();
        assert_eq!(mv.from(), sq("e2"));
        assert_eq!(mv.to(), sq("e4"));
    }

    #[test]
    fn test_parse_move_promotion() {
        let pos = Position::try_from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1").unwrap();
        let mv = pos.parse_move("a7a8q").unwrap();
        assert!(mv.is_promotion());
        assert_eq!(mv.promotion_piece(), Piece::Queen);
        let mv = pos.parse_move("a7a8N").unwrap();
        assert_eq!(mv.promotion_piece(), Piece::Knight);
    }

    #[test]
    fn test_parse_move_castling_uses_king_destination() {
        let pos = Position::try_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = pos.parse_move("e1g1").unwrap();
        assert!(mv.is_castling());
        assert_eq!(mv.to(), Square::H1);
        assert!(pos.parse_move("e1h1").is_err());
    }

    #[test]
    fn test_parse_null_move() {
        assert_eq!(Position::new().parse_move("0000"), Ok(Move::NULL));
    }

    #[test]
    fn test_parse_move_errors() {
        let pos = Position::new();
        assert!(matches!(
            pos.parse_move("e2"),
            Err(MoveParseError::InvalidLength { .. })
        ));
        assert!(matches!(
            pos.parse_move("z9z9"),
            Err(MoveParseError::InvalidSquare { .. })
        ));
        assert!(matches!(
            pos.parse_move("e2e5"),
            Err(MoveParseError::IllegalMove { .. })
        ));
        assert!(matches!(
            pos.parse_move("e2e4k"),
            Err(MoveParseError::InvalidPromotion { char: 'k' })
        ));
    }

    #[test]
    fn test_from_str_trait() {
        let pos: Position = START_FEN.parse().unwrap();
        assert_eq!(pos.side_to_move(), Color::White);
    }

    #[test]
    fn test_do_move_uci() {
        let mut pos = Position::new();
        pos.do_move_uci("e2e4").unwrap();
        assert_eq!(pos.side_to_move(), Color::Black);
        pos.do_move_uci("0000").unwrap();
        assert_eq!(pos.side_to_move(), Color::White);
    }
}
