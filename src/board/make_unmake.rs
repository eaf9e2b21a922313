//! Incremental make/unmake of moves and null moves.

use super::fen::castling_destinations;
use super::state::Position;
use super::types::{pawn_push, Bitboard, Color, ColoredPiece, Move, Piece, Square};

impl Position {
    /// Play a legal move.
    pub fn do_move(&mut self, m: Move) {
        let gives_check = self.gives_check(m);
        self.do_move_with_check(m, gives_check);
    }

    /// Play a legal move when the caller already knows whether it checks.
    ///
    /// Pushes a new state onto the history and updates every key
    /// incrementally. The move must be legal in the current position.
    #[allow(clippy::too_many_lines)] // Every move kind and every key in one pass
    pub fn do_move_with_check(&mut self, m: Move, gives_check: bool) {
        debug_assert!(m.is_ok());
        let tables = self.tables();
        let z = &tables.zobrist;

        let us = self.side_to_move;
        let them = !us;
        let from = m.from();
        let mut to = m.to();
        debug_assert!(self.piece_on(from).is_some(), "do_move {m} from an empty square");
        let Some(pc) = self.piece_on(from) else {
            return;
        };
        debug_assert_eq!(pc.color, us);

        let mut captured = if m.is_en_passant() {
            Some(ColoredPiece::new(them, Piece::Pawn))
        } else {
            self.piece_on(to)
        };

        let mut st = self.st().next();
        let mut k = self.st().key ^ z.side();
        self.game_ply += 1;
        st.rule50 += 1;
        st.plies_from_null += 1;

        if m.is_castling() {
            debug_assert_eq!(pc.piece, Piece::King);
            debug_assert_eq!(captured, Some(ColoredPiece::new(us, Piece::Rook)));

            let rook = ColoredPiece::new(us, Piece::Rook);
            let (kto, rfrom, rto) = self.do_castling(us, from, to, false);
            k ^= z.piece_square(rook, rfrom) ^ z.piece_square(rook, rto);
            st.toggle_structure_keys(z, rook, rfrom);
            st.toggle_structure_keys(z, rook, rto);
            to = kto;
            captured = None;
        }

        if let Some(cap) = captured {
            debug_assert_eq!(cap.color, them);
            debug_assert_ne!(cap.piece, Piece::King);

            let capsq = if m.is_en_passant() {
                let capsq = to.shifted(pawn_push(them));
                debug_assert!(self.is_empty(to));
                debug_assert_eq!(self.piece_on(capsq), Some(cap));
                capsq
            } else {
                to
            };

            if cap.piece != Piece::Pawn {
                st.non_pawn_material[them.index()] -= cap.piece.value();
            }
            self.remove_piece(capsq);

            k ^= z.piece_square(cap, capsq);
            st.toggle_structure_keys(z, cap, capsq);
            st.material_key ^= z.material(cap, self.piece_count[cap.index()] as usize);
            st.rule50 = 0;
        }

        k ^= z.piece_square(pc, from) ^ z.piece_square(pc, to);
        st.toggle_structure_keys(z, pc, from);
        st.toggle_structure_keys(z, pc, to);

        if let Some(ep) = st.ep_square.take() {
            k ^= z.en_passant(ep.file());
        }

        let mask = self.castling_rights_mask[from.index()] | self.castling_rights_mask[to.index()];
        if st.castling_rights.intersects(mask) {
            k ^= z.castling(st.castling_rights);
            st.castling_rights &= !mask;
            k ^= z.castling(st.castling_rights);
        }

        if !m.is_castling() {
            self.move_piece(from, to);
        }

        if pc.piece == Piece::Pawn {
            if from.index() ^ to.index() == 16 {
                // Only record the square if an enemy pawn can take on it
                let ep = from.shifted(pawn_push(us));
                if (tables.attacks.pawn_attacks(us, ep) & self.colored_pieces(them, Piece::Pawn))
                    .any()
                {
                    st.ep_square = Some(ep);
                    k ^= z.en_passant(ep.file());
                }
            } else if m.is_promotion() {
                let promo = ColoredPiece::new(us, m.promotion_piece());
                debug_assert_eq!(to.relative_rank(us), 7);

                self.remove_piece(to);
                self.put_piece(promo, to);

                k ^= z.piece_square(pc, to) ^ z.piece_square(promo, to);
                st.toggle_structure_keys(z, pc, to);
                st.toggle_structure_keys(z, promo, to);
                st.material_key ^= z.material(promo, self.piece_count[promo.index()] as usize - 1)
                    ^ z.material(pc, self.piece_count[pc.index()] as usize);
                st.non_pawn_material[us.index()] += promo.piece.value();
            }
            st.rule50 = 0;
        }

        st.captured_piece = captured;
        st.key = k;
        st.checkers = if gives_check {
            self.attackers_to(self.king_square(them), self.pieces()) & self.colored(us)
        } else {
            Bitboard::EMPTY
        };

        self.history.push(st);
        self.side_to_move = them;
        self.set_check_info();
        self.update_repetition();
    }

    /// Distance to the previous occurrence of the current position within
    /// the reversible part of the history, negated if that occurrence was
    /// itself a repetition.
    fn update_repetition(&mut self) {
        let n = self.history.len() - 1;
        let st = self.st();
        let end = st.rule50.min(st.plies_from_null);
        let key = st.key;

        let mut repetition = 0;
        let mut i = 4;
        while i <= end && i as usize <= n {
            let prev = &self.history[n - i as usize];
            if prev.key == key {
                repetition = if prev.repetition != 0 { -i } else { i };
                break;
            }
            i += 2;
        }
        self.st_mut().repetition = repetition;
    }

    /// Take back `m`, which must be the last move played.
    pub fn undo_move(&mut self, m: Move) {
        debug_assert!(self.history.len() > 1, "undo_move past the root");
        debug_assert!(m.is_ok());

        self.side_to_move = !self.side_to_move;
        let us = self.side_to_move;
        let from = m.from();
        let to = m.to();

        if m.is_promotion() {
            debug_assert_eq!(to.relative_rank(us), 7);
            self.remove_piece(to);
            self.put_piece(ColoredPiece::new(us, Piece::Pawn), to);
        }

        if m.is_castling() {
            self.do_castling(us, from, to, true);
        } else {
            self.move_piece(to, from);
            if let Some(cap) = self.st().captured_piece {
                let capsq = if m.is_en_passant() {
                    to.shifted(pawn_push(!us))
                } else {
                    to
                };
                self.put_piece(cap, capsq);
            }
        }

        self.history.pop();
        self.game_ply -= 1;
    }

    /// Move king and rook for castling, or back when `undo` is set.
    /// `to` is the rook's origin. Returns the king's destination and the
    /// rook's origin and destination.
    fn do_castling(
        &mut self,
        us: Color,
        from: Square,
        to: Square,
        undo: bool,
    ) -> (Square, Square, Square) {
        let king_side = to > from;
        let rfrom = to;
        let (kto, rto) = castling_destinations(us, king_side);
        let king = ColoredPiece::new(us, Piece::King);
        let rook = ColoredPiece::new(us, Piece::Rook);

        // Remove both first: in Chess960 the squares can overlap
        if undo {
            self.remove_piece(kto);
            self.remove_piece(rto);
            self.put_piece(king, from);
            self.put_piece(rook, rfrom);
        } else {
            self.remove_piece(from);
            self.remove_piece(rfrom);
            self.put_piece(king, kto);
            self.put_piece(rook, rto);
        }
        (kto, rfrom, rto)
    }

    /// Pass the turn. Not allowed while in check.
    pub fn do_null_move(&mut self) {
        debug_assert!(!self.in_check());
        let z = &self.tables().zobrist;

        let mut st = self.st().clone();
        if let Some(ep) = st.ep_square.take() {
            st.key ^= z.en_passant(ep.file());
        }
        st.key ^= z.side();
        st.rule50 += 1;
        st.plies_from_null = 0;
        st.captured_piece = None;

        self.history.push(st);
        self.side_to_move = !self.side_to_move;
        self.set_check_info();
        self.st_mut().repetition = 0;
    }

    pub fn undo_null_move(&mut self) {
        debug_assert!(self.history.len() > 1, "undo_null_move past the root");
        debug_assert!(!self.in_check());
        self.history.pop();
        self.side_to_move = !self.side_to_move;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CastlingRights;

    fn play(pos: &mut Position, moves: &[&str]) -> Vec<Move> {
        moves
            .iter()
            .map(|s| pos.do_move_uci(s).unwrap())
            .collect()
    }

    #[test]
    fn test_double_push_sets_ep_only_when_capturable() {
        let mut pos = Position::new();
        play(&mut pos, &["e2e4"]);
        assert_eq!(pos.ep_square(), None);

        let mut pos = Position::try_from_fen("4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1").unwrap();
        play(&mut pos, &["e2e4"]);
        assert_eq!(pos.ep_square(), Some("e3".parse().unwrap()));
    }

    #[test]
    fn test_en_passant_capture_and_undo() {
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2";
        let mut pos = Position::try_from_fen(fen).unwrap();
        let key = pos.raw_key();
        let mv = pos.parse_move("e5d6").unwrap();
        assert!(mv.is_en_passant());

        pos.do_move(mv);
        assert!(pos.is_empty("d5".parse().unwrap()));
        assert_eq!(pos.count(Color::Black, Piece::Pawn), 0);
        assert_eq!(pos.captured_piece(), Some(ColoredPiece::new(Color::Black, Piece::Pawn)));
        assert!(pos.is_consistent());

        pos.undo_move(mv);
        assert_eq!(pos.fen(), fen);
        assert_eq!(pos.raw_key(), key);
    }

    #[test]
    fn test_castling_moves_both_pieces() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let mut pos = Position::try_from_fen(fen).unwrap();
        let mv = pos.parse_move("e1c1").unwrap();
        pos.do_move(mv);
        assert_eq!(
            pos.piece_on(Square::C1),
            Some(ColoredPiece::new(Color::White, Piece::King))
        );
        assert_eq!(
            pos.piece_on(Square::D1),
            Some(ColoredPiece::new(Color::White, Piece::Rook))
        );
        assert!(pos.is_empty(Square::A1));
        assert!(!pos.can_castle(CastlingRights::WHITE));
        assert!(pos.can_castle(CastlingRights::BLACK));
        assert!(pos.is_consistent());

        pos.undo_move(mv);
        assert_eq!(pos.fen(), fen);
    }

    #[test]
    fn test_promotion_updates_material() {
        let fen = "1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1";
        let mut pos = Position::try_from_fen(fen).unwrap();
        let before = pos.non_pawn_material(Color::White);
        let mv = pos.parse_move("a7b8q").unwrap();
        pos.do_move(mv);
        assert_eq!(pos.count(Color::White, Piece::Queen), 1);
        assert_eq!(pos.count(Color::White, Piece::Pawn), 0);
        assert_eq!(pos.count(Color::Black, Piece::Knight), 0);
        assert_eq!(
            pos.non_pawn_material(Color::White),
            before + Piece::Queen.value()
        );
        assert_eq!(pos.non_pawn_material(Color::Black), 0);
        assert!(pos.is_consistent());

        pos.undo_move(mv);
        assert_eq!(pos.fen(), fen);
    }

    #[test]
    fn test_rule50_counter() {
        let mut pos = Position::new();
        play(&mut pos, &["g1f3", "g8f6"]);
        assert_eq!(pos.rule50_count(), 2);
        play(&mut pos, &["e2e4"]);
        assert_eq!(pos.rule50_count(), 0);
        play(&mut pos, &["f6e4"]);
        assert_eq!(pos.rule50_count(), 0);
    }

    #[test]
    fn test_rook_capture_removes_castling_right() {
        let mut pos = Position::try_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        play(&mut pos, &["a1a8"]);
        assert!(!pos.can_castle(CastlingRights::WHITE_OOO));
        assert!(!pos.can_castle(CastlingRights::BLACK_OOO));
        assert!(pos.can_castle(CastlingRights::WHITE_OO));
        assert!(pos.can_castle(CastlingRights::BLACK_OO));
        assert!(pos.is_consistent());
    }

    #[test]
    fn test_null_move_round_trip() {
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        let mut pos = Position::try_from_fen(fen).unwrap();
        let key = pos.raw_key();
        pos.do_null_move();
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.ep_square(), None);
        assert_ne!(pos.raw_key(), key);
        assert!(pos.is_consistent());
        pos.undo_null_move();
        assert_eq!(pos.raw_key(), key);
        assert_eq!(pos.fen(), fen);
    }

    #[test]
    fn test_checkers_after_check() {
        let mut pos = Position::new();
        play(&mut pos, &["e2e4", "f7f6", "d1h5"]);
        assert_eq!(pos.checkers(), Bitboard::from_square("h5".parse().unwrap()));
        assert!(pos.in_check());
    }

    #[test]
    fn test_transposition_gives_same_keys() {
        let mut a = Position::new();
        let mut b = Position::new();
        play(&mut a, &["g1f3", "g8f6", "b1c3"]);
        play(&mut b, &["b1c3", "g8f6", "g1f3"]);
        assert_eq!(a.raw_key(), b.raw_key());
        assert_eq!(a.minor_piece_key(), b.minor_piece_key());
        assert_eq!(a.material_key(), b.material_key());
        assert_eq!(a.pawn_key(), b.pawn_key());
    }
}
