//! Legality tests: `legal` for generated moves, `pseudo_legal` for moves
//! of unknown origin (transposition table hits), and `gives_check`.

use super::fen::castling_destinations;
use super::movegen::{generate, GenType};
use super::state::Position;
use super::types::{pawn_push, Bitboard, Direction, Move, MoveKind, MoveList, Piece, Square};

impl Position {
    /// True if the pseudo-legal move `m` does not leave our king in check.
    #[must_use]
    pub fn legal(&self, m: Move) -> bool {
        debug_assert!(m.is_ok());
        let a = &self.tables().attacks;
        let us = self.side_to_move;
        let them = !us;
        let from = m.from();
        let to = m.to();

        debug_assert_eq!(self.moved_piece(m).map(|pc| pc.color), Some(us));

        match m.kind() {
            MoveKind::EnPassant => {
                // Both pawns leave the capture rank at once, which can open
                // a line to the king that no pin covers.
                let ksq = self.king_square(us);
                let capsq = to.shifted(pawn_push(them));
                let occupied = (self.pieces() ^ from ^ capsq) | to;
                let queens = self.colored_pieces(them, Piece::Queen);

                (a.rook_attacks(ksq, occupied)
                    & (self.colored_pieces(them, Piece::Rook) | queens))
                    .is_empty()
                    && (a.bishop_attacks(ksq, occupied)
                        & (self.colored_pieces(them, Piece::Bishop) | queens))
                        .is_empty()
            }
            MoveKind::Castling => {
                let king_side = to > from;
                let (kto, _) = castling_destinations(us, king_side);
                // Walk from the king's destination back to its origin
                let step = if kto > from {
                    Direction::WEST
                } else {
                    Direction::EAST
                };
                let mut s = kto;
                while s != from {
                    if self.attackers_to_exist(s, self.pieces(), them) {
                        return false;
                    }
                    s = s.shifted(step);
                }
                // The castling rook may itself be shielding the king
                !self.blockers_for_king(us).contains(to)
            }
            MoveKind::Normal | MoveKind::Promotion => {
                if self.piece_on(from).map(|pc| pc.piece) == Some(Piece::King) {
                    return !self.attackers_to_exist(to, self.pieces() ^ from, them);
                }
                !self.blockers_for_king(us).contains(from)
                    || a.aligned(from, to, self.king_square(us))
            }
        }
    }

    /// True if `m` could have been generated in this position. Used to
    /// validate moves read from the transposition table, which may come
    /// from another position with a colliding key.
    #[must_use]
    pub fn pseudo_legal(&self, m: Move) -> bool {
        if !m.is_ok() {
            return false;
        }
        let a = &self.tables().attacks;
        let us = self.side_to_move;
        let them = !us;
        let from = m.from();
        let to = m.to();

        // Special moves are rare enough that checking the generator is fine
        if m.kind() != MoveKind::Normal {
            let mut list = MoveList::new();
            let gen = if self.in_check() {
                GenType::Evasions
            } else {
                GenType::NonEvasions
            };
            generate(self, gen, &mut list);
            return list.contains(m);
        }

        // Normal moves carry no promotion bits
        if m.promotion_piece() != Piece::Knight {
            return false;
        }

        let Some(pc) = self.piece_on(from) else {
            return false;
        };
        if pc.color != us || self.colored(us).contains(to) {
            return false;
        }

        if pc.piece == Piece::Pawn {
            // Promotions are never normal moves
            if (Bitboard::RANK_1 | Bitboard::RANK_8).contains(to) {
                return false;
            }
            let push = pawn_push(us);
            let single = from.offset(push);
            let double = single.and_then(|s| s.offset(push));
            let capture = (a.pawn_attacks(us, from) & self.colored(them)).contains(to);
            let single_push = single == Some(to) && self.is_empty(to);
            let double_push = double == Some(to)
                && from.relative_rank(us) == 1
                && self.is_empty(to)
                && single.is_some_and(|s| self.is_empty(s));
            if !capture && !single_push && !double_push {
                return false;
            }
        } else if !a.attacks(pc.piece, from, self.pieces()).contains(to) {
            return false;
        }

        let checkers = self.checkers();
        if checkers.any() {
            if pc.piece != Piece::King {
                // Double check needs a king move; otherwise block or capture
                if checkers.more_than_one() {
                    return false;
                }
                if !a.between(self.king_square(us), checkers.lsb()).contains(to) {
                    return false;
                }
            } else if self.attackers_to_exist(to, self.pieces() ^ from, them) {
                return false;
            }
        }

        true
    }

    /// True if the pseudo-legal move `m` checks the enemy king.
    #[must_use]
    pub fn gives_check(&self, m: Move) -> bool {
        debug_assert!(m.is_ok());
        let a = &self.tables().attacks;
        let us = self.side_to_move;
        let from = m.from();
        let to = m.to();
        let ksq = self.king_square(!us);

        let Some(pc) = self.moved_piece(m) else {
            return false;
        };
        debug_assert_eq!(pc.color, us);

        // Direct check
        if self.check_squares(pc.piece).contains(to) {
            return true;
        }

        // Discovered check
        if self.blockers_for_king(!us).contains(from) {
            return !a.aligned(from, to, ksq) || m.is_castling();
        }

        match m.kind() {
            MoveKind::Normal => false,
            MoveKind::Promotion => a
                .attacks(m.promotion_piece(), to, self.pieces() ^ from)
                .contains(ksq),
            MoveKind::EnPassant => {
                // The only case where a capture discovers a check by
                // removing the captured piece
                let capsq = Square::new(to.file(), from.rank());
                let b = (self.pieces() ^ from ^ capsq) | to;
                let queens = self.colored_pieces(us, Piece::Queen);
                ((a.rook_attacks(ksq, b) & (self.colored_pieces(us, Piece::Rook) | queens))
                    | (a.bishop_attacks(ksq, b)
                        & (self.colored_pieces(us, Piece::Bishop) | queens)))
                    .any()
            }
            MoveKind::Castling => {
                let (_, rto) = castling_destinations(us, to > from);
                self.check_squares(Piece::Rook).contains(rto)
            }
        }
    }
}
