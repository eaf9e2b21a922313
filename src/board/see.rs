//! Static exchange evaluation.

use super::state::Position;
use super::types::{Bitboard, Move, MoveKind, Piece};

impl Position {
    /// True if the static exchange on the destination of `m` gains at least
    /// `threshold` for the side to move.
    ///
    /// The exchange is simulated on a scratch occupancy: each side recaptures
    /// with its least valuable attacker, sliders behind a departing piece
    /// join in, and pinned pieces may not recapture while their pinner is
    /// still on the board. Castling, promotions and en passant count as 0.
    #[must_use]
    pub fn see_ge(&self, m: Move, threshold: i32) -> bool {
        debug_assert!(m.is_ok());
        if m.kind() != MoveKind::Normal {
            return 0 >= threshold;
        }

        let a = &self.tables().attacks;
        let from = m.from();
        let to = m.to();
        let value_on = |sq| self.piece_on(sq).map_or(0, |pc| pc.piece.value());

        let mut swap = value_on(to) - threshold;
        if swap < 0 {
            return false;
        }

        swap = value_on(from) - swap;
        if swap <= 0 {
            return true;
        }

        debug_assert_eq!(self.moved_piece(m).map(|pc| pc.color), Some(self.side_to_move));
        let bishops_queens = self.pieces_of(Piece::Bishop) | self.pieces_of(Piece::Queen);
        let rooks_queens = self.pieces_of(Piece::Rook) | self.pieces_of(Piece::Queen);

        let mut occupied = self.pieces() ^ from ^ to;
        let mut stm = self.side_to_move;
        let mut attackers = self.attackers_to(to, occupied);
        let mut res = 1;

        loop {
            stm = !stm;
            attackers &= occupied;

            let mut stm_attackers = attackers & self.colored(stm);
            if stm_attackers.is_empty() {
                break;
            }

            if (self.pinners(!stm) & occupied).any() {
                stm_attackers &= !self.blockers_for_king(stm);
                if stm_attackers.is_empty() {
                    break;
                }
            }

            res ^= 1;

            // Capture with the least valuable attacker, then add any slider
            // that was behind it
            let Some(piece) = [
                Piece::Pawn,
                Piece::Knight,
                Piece::Bishop,
                Piece::Rook,
                Piece::Queen,
            ]
            .into_iter()
            .find(|&p| (stm_attackers & self.pieces_of(p)).any()) else {
                // Only the king is left. It may take only if nothing recaptures.
                return if (attackers & !self.colored(stm)).any() {
                    res ^ 1 == 1
                } else {
                    res == 1
                };
            };

            swap = piece.value() - swap;
            if swap < res {
                break;
            }
            occupied ^= Bitboard::from_square((stm_attackers & self.pieces_of(piece)).lsb());

            match piece {
                Piece::Pawn | Piece::Bishop => {
                    attackers |= a.bishop_attacks(to, occupied) & bishops_queens;
                }
                Piece::Rook => attackers |= a.rook_attacks(to, occupied) & rooks_queens,
                Piece::Queen => {
                    attackers |= (a.bishop_attacks(to, occupied) & bishops_queens)
                        | (a.rook_attacks(to, occupied) & rooks_queens);
                }
                Piece::Knight | Piece::King => {}
            }
        }

        res == 1
    }
}
