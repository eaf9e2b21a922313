//! Move generation by category.
//!
//! `generate` writes pseudo-legal moves of one category into a caller-owned
//! `MoveList`. `GenType::Legal` additionally filters the list, calling
//! `Position::legal` only for the moves that can actually be illegal: those
//! of pinned pieces, king moves and en passant.

mod kings;
mod pawns;
mod pieces;

use super::state::Position;
use super::types::{Bitboard, Move, MoveKind, MoveList, Piece};

/// Which moves `generate` produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenType {
    /// Captures and queen promotions. Under-promotions that capture.
    Captures,
    /// Non-captures, castling and quiet under-promotions.
    Quiets,
    /// Moves answering a check. Only valid while in check.
    Evasions,
    /// Captures and non-captures. Only valid while not in check.
    NonEvasions,
    /// Fully legal moves.
    Legal,
}

/// Append the moves of `gen_type` for the side to move to `list`.
pub fn generate(pos: &Position, gen_type: GenType, list: &mut MoveList) {
    if gen_type == GenType::Legal {
        generate_legal(pos, list);
        return;
    }
    debug_assert_eq!(gen_type == GenType::Evasions, pos.in_check());

    let us = pos.side_to_move();
    let checkers = pos.checkers();

    // In double check only the king can move
    if gen_type != GenType::Evasions || !checkers.more_than_one() {
        let target = match gen_type {
            GenType::Evasions => pos
                .tables()
                .attacks
                .between(pos.king_square(us), checkers.lsb()),
            GenType::NonEvasions => !pos.colored(us),
            GenType::Captures => pos.colored(!us),
            GenType::Quiets | GenType::Legal => !pos.pieces(),
        };

        pawns::generate_pawn_moves(pos, gen_type, target, list);
        for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
            pieces::generate_piece_moves(pos, piece, target, list);
        }
        kings::generate_king_moves(pos, gen_type, target, list);
    } else {
        kings::generate_king_moves(pos, gen_type, Bitboard::EMPTY, list);
    }
}

fn generate_legal(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let pinned = pos.blockers_for_king(us) & pos.colored(us);
    let ksq = pos.king_square(us);
    let start = list.len();

    let gen_type = if pos.in_check() {
        GenType::Evasions
    } else {
        GenType::NonEvasions
    };
    generate(pos, gen_type, list);

    let mut i = start;
    while i < list.len() {
        let m = list[i];
        let suspect =
            pinned.contains(m.from()) || m.from() == ksq || m.kind() == MoveKind::EnPassant;
        if suspect && !pos.legal(m) {
            list.swap_remove(i);
        } else {
            i += 1;
        }
    }
}

impl Position {
    /// All legal moves in the current position.
    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        let mut list = MoveList::new();
        generate(self, GenType::Legal, &mut list);
        list
    }

    /// True if the side to move is checkmated.
    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.in_check() && self.legal_moves().is_empty()
    }

    /// True if the side to move has no legal move but is not in check.
    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && self.legal_moves().is_empty()
    }
}

/// Count the leaf nodes of the legal move tree `depth` plies deep.
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = pos.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for &m in &moves {
        pos.do_move(m);
        nodes += perft(pos, depth - 1);
        pos.undo_move(m);
    }
    nodes
}

/// Per-move leaf counts at the root, for locating perft mismatches.
pub fn perft_divide(pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    let moves = pos.legal_moves();
    let mut counts = Vec::with_capacity(moves.len());
    for &m in &moves {
        pos.do_move(m);
        let nodes = perft(pos, depth.saturating_sub(1));
        pos.undo_move(m);
        log::trace!("{m}: {nodes}");
        counts.push((m, nodes));
    }
    counts
}
