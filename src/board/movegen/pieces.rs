use super::super::state::Position;
use super::super::types::{Bitboard, Move, MoveList, Piece};

/// Knight and slider moves of the side to move landing on `target`.
pub(super) fn generate_piece_moves(
    pos: &Position,
    piece: Piece,
    target: Bitboard,
    list: &mut MoveList,
) {
    debug_assert!(piece != Piece::Pawn && piece != Piece::King);
    let a = &pos.tables().attacks;
    let occupied = pos.pieces();

    for from in pos.colored_pieces(pos.side_to_move(), piece) {
        for to in a.attacks(piece, from, occupied) & target {
            list.push(Move::new(from, to));
        }
    }
}
