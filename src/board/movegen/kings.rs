use super::super::state::Position;
use super::super::types::{Bitboard, CastlingRights, Move, MoveList, Piece};
use super::GenType;

pub(super) fn generate_king_moves(
    pos: &Position,
    gen_type: GenType,
    target: Bitboard,
    list: &mut MoveList,
) {
    let us = pos.side_to_move();
    let ksq = pos.king_square(us);
    let a = &pos.tables().attacks;

    // In check the king may step anywhere not holding one of our pieces
    let king_target = if gen_type == GenType::Evasions {
        !pos.colored(us)
    } else {
        target
    };
    for to in a.pseudo_attacks(Piece::King, ksq) & king_target {
        list.push(Move::new(ksq, to));
    }

    if !matches!(gen_type, GenType::Quiets | GenType::NonEvasions)
        || !pos.can_castle(CastlingRights::of(us))
    {
        return;
    }

    for king_side in [true, false] {
        let cr = CastlingRights::single(us, king_side);
        if pos.castling_impeded(cr) || !pos.can_castle(cr) {
            continue;
        }
        if let Some(rsq) = pos.castling_rook_square(cr) {
            list.push(Move::castling(ksq, rsq));
        }
    }
}
