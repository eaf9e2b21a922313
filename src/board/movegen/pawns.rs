use super::super::state::Position;
use super::super::types::{
    pawn_push, relative_rank, Bitboard, Color, Direction, Move, MoveList, Piece, Square,
};
use super::GenType;

/// Square a pawn came from when it arrived on `to` travelling in `dir`.
#[inline]
fn origin(dir: Direction, to: Square) -> Square {
    to.shifted(Direction(-dir.0))
}

/// Queen promotions go with captures. Under-promotions follow the move
/// itself: captures with captures, pushes with quiets.
fn make_promotions(
    list: &mut MoveList,
    gen_type: GenType,
    from: Square,
    to: Square,
    capture: bool,
) {
    let all = matches!(gen_type, GenType::Evasions | GenType::NonEvasions);

    if gen_type == GenType::Captures || all {
        list.push(Move::promotion(from, to, Piece::Queen));
    }

    if (gen_type == GenType::Captures && capture)
        || (gen_type == GenType::Quiets && !capture)
        || all
    {
        for piece in [Piece::Rook, Piece::Bishop, Piece::Knight] {
            list.push(Move::promotion(from, to, piece));
        }
    }
}

pub(super) fn generate_pawn_moves(
    pos: &Position,
    gen_type: GenType,
    target: Bitboard,
    list: &mut MoveList,
) {
    let us = pos.side_to_move();
    let them = !us;
    let up = pawn_push(us);
    let (up_right, up_left) = match us {
        Color::White => (Direction::NORTH_EAST, Direction::NORTH_WEST),
        Color::Black => (Direction::SOUTH_WEST, Direction::SOUTH_EAST),
    };
    let rank7 = Bitboard::rank_mask(relative_rank(us, 6));
    let rank3 = Bitboard::rank_mask(relative_rank(us, 2));

    let empty = !pos.pieces();
    // In check only the checker is worth capturing
    let enemies = if gen_type == GenType::Evasions {
        pos.checkers()
    } else {
        pos.colored(them)
    };

    let pawns = pos.colored_pieces(us, Piece::Pawn);
    let on7 = pawns & rank7;
    let not_on7 = pawns & !rank7;

    if gen_type != GenType::Captures {
        let mut single = not_on7.shift(up) & empty;
        let mut double = (single & rank3).shift(up) & empty;

        if gen_type == GenType::Evasions {
            single &= target;
            double &= target;
        }

        for to in single {
            list.push(Move::new(origin(up, to), to));
        }
        for to in double {
            list.push(Move::new(origin(up, origin(up, to)), to));
        }
    }

    if on7.any() {
        let right = on7.shift(up_right) & enemies;
        let left = on7.shift(up_left) & enemies;
        let mut push = on7.shift(up) & empty;

        if gen_type == GenType::Evasions {
            push &= target;
        }

        for to in right {
            make_promotions(list, gen_type, origin(up_right, to), to, true);
        }
        for to in left {
            make_promotions(list, gen_type, origin(up_left, to), to, true);
        }
        for to in push {
            make_promotions(list, gen_type, origin(up, to), to, false);
        }
    }

    if gen_type == GenType::Quiets {
        return;
    }

    for to in not_on7.shift(up_right) & enemies {
        list.push(Move::new(origin(up_right, to), to));
    }
    for to in not_on7.shift(up_left) & enemies {
        list.push(Move::new(origin(up_left, to), to));
    }

    if let Some(ep) = pos.ep_square() {
        debug_assert_eq!(ep.rank(), relative_rank(us, 5));

        // En passant resolves a check only by taking the pawn that gave it
        if gen_type == GenType::Evasions && !target.contains(origin(up, ep)) {
            return;
        }

        let attackers = not_on7 & pos.tables().attacks.pawn_attacks(them, ep);
        debug_assert!(attackers.any());
        for from in attackers {
            list.push(Move::en_passant(from, ep));
        }
    }
}
