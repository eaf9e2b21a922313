//! Board representation: piece placement, the undo history and the data
//! derived from them (keys, checkers, pins).
//!
//! Every query here is O(1) or a handful of table lookups. Mutation goes
//! through `put_piece`, `remove_piece` and `move_piece`, which keep the
//! square array, the bitboards and the piece counts in sync.

use std::fmt;

use super::tables::Tables;
use super::types::{Bitboard, CastlingRights, Color, ColoredPiece, Move, MoveKind, Piece, Square};
use crate::zobrist::{make_key, Zobrist};

/// One entry of the undo history.
///
/// The first group of fields is carried into the next ply by `do_move` and
/// updated incrementally there. The second group is recomputed every ply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateInfo {
    pub(crate) material_key: u64,
    pub(crate) pawn_key: u64,
    pub(crate) minor_piece_key: u64,
    pub(crate) major_piece_key: u64,
    pub(crate) non_pawn_key: [u64; 2],
    pub(crate) non_pawn_material: [i32; 2],
    pub(crate) castling_rights: CastlingRights,
    pub(crate) rule50: i32,
    pub(crate) plies_from_null: i32,
    pub(crate) ep_square: Option<Square>,

    pub(crate) key: u64,
    pub(crate) checkers: Bitboard,
    pub(crate) blockers_for_king: [Bitboard; 2],
    pub(crate) pinners: [Bitboard; 2],
    pub(crate) check_squares: [Bitboard; Piece::COUNT],
    pub(crate) captured_piece: Option<ColoredPiece>,
    pub(crate) repetition: i32,
}

impl StateInfo {
    /// The entry for the next ply: incremental fields copied, derived
    /// fields cleared.
    pub(crate) fn next(&self) -> StateInfo {
        StateInfo {
            material_key: self.material_key,
            pawn_key: self.pawn_key,
            minor_piece_key: self.minor_piece_key,
            major_piece_key: self.major_piece_key,
            non_pawn_key: self.non_pawn_key,
            non_pawn_material: self.non_pawn_material,
            castling_rights: self.castling_rights,
            rule50: self.rule50,
            plies_from_null: self.plies_from_null,
            ep_square: self.ep_square,
            ..StateInfo::default()
        }
    }

    /// Toggle `pc` on `sq` in the pawn, non-pawn, minor and major keys.
    ///
    /// Kings belong to both the minor and the major key so that those keys
    /// still tell king placements apart in pawn-only or minor-only endings.
    pub(crate) fn toggle_structure_keys(&mut self, z: &Zobrist, pc: ColoredPiece, sq: Square) {
        let k = z.piece_square(pc, sq);
        match pc.piece {
            Piece::Pawn => self.pawn_key ^= k,
            Piece::Knight | Piece::Bishop => {
                self.non_pawn_key[pc.color.index()] ^= k;
                self.minor_piece_key ^= k;
            }
            Piece::Rook | Piece::Queen => {
                self.non_pawn_key[pc.color.index()] ^= k;
                self.major_piece_key ^= k;
            }
            Piece::King => {
                self.non_pawn_key[pc.color.index()] ^= k;
                self.minor_piece_key ^= k;
                self.major_piece_key ^= k;
            }
        }
    }
}

/// A chess position together with its undo history.
///
/// Clone is a deep copy: the clone owns its own history and can be moved to
/// another thread.
#[derive(Clone)]
pub struct Position {
    pub(crate) board: [Option<ColoredPiece>; 64],
    pub(crate) by_type: [Bitboard; Piece::COUNT],
    pub(crate) by_color: [Bitboard; 2],
    pub(crate) piece_count: [u8; 12],
    pub(crate) castling_rights_mask: [CastlingRights; 64],
    pub(crate) castling_rook_square: [Option<Square>; CastlingRights::COUNT],
    pub(crate) castling_path: [Bitboard; CastlingRights::COUNT],
    pub(crate) side_to_move: Color,
    pub(crate) game_ply: i32,
    /// Never empty. The last entry is the current state.
    pub(crate) history: Vec<StateInfo>,
    pub(crate) tables: &'static Tables,
}

impl Position {
    /// Empty board bound to `tables`. Callers fill it through `set`.
    pub(crate) fn empty(tables: &'static Tables) -> Self {
        Position {
            board: [None; 64],
            by_type: [Bitboard::EMPTY; Piece::COUNT],
            by_color: [Bitboard::EMPTY; 2],
            piece_count: [0; 12],
            castling_rights_mask: [CastlingRights::NONE; 64],
            castling_rook_square: [None; CastlingRights::COUNT],
            castling_path: [Bitboard::EMPTY; CastlingRights::COUNT],
            side_to_move: Color::White,
            game_ply: 0,
            history: vec![StateInfo::default()],
            tables,
        }
    }

    #[inline]
    pub(crate) fn st(&self) -> &StateInfo {
        &self.history[self.history.len() - 1]
    }

    #[inline]
    pub(crate) fn st_mut(&mut self) -> &mut StateInfo {
        let last = self.history.len() - 1;
        &mut self.history[last]
    }

    /// The shared tables this position reads from
    #[inline]
    #[must_use]
    pub fn tables(&self) -> &'static Tables {
        self.tables
    }

    // ---- placement ----

    /// All occupied squares
    #[inline]
    #[must_use]
    pub fn pieces(&self) -> Bitboard {
        self.by_color[0] | self.by_color[1]
    }

    /// Squares holding `piece` of either color
    #[inline]
    #[must_use]
    pub fn pieces_of(&self, piece: Piece) -> Bitboard {
        self.by_type[piece.index()]
    }

    /// Squares holding any piece of `color`
    #[inline]
    #[must_use]
    pub fn colored(&self, color: Color) -> Bitboard {
        self.by_color[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn colored_pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.by_color[color.index()] & self.by_type[piece.index()]
    }

    #[inline]
    #[must_use]
    pub fn piece_on(&self, sq: Square) -> Option<ColoredPiece> {
        self.board[sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.board[sq.index()].is_none()
    }

    #[inline]
    #[must_use]
    pub fn count(&self, color: Color, piece: Piece) -> u32 {
        u32::from(self.piece_count[ColoredPiece::new(color, piece).index()])
    }

    /// Square of `color`'s king. Every valid position has exactly one.
    #[inline]
    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        self.colored_pieces(color, Piece::King).lsb()
    }

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Plies since the start of the game, including plies before the FEN
    #[inline]
    #[must_use]
    pub fn game_ply(&self) -> i32 {
        self.game_ply
    }

    // ---- castling ----

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.st().castling_rights
    }

    #[inline]
    #[must_use]
    pub fn can_castle(&self, cr: CastlingRights) -> bool {
        self.st().castling_rights.intersects(cr)
    }

    /// True if a piece stands on the path of the single right `cr`
    #[inline]
    #[must_use]
    pub fn castling_impeded(&self, cr: CastlingRights) -> bool {
        debug_assert!(cr.is_single());
        (self.pieces() & self.castling_path[cr.index()]).any()
    }

    #[inline]
    #[must_use]
    pub fn castling_rook_square(&self, cr: CastlingRights) -> Option<Square> {
        debug_assert!(cr.is_single());
        self.castling_rook_square[cr.index()]
    }

    // ---- derived state ----

    #[inline]
    #[must_use]
    pub fn ep_square(&self) -> Option<Square> {
        self.st().ep_square
    }

    /// Enemy pieces giving check to the side to move
    #[inline]
    #[must_use]
    pub fn checkers(&self) -> Bitboard {
        self.st().checkers
    }

    #[inline]
    #[must_use]
    pub fn in_check(&self) -> bool {
        self.st().checkers.any()
    }

    /// Pieces of either color that alone stand between `color`'s king and
    /// an enemy slider
    #[inline]
    #[must_use]
    pub fn blockers_for_king(&self, color: Color) -> Bitboard {
        self.st().blockers_for_king[color.index()]
    }

    /// Sliders of `color` pinning an enemy piece to the enemy king
    #[inline]
    #[must_use]
    pub fn pinners(&self, color: Color) -> Bitboard {
        self.st().pinners[color.index()]
    }

    /// Squares from which `piece` of the side to move would check the enemy king
    #[inline]
    #[must_use]
    pub fn check_squares(&self, piece: Piece) -> Bitboard {
        self.st().check_squares[piece.index()]
    }

    /// Piece captured by the last move, if any
    #[inline]
    #[must_use]
    pub fn captured_piece(&self) -> Option<ColoredPiece> {
        self.st().captured_piece
    }

    #[inline]
    #[must_use]
    pub fn rule50_count(&self) -> i32 {
        self.st().rule50
    }

    #[inline]
    #[must_use]
    pub fn non_pawn_material(&self, color: Color) -> i32 {
        self.st().non_pawn_material[color.index()]
    }

    // ---- keys ----

    /// Key for transposition lookups. Folds the rule-50 counter in once it
    /// reaches 14, in steps of 8, so positions close to a 50-move draw do
    /// not share entries with fresh ones.
    #[inline]
    #[must_use]
    pub fn key(&self) -> u64 {
        let st = self.st();
        if st.rule50 < 14 {
            st.key
        } else {
            st.key ^ make_key(((st.rule50 - 14) / 8) as u64)
        }
    }

    /// Full Zobrist key without rule-50 adjustment
    #[inline]
    #[must_use]
    pub fn raw_key(&self) -> u64 {
        self.st().key
    }

    #[inline]
    #[must_use]
    pub fn material_key(&self) -> u64 {
        self.st().material_key
    }

    #[inline]
    #[must_use]
    pub fn pawn_key(&self) -> u64 {
        self.st().pawn_key
    }

    #[inline]
    #[must_use]
    pub fn minor_piece_key(&self) -> u64 {
        self.st().minor_piece_key
    }

    #[inline]
    #[must_use]
    pub fn major_piece_key(&self) -> u64 {
        self.st().major_piece_key
    }

    #[inline]
    #[must_use]
    pub fn non_pawn_key(&self, color: Color) -> u64 {
        self.st().non_pawn_key[color.index()]
    }

    // ---- move properties ----

    /// The piece standing on the origin of `m`
    #[inline]
    #[must_use]
    pub fn moved_piece(&self, m: Move) -> Option<ColoredPiece> {
        self.piece_on(m.from())
    }

    /// True for captures, including en passant. Castling is encoded as
    /// king-takes-own-rook and is not a capture.
    #[inline]
    #[must_use]
    pub fn is_capture(&self, m: Move) -> bool {
        debug_assert!(m.is_ok());
        (!self.is_empty(m.to()) && m.kind() != MoveKind::Castling)
            || m.kind() == MoveKind::EnPassant
    }

    /// Captures plus queen promotions: the moves a capture-only search stage
    /// considers.
    #[inline]
    #[must_use]
    pub fn is_capture_stage(&self, m: Move) -> bool {
        self.is_capture(m) || (m.is_promotion() && m.promotion_piece() == Piece::Queen)
    }

    // ---- attacks ----

    /// Pieces of both colors attacking `sq`, with sliders blocked by `occupied`
    #[must_use]
    pub fn attackers_to(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let a = &self.tables().attacks;
        let queens = self.pieces_of(Piece::Queen);
        (a.pawn_attacks(Color::Black, sq) & self.colored_pieces(Color::White, Piece::Pawn))
            | (a.pawn_attacks(Color::White, sq) & self.colored_pieces(Color::Black, Piece::Pawn))
            | (a.pseudo_attacks(Piece::Knight, sq) & self.pieces_of(Piece::Knight))
            | (a.rook_attacks(sq, occupied) & (self.pieces_of(Piece::Rook) | queens))
            | (a.bishop_attacks(sq, occupied) & (self.pieces_of(Piece::Bishop) | queens))
            | (a.pseudo_attacks(Piece::King, sq) & self.pieces_of(Piece::King))
    }

    /// True if any piece of `color` attacks `sq` given `occupied`.
    /// Cheaper than `attackers_to` when only existence matters.
    #[must_use]
    pub fn attackers_to_exist(&self, sq: Square, occupied: Bitboard, color: Color) -> bool {
        let a = &self.tables().attacks;
        let ours = self.colored(color);
        let queens = self.pieces_of(Piece::Queen);
        let rooks = (self.pieces_of(Piece::Rook) | queens) & ours;
        let bishops = (self.pieces_of(Piece::Bishop) | queens) & ours;

        ((a.pseudo_attacks(Piece::Rook, sq) & rooks).any()
            && (a.rook_attacks(sq, occupied) & rooks).any())
            || ((a.pseudo_attacks(Piece::Bishop, sq) & bishops).any()
                && (a.bishop_attacks(sq, occupied) & bishops).any())
            || (((a.pawn_attacks(!color, sq) & self.pieces_of(Piece::Pawn))
                | (a.pseudo_attacks(Piece::Knight, sq) & self.pieces_of(Piece::Knight))
                | (a.pseudo_attacks(Piece::King, sq) & self.pieces_of(Piece::King)))
                & ours)
                .any()
    }

    /// Union of the attacks of every `piece` of `color`
    #[must_use]
    pub fn attacks_by(&self, color: Color, piece: Piece) -> Bitboard {
        let a = &self.tables().attacks;
        let bb = self.colored_pieces(color, piece);
        if piece == Piece::Pawn {
            return bb.pawn_attacks(color);
        }
        let occupied = self.pieces();
        bb.iter()
            .fold(Bitboard::EMPTY, |acc, sq| acc | a.attacks(piece, sq, occupied))
    }

    // ---- mutation ----

    pub(crate) fn put_piece(&mut self, pc: ColoredPiece, sq: Square) {
        debug_assert!(self.board[sq.index()].is_none());
        self.board[sq.index()] = Some(pc);
        self.by_type[pc.piece.index()] |= sq;
        self.by_color[pc.color.index()] |= sq;
        self.piece_count[pc.index()] += 1;
    }

    pub(crate) fn remove_piece(&mut self, sq: Square) {
        if let Some(pc) = self.board[sq.index()].take() {
            self.by_type[pc.piece.index()] ^= sq;
            self.by_color[pc.color.index()] ^= sq;
            self.piece_count[pc.index()] -= 1;
        }
    }

    pub(crate) fn move_piece(&mut self, from: Square, to: Square) {
        if let Some(pc) = self.board[from.index()].take() {
            let from_to = Bitboard::from_square(from) | to;
            self.by_type[pc.piece.index()] ^= from_to;
            self.by_color[pc.color.index()] ^= from_to;
            self.board[to.index()] = Some(pc);
        }
    }

    // ---- derived data ----

    /// Recompute blockers for `color`'s king and the enemy sliders pinning
    /// them.
    pub(crate) fn update_slider_blockers(&mut self, color: Color) {
        let a = &self.tables().attacks;
        let ksq = self.king_square(color);
        let queens = self.pieces_of(Piece::Queen);
        let snipers = ((a.pseudo_attacks(Piece::Rook, ksq) & (self.pieces_of(Piece::Rook) | queens))
            | (a.pseudo_attacks(Piece::Bishop, ksq) & (self.pieces_of(Piece::Bishop) | queens)))
            & self.colored(!color);
        let occupancy = self.pieces() ^ snipers;
        let ours = self.colored(color);

        let mut blockers = Bitboard::EMPTY;
        let mut pinners = Bitboard::EMPTY;
        for sniper in snipers {
            let b = a.between(ksq, sniper) & occupancy;
            if b.any() && !b.more_than_one() {
                blockers |= b;
                if (b & ours).any() {
                    pinners |= sniper;
                }
            }
        }

        let st = self.st_mut();
        st.blockers_for_king[color.index()] = blockers;
        st.pinners[(!color).index()] = pinners;
    }

    /// Blockers, pinners and check squares for the current side to move.
    pub(crate) fn set_check_info(&mut self) {
        self.update_slider_blockers(Color::White);
        self.update_slider_blockers(Color::Black);

        let a = &self.tables().attacks;
        let them = !self.side_to_move;
        let ksq = self.king_square(them);
        let occupied = self.pieces();
        let bishop = a.bishop_attacks(ksq, occupied);
        let rook = a.rook_attacks(ksq, occupied);

        let st = self.st_mut();
        st.check_squares[Piece::Pawn.index()] = a.pawn_attacks(them, ksq);
        st.check_squares[Piece::Knight.index()] = a.pseudo_attacks(Piece::Knight, ksq);
        st.check_squares[Piece::Bishop.index()] = bishop;
        st.check_squares[Piece::Rook.index()] = rook;
        st.check_squares[Piece::Queen.index()] = bishop | rook;
        st.check_squares[Piece::King.index()] = Bitboard::EMPTY;
    }

    /// Compute every key and the check data of the current state from
    /// scratch. Used after `set` and by the consistency check.
    pub(crate) fn set_state(&mut self) {
        let z = &self.tables().zobrist;
        let us = self.side_to_move;
        let checkers = self.attackers_to(self.king_square(us), self.pieces()) & self.colored(!us);

        let mut st = StateInfo {
            pawn_key: z.no_pawns(),
            ..self.st().clone()
        };
        st.key = 0;
        st.material_key = 0;
        st.minor_piece_key = 0;
        st.major_piece_key = 0;
        st.non_pawn_key = [0; 2];
        st.non_pawn_material = [0; 2];
        st.checkers = checkers;

        for sq in self.pieces() {
            if let Some(pc) = self.piece_on(sq) {
                st.key ^= z.piece_square(pc, sq);
                st.toggle_structure_keys(z, pc, sq);
                if pc.piece != Piece::Pawn {
                    st.non_pawn_material[pc.color.index()] += pc.piece.value();
                }
            }
        }

        if let Some(ep) = st.ep_square {
            st.key ^= z.en_passant(ep.file());
        }
        if us == Color::Black {
            st.key ^= z.side();
        }
        st.key ^= z.castling(st.castling_rights);

        for color in Color::BOTH {
            for piece in Piece::ALL {
                let pc = ColoredPiece::new(color, piece);
                for cnt in 0..self.piece_count[pc.index()] as usize {
                    st.material_key ^= z.material(pc, cnt);
                }
            }
        }

        *self.st_mut() = st;
        self.set_check_info();
    }
}

impl Default for Position {
    /// The standard starting position
    fn default() -> Self {
        Position::new()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.fen())
            .field("key", &format_args!("{:016X}", self.raw_key()))
            .field("ply", &self.game_ply)
            .finish()
    }
}
