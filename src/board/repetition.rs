//! Draw detection: fifty-move rule, repetitions, and cuckoo-based lookahead
//! for repetitions the side to move can force.

use super::cuckoo::Cuckoo;
use super::state::Position;

impl Position {
    /// True if the position is drawn by the fifty-move rule or by a
    /// repetition inside the search (`ply` plies from the root). Stalemate
    /// is not detected here.
    #[must_use]
    pub fn is_draw(&self, ply: i32) -> bool {
        // Checkmate on the hundredth ply takes precedence
        if self.st().rule50 > 99 && (!self.in_check() || !self.legal_moves().is_empty()) {
            return true;
        }
        self.is_repetition(ply)
    }

    /// True if the position occurred before within the last `ply` plies, or
    /// is a repetition of a position that had already repeated.
    #[must_use]
    pub fn is_repetition(&self, ply: i32) -> bool {
        let rep = self.st().repetition;
        rep != 0 && rep < ply
    }

    /// True if any position since the last irreversible move repeated.
    #[must_use]
    pub fn has_repeated(&self) -> bool {
        let st = self.st();
        let mut end = st.rule50.min(st.plies_from_null);
        let mut idx = self.history.len() - 1;
        while end >= 4 {
            if self.history[idx].repetition != 0 {
                return true;
            }
            end -= 1;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        false
    }

    /// True if the side to move has a reversible move leading to a position
    /// seen earlier in the reversible part of the history.
    ///
    /// Walks back two plies at a time and compares the key difference
    /// against the cuckoo table of reversible moves, then checks the move
    /// is not blocked on the current board.
    #[must_use]
    pub fn upcoming_repetition(&self, ply: i32) -> bool {
        let st = self.st();
        let end = st.rule50.min(st.plies_from_null);
        if end < 3 {
            return false;
        }

        let tables = self.tables();
        let side = tables.zobrist.side();
        let n = self.history.len() - 1;
        let original_key = st.key;
        let mut other = original_key ^ self.history[n - 1].key ^ side;

        for i in (3..=end).step_by(2) {
            let Some(idx) = n.checked_sub(i as usize) else {
                break;
            };
            other ^= self.history[idx + 1].key ^ self.history[idx].key ^ side;
            if other != 0 {
                continue;
            }

            let prev = &self.history[idx];
            let Some(m) = tables.cuckoo.lookup(original_key ^ prev.key) else {
                continue;
            };
            if Cuckoo::path_clear(&tables.attacks, m, self.pieces()) {
                // Inside the search any repetition counts. At or before the
                // root the earlier position must itself have repeated.
                if ply > i || prev.repetition != 0 {
                    return true;
                }
            }
        }
        false
    }
}
