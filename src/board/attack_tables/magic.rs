//! Fancy magic bitboards for bishop and rook attacks.
//!
//! Each square owns a slice of one shared attack vector per slider. A
//! multiplier is searched so that every subset of the square's relevant
//! occupancy mask hashes to a slot holding the correct attack set.

use rand::prelude::*;

use super::tables::sliding_attack;
use crate::board::types::{Bitboard, Piece, Square};

/// Total slots needed by all 64 rook squares
pub(crate) const ROOK_TABLE_SIZE: usize = 0x19000;
/// Total slots needed by all 64 bishop squares
pub(crate) const BISHOP_TABLE_SIZE: usize = 0x1480;

/// RNG seed per rank, chosen so the search converges quickly.
const SEEDS: [u64; 8] = [728, 10316, 55013, 32803, 12281, 15100, 16645, 255];

/// Magic lookup data for one square and one slider family.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Magic {
    pub(crate) mask: Bitboard,
    pub(crate) magic: u64,
    pub(crate) shift: u32,
    pub(crate) offset: usize,
}

impl Magic {
    #[inline]
    pub(crate) fn index(&self, occupied: Bitboard) -> usize {
        self.offset + ((occupied.0 & self.mask.0).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

fn sparse_random(rng: &mut StdRng) -> u64 {
    rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>()
}

/// Relevant occupancy: the empty-board rays minus edge squares that are
/// not on the slider's own rank or file.
pub(crate) fn relevant_mask(piece: Piece, sq: Square) -> Bitboard {
    let edges = ((Bitboard::RANK_1 | Bitboard::RANK_8) & !Bitboard::rank_of(sq))
        | ((Bitboard::FILE_A | Bitboard::FILE_H) & !Bitboard::file_of(sq));
    sliding_attack(piece, sq, Bitboard::EMPTY) & !edges
}

/// Search magics for every square and fill `table` with the attack sets.
///
/// `table` must hold exactly the number of slots the slider needs
/// (`ROOK_TABLE_SIZE` or `BISHOP_TABLE_SIZE`).
pub(crate) fn init_magics(piece: Piece, table: &mut [Bitboard]) -> [Magic; 64] {
    let mut magics = [Magic::default(); 64];
    let mut occupancy = vec![Bitboard::EMPTY; 4096];
    let mut reference = vec![Bitboard::EMPTY; 4096];
    let mut epoch = vec![0u32; 4096];
    let mut cnt = 0u32;
    let mut offset = 0usize;
    let mut trials = 0u64;

    for sq in Square::all() {
        let m = &mut magics[sq.index()];
        m.mask = relevant_mask(piece, sq);
        m.shift = 64 - m.mask.popcount();
        m.offset = offset;

        // Carry-rippler over every subset of the mask
        let mut size = 0usize;
        let mut b = 0u64;
        loop {
            occupancy[size] = Bitboard(b);
            reference[size] = sliding_attack(piece, sq, Bitboard(b));
            size += 1;
            b = b.wrapping_sub(m.mask.0) & m.mask.0;
            if b == 0 {
                break;
            }
        }

        let mut rng = StdRng::seed_from_u64(SEEDS[sq.rank() as usize]);
        let mut i = 0;
        while i < size {
            m.magic = 0;
            while (m.magic.wrapping_mul(m.mask.0) >> 56).count_ones() < 6 {
                m.magic = sparse_random(&mut rng);
            }
            trials += 1;

            // Epochs let a failed candidate be abandoned without clearing
            // the slots it already wrote.
            cnt += 1;
            i = 0;
            while i < size {
                let idx = m.index(occupancy[i]) - m.offset;
                if epoch[idx] < cnt {
                    epoch[idx] = cnt;
                    table[m.offset + idx] = reference[i];
                } else if table[m.offset + idx] != reference[i] {
                    break;
                }
                i += 1;
            }
        }

        offset += size;
    }

    debug_assert_eq!(offset, table.len());
    log::debug!(
        "{:?} magics found after {} candidates, {} slots",
        piece,
        trials,
        offset
    );
    magics
}
