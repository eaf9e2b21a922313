//! Transposition table shared by search threads.
//!
//! The table is one flat block of 32-byte clusters, each holding three
//! 10-byte entries. A key selects its cluster through the high half of the
//! 128-bit product `key * cluster_count`, and the low 16 bits of the key
//! identify the entry inside the cluster.
//!
//! Every field of an entry is a separate relaxed atomic, so `probe` and
//! `TtWriter::write` need no locks. Two threads writing the same entry at
//! once can leave a mix of both writes behind. Such torn entries are
//! tolerated: consumers check the stored move with `Position::pseudo_legal`
//! before playing it.

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::slice;
use std::sync::atomic::{AtomicI16, AtomicU16, AtomicU8, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::Move;
use crate::memory::{page_layout, PageAllocator, SystemAllocator};

/// Table size used when the caller does not configure one.
pub const DEFAULT_TT_MB: usize = 16;

/// Stored depth is `depth - DEPTH_ENTRY_OFFSET`, so a stored 0 marks an
/// empty entry.
pub const DEPTH_ENTRY_OFFSET: i32 = -3;

/// Value reported for missing scores.
pub const VALUE_NONE: i32 = 32002;

const CLUSTER_SIZE: usize = 3;

// The low 3 bits of the generation byte hold the PV flag and the bound.
const GENERATION_BITS: u32 = 3;
const GENERATION_DELTA: u8 = 1 << GENERATION_BITS;
// 256 plus enough to keep the low bits from borrowing into the age
const GENERATION_CYCLE: i32 = 255 + GENERATION_DELTA as i32;
const GENERATION_MASK: i32 = (0xFF << GENERATION_BITS) & 0xFF;

/// Kind of score stored in an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Bound {
    #[default]
    None = 0,
    /// The true score is at most the stored value.
    Upper = 1,
    /// The true score is at least the stored value.
    Lower = 2,
    Exact = 3,
}

impl Bound {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Bound::None,
            1 => Bound::Upper,
            2 => Bound::Lower,
            _ => Bound::Exact,
        }
    }
}

/// Decoded copy of one entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtData {
    pub mv: Move,
    pub value: i32,
    pub eval: i32,
    pub depth: i32,
    pub bound: Bound,
    pub is_pv: bool,
}

impl TtData {
    const EMPTY: TtData = TtData {
        mv: Move::NONE,
        value: VALUE_NONE,
        eval: VALUE_NONE,
        depth: DEPTH_ENTRY_OFFSET,
        bound: Bound::None,
        is_pv: false,
    };
}

/// 16-bit key, 8-bit depth, generation/PV/bound byte, move, value, eval.
#[repr(C)]
#[derive(Default)]
struct TtEntry {
    key16: AtomicU16,
    depth8: AtomicU8,
    gen_bound8: AtomicU8,
    move16: AtomicU16,
    value16: AtomicI16,
    eval16: AtomicI16,
}

const _: () = assert!(std::mem::size_of::<TtEntry>() == 10);

impl TtEntry {
    fn is_occupied(&self) -> bool {
        self.depth8.load(Ordering::Relaxed) != 0
    }

    /// Generations elapsed since the entry was written, times 8.
    fn relative_age(&self, generation8: u8) -> u8 {
        let stored = i32::from(self.gen_bound8.load(Ordering::Relaxed));
        ((GENERATION_CYCLE + i32::from(generation8) - stored) & GENERATION_MASK) as u8
    }

    /// Replacement priority: lower is replaced first.
    fn worth(&self, generation8: u8) -> i32 {
        i32::from(self.depth8.load(Ordering::Relaxed))
            - 2 * i32::from(self.relative_age(generation8))
    }

    fn read(&self) -> TtData {
        let gen_bound = self.gen_bound8.load(Ordering::Relaxed);
        TtData {
            mv: Move::from_u16(self.move16.load(Ordering::Relaxed)),
            value: i32::from(self.value16.load(Ordering::Relaxed)),
            eval: i32::from(self.eval16.load(Ordering::Relaxed)),
            depth: i32::from(self.depth8.load(Ordering::Relaxed)) + DEPTH_ENTRY_OFFSET,
            bound: Bound::from_bits(gen_bound),
            is_pv: gen_bound & 0x4 != 0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn save(
        &self,
        key: u64,
        value: i32,
        pv: bool,
        bound: Bound,
        depth: i32,
        mv: Move,
        eval: i32,
        generation8: u8,
    ) {
        let key16 = key as u16;
        let same_key = self.key16.load(Ordering::Relaxed) == key16;

        // Keep the known move when re-storing the same position without one
        if !mv.is_none() || !same_key {
            self.move16.store(mv.as_u16(), Ordering::Relaxed);
        }

        if bound == Bound::Exact
            || !same_key
            || depth - DEPTH_ENTRY_OFFSET + 2 * i32::from(pv)
                > i32::from(self.depth8.load(Ordering::Relaxed)) - 4
            || self.relative_age(generation8) != 0
        {
            debug_assert!(depth > DEPTH_ENTRY_OFFSET);
            debug_assert!(depth < 256 + DEPTH_ENTRY_OFFSET);

            self.key16.store(key16, Ordering::Relaxed);
            self.depth8
                .store((depth - DEPTH_ENTRY_OFFSET) as u8, Ordering::Relaxed);
            self.gen_bound8.store(
                generation8 | (u8::from(pv) << 2) | bound as u8,
                Ordering::Relaxed,
            );
            self.value16.store(value as i16, Ordering::Relaxed);
            self.eval16.store(eval as i16, Ordering::Relaxed);
        }
    }

    fn zero(&self) {
        self.key16.store(0, Ordering::Relaxed);
        self.depth8.store(0, Ordering::Relaxed);
        self.gen_bound8.store(0, Ordering::Relaxed);
        self.move16.store(0, Ordering::Relaxed);
        self.value16.store(0, Ordering::Relaxed);
        self.eval16.store(0, Ordering::Relaxed);
    }
}

#[repr(C, align(32))]
struct Cluster {
    entries: [TtEntry; CLUSTER_SIZE],
    _padding: [u8; 2],
}

const _: () = assert!(std::mem::size_of::<Cluster>() == 32);

/// Handle to the entry chosen by `probe`.
pub struct TtWriter<'a> {
    entry: &'a TtEntry,
}

impl TtWriter<'_> {
    /// Store a search result. The move is refreshed unless `mv` is none
    /// and the slot already holds this position. The other fields are
    /// overwritten for exact bounds, a different position, a deeper (or
    /// PV) search, or an entry left over from an earlier search.
    #[allow(clippy::too_many_arguments)]
    pub fn write(
        &self,
        key: u64,
        value: i32,
        pv: bool,
        bound: Bound,
        depth: i32,
        mv: Move,
        eval: i32,
        generation8: u8,
    ) {
        self.entry
            .save(key, value, pv, bound, depth, mv, eval, generation8);
    }
}

/// Fixed-size lock-free transposition table.
pub struct TranspositionTable<A: PageAllocator = SystemAllocator> {
    table: NonNull<Cluster>,
    cluster_count: usize,
    layout: Layout,
    generation8: u8,
    allocator: A,
}

// SAFETY: the block holds only atomics and is owned by the table. Shared
// access goes through relaxed atomic loads and stores; reallocation and
// freeing need `&mut self`.
unsafe impl<A: PageAllocator + Send> Send for TranspositionTable<A> {}
unsafe impl<A: PageAllocator + Sync> Sync for TranspositionTable<A> {}

impl TranspositionTable<SystemAllocator> {
    /// Table of `mb` MiB from the global allocator.
    #[must_use]
    pub fn new(mb: usize) -> Self {
        Self::with_allocator(SystemAllocator, mb)
    }
}

impl Default for TranspositionTable<SystemAllocator> {
    fn default() -> Self {
        Self::new(DEFAULT_TT_MB)
    }
}

impl<A: PageAllocator> TranspositionTable<A> {
    /// Table of `mb` MiB obtained from `allocator`.
    pub fn with_allocator(allocator: A, mb: usize) -> Self {
        let (table, cluster_count, layout) = Self::allocate(&allocator, mb);
        TranspositionTable {
            table,
            cluster_count,
            layout,
            generation8: 0,
            allocator,
        }
    }

    fn allocate(allocator: &A, mb: usize) -> (NonNull<Cluster>, usize, Layout) {
        let cluster_count = (mb.max(1).saturating_mul(1024 * 1024) / std::mem::size_of::<Cluster>())
            .max(1);
        let Some(layout) = cluster_count
            .checked_mul(std::mem::size_of::<Cluster>())
            .and_then(page_layout)
        else {
            allocation_failed(mb, Layout::new::<Cluster>());
        };
        let Some(ptr) = allocator.alloc(layout) else {
            allocation_failed(mb, layout);
        };
        debug_assert_eq!(ptr.as_ptr() as usize % std::mem::align_of::<Cluster>(), 0);
        log::info!("transposition table: {mb} MB, {cluster_count} clusters");
        (ptr.cast(), cluster_count, layout)
    }

    /// Replace the table with an empty one of `mb` MiB. A failed
    /// allocation is fatal.
    pub fn resize(&mut self, mb: usize) {
        // SAFETY: the block came from this allocator with this layout, and
        // `&mut self` guarantees no outstanding writers.
        unsafe { self.allocator.free(self.table.cast(), self.layout) };
        let (table, cluster_count, layout) = Self::allocate(&self.allocator, mb);
        self.table = table;
        self.cluster_count = cluster_count;
        self.layout = layout;
        self.generation8 = 0;
    }

    /// Zero every entry and restart the generation counter.
    pub fn clear(&mut self) {
        self.generation8 = 0;
        for cluster in self.clusters() {
            for entry in &cluster.entries {
                entry.zero();
            }
        }
    }

    /// Start a new search: entries written before now begin to age.
    pub fn new_search(&mut self) {
        self.generation8 = self.generation8.wrapping_add(GENERATION_DELTA);
    }

    /// Current generation, in the upper 5 bits of the byte.
    #[must_use]
    pub fn generation(&self) -> u8 {
        self.generation8
    }

    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Look up `key`. On a hit returns whether the entry is occupied, its
    /// data and a writer for it. On a miss returns `false`, empty data and a
    /// writer for the least valuable entry of the cluster.
    #[must_use]
    pub fn probe(&self, key: u64) -> (bool, TtData, TtWriter<'_>) {
        let cluster = self.cluster(key);
        let key16 = key as u16;

        for entry in &cluster.entries {
            if entry.key16.load(Ordering::Relaxed) == key16 {
                return (entry.is_occupied(), entry.read(), TtWriter { entry });
            }
        }

        let mut replace = &cluster.entries[0];
        for entry in &cluster.entries[1..] {
            if replace.worth(self.generation8) > entry.worth(self.generation8) {
                replace = entry;
            }
        }
        (false, TtData::EMPTY, TtWriter { entry: replace })
    }

    /// Per-mille of sampled entries that are occupied and at most
    /// `max_age` searches old.
    #[must_use]
    pub fn hash_full(&self, max_age: u8) -> usize {
        let max_age = i32::from(max_age) << GENERATION_BITS;
        let sample = &self.clusters()[..self.cluster_count.min(1000)];
        let count = sample
            .iter()
            .flat_map(|cluster| cluster.entries.iter())
            .filter(|e| e.is_occupied() && i32::from(e.relative_age(self.generation8)) <= max_age)
            .count();
        count * 1000 / (sample.len() * CLUSTER_SIZE)
    }

    fn clusters(&self) -> &[Cluster] {
        // SAFETY: the block holds `cluster_count` zero-initialised clusters
        // and all-zero bytes are a valid `Cluster`.
        unsafe { slice::from_raw_parts(self.table.as_ptr(), self.cluster_count) }
    }

    fn cluster(&self, key: u64) -> &Cluster {
        let idx = ((u128::from(key) * self.cluster_count as u128) >> 64) as usize;
        &self.clusters()[idx]
    }
}

impl<A: PageAllocator> Drop for TranspositionTable<A> {
    fn drop(&mut self) {
        // SAFETY: allocated by this allocator with this layout.
        unsafe { self.allocator.free(self.table.cast(), self.layout) };
    }
}

fn allocation_failed(mb: usize, layout: Layout) -> ! {
    log::error!("failed to allocate {mb} MB for the transposition table");
    alloc::handle_alloc_error(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;
    use std::sync::atomic::AtomicUsize;

    /// Key in the sampled front of a 1 MiB table: cluster `i`, entry key `low`.
    fn key_for(i: u64, low: u16) -> u64 {
        (i << 49) | u64::from(low)
    }

    fn mv() -> Move {
        Move::new(Square::E1, Square::G1)
    }

    #[test]
    fn test_entry_layout() {
        assert_eq!(std::mem::size_of::<TtEntry>(), 10);
        assert_eq!(std::mem::size_of::<Cluster>(), 32);
    }

    #[test]
    fn test_write_then_probe_hits() {
        let tt = TranspositionTable::new(1);
        let key = 0x1234_5678_9ABC_DEF0;

        let (found, data, writer) = tt.probe(key);
        assert!(!found);
        assert_eq!(data, TtData::EMPTY);

        writer.write(key, 150, true, Bound::Lower, 12, mv(), -40, tt.generation());

        let (found, data, _) = tt.probe(key);
        assert!(found);
        assert_eq!(
            data,
            TtData {
                mv: mv(),
                value: 150,
                eval: -40,
                depth: 12,
                bound: Bound::Lower,
                is_pv: true,
            }
        );
    }

    #[test]
    fn test_resize_and_clear_empty_the_table() {
        let mut tt = TranspositionTable::new(1);
        let key = key_for(3, 0xBEEF);
        tt.probe(key).2.write(key, 1, false, Bound::Exact, 5, mv(), 0, 0);
        assert!(tt.probe(key).0);

        tt.resize(2);
        assert_eq!(tt.cluster_count(), 2 * 1024 * 1024 / 32);
        assert!(!tt.probe(key).0);

        tt.probe(key).2.write(key, 1, false, Bound::Exact, 5, mv(), 0, 0);
        tt.new_search();
        tt.clear();
        assert_eq!(tt.generation(), 0);
        assert!(!tt.probe(key).0);
    }

    #[test]
    fn test_move_kept_when_rewritten_without_one() {
        let tt = TranspositionTable::new(1);
        let key = key_for(7, 0x0101);
        tt.probe(key).2.write(key, 10, false, Bound::Lower, 8, mv(), 0, 0);
        tt.probe(key).2.write(key, 20, false, Bound::Exact, 9, Move::NONE, 0, 0);

        let (_, data, _) = tt.probe(key);
        assert_eq!(data.mv, mv());
        assert_eq!(data.value, 20);
    }

    #[test]
    fn test_shallow_write_keeps_deeper_entry() {
        let tt = TranspositionTable::new(1);
        let key = key_for(9, 0x0202);
        tt.probe(key).2.write(key, 10, false, Bound::Lower, 20, mv(), 0, 0);
        tt.probe(key).2.write(key, 99, false, Bound::Upper, 2, Move::NONE, 0, 0);

        let (_, data, _) = tt.probe(key);
        assert_eq!(data.depth, 20);
        assert_eq!(data.value, 10);

        // An exact bound always replaces
        tt.probe(key).2.write(key, 99, false, Bound::Exact, 2, Move::NONE, 0, 0);
        assert_eq!(tt.probe(key).1.depth, 2);
    }

    #[test]
    fn test_replacement_prefers_shallow_and_old() {
        let mut tt = TranspositionTable::new(1);
        for (low, depth) in [(1, 10), (2, 5), (3, 20)] {
            let key = key_for(11, low);
            tt.probe(key).2.write(key, 0, false, Bound::Lower, depth, mv(), 0, 0);
        }

        let newcomer = key_for(11, 4);
        let (found, _, writer) = tt.probe(newcomer);
        assert!(!found);
        writer.write(newcomer, 0, false, Bound::Lower, 7, mv(), 0, 0);
        assert!(!tt.probe(key_for(11, 2)).0);
        assert!(tt.probe(key_for(11, 1)).0);
        assert!(tt.probe(key_for(11, 3)).0);

        // Twelve searches later the old entries all rank below a fresh
        // shallow one, which therefore survives the next replacement
        for _ in 0..12 {
            tt.new_search();
        }
        let generation = tt.generation();
        for low in [5, 6] {
            let key = key_for(11, low);
            tt.probe(key).2.write(key, 0, false, Bound::Lower, 1, mv(), 0, generation);
        }
        assert!(tt.probe(key_for(11, 5)).0);
        assert!(tt.probe(key_for(11, 6)).0);
    }

    #[test]
    fn test_generation_steps_and_wraps() {
        let mut tt = TranspositionTable::new(1);
        tt.new_search();
        assert_eq!(tt.generation(), 8);
        for _ in 0..31 {
            tt.new_search();
        }
        assert_eq!(tt.generation(), 0);
    }

    #[test]
    fn test_relative_age_across_wrap() {
        let entry = TtEntry::default();
        entry.save(1, 0, true, Bound::Exact, 4, mv(), 0, 248);
        assert_eq!(entry.relative_age(248), 0);
        assert_eq!(entry.relative_age(0), 8);
        assert_eq!(entry.relative_age(16), 24);
    }

    #[test]
    fn test_hash_full_counts_recent_entries() {
        let mut tt = TranspositionTable::new(1);
        assert_eq!(tt.hash_full(0), 0);

        for i in 0..1000 {
            let key = key_for(i, 0x1234);
            tt.probe(key).2.write(key, 0, false, Bound::Exact, 1, mv(), 0, tt.generation());
        }
        assert_eq!(tt.hash_full(0), 333);

        tt.new_search();
        assert_eq!(tt.hash_full(0), 0);
        assert_eq!(tt.hash_full(1), 333);
    }

    #[test]
    fn test_concurrent_probe_and_write() {
        let tt = TranspositionTable::new(1);
        std::thread::scope(|s| {
            for t in 0..4u64 {
                let tt = &tt;
                s.spawn(move || {
                    for i in 0..10_000u64 {
                        let key = (i * 4 + t).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                        let (_, _, writer) = tt.probe(key);
                        writer.write(key, i as i32, false, Bound::Lower, 4, mv(), 0, 0);
                    }
                });
            }
        });
        assert!(tt.hash_full(0) > 0);
    }

    #[derive(Default)]
    struct CountingAllocator {
        allocs: AtomicUsize,
        frees: AtomicUsize,
    }

    impl PageAllocator for &CountingAllocator {
        fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
            self.allocs.fetch_add(1, Ordering::Relaxed);
            SystemAllocator.alloc(layout)
        }

        unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
            self.frees.fetch_add(1, Ordering::Relaxed);
            SystemAllocator.free(ptr, layout);
        }
    }

    #[test]
    fn test_blocks_go_through_the_allocator() {
        let counter = CountingAllocator::default();
        {
            let mut tt = TranspositionTable::with_allocator(&counter, 1);
            tt.resize(2);
            assert_eq!(counter.allocs.load(Ordering::Relaxed), 2);
            assert_eq!(counter.frees.load(Ordering::Relaxed), 1);
        }
        assert_eq!(counter.frees.load(Ordering::Relaxed), 2);
    }
}
