//! The process-wide, read-only table context shared by every position.

use once_cell::sync::Lazy;

use super::attack_tables::AttackTables;
use super::cuckoo::Cuckoo;
use crate::zobrist::{Zobrist, ZOBRIST_SEED};

/// Attack tables, Zobrist keys and the cuckoo table, built together once.
pub struct Tables {
    pub attacks: AttackTables,
    pub zobrist: Zobrist,
    pub cuckoo: Cuckoo,
}

static TABLES: Lazy<Tables> = Lazy::new(Tables::new);

impl Tables {
    /// Build a fresh context. Prefer [`Tables::global`], which builds it
    /// once per process.
    #[must_use]
    pub fn new() -> Self {
        let attacks = AttackTables::new();
        let mut seed = ZOBRIST_SEED;
        loop {
            let zobrist = Zobrist::with_seed(seed);
            if let Some(cuckoo) = Cuckoo::try_new(&zobrist, &attacks) {
                return Tables {
                    attacks,
                    zobrist,
                    cuckoo,
                };
            }
            log::warn!("cuckoo insertion cycled with zobrist seed {seed}, retrying");
            seed += 1;
        }
    }

    /// The shared context, built on first use.
    #[inline]
    #[must_use]
    pub fn global() -> &'static Tables {
        &TABLES
    }
}

impl Default for Tables {
    fn default() -> Self {
        Tables::new()
    }
}
