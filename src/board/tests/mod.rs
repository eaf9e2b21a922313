//! Board module tests.
//!
//! Tests are organized into separate files by category:
//! - `perft.rs` - Move generator node counts on standard positions
//! - `draw.rs` - Draw detection (50-move rule, repetition)
//! - `make_unmake.rs` - Make/unmake move correctness
//! - `edge_cases.rs` - Special positions and edge cases
//! - `proptest.rs` - Property-based tests

mod draw;
mod perft;
