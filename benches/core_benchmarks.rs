//! Benchmarks for move generation, make/unmake and the transposition table.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chess_core::board::{generate, perft, GenType, Move, MoveList, Position};
use chess_core::tt::{Bound, TranspositionTable};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const MIDDLEGAME: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    // Starting position
    let mut pos = Position::new();

    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| perft(&mut pos, black_box(depth)))
        });
    }

    // Complex middlegame position (Kiwipete)
    let mut kiwipete = Position::from_fen(KIWIPETE);

    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| perft(&mut kiwipete, black_box(depth)))
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    for (name, fen) in [
        ("startpos", chess_core::board::START_FEN),
        ("middlegame", MIDDLEGAME),
        ("kiwipete", KIWIPETE),
    ] {
        let pos = Position::from_fen(fen);
        group.bench_function(BenchmarkId::new("legal", name), |b| {
            b.iter(|| black_box(pos.legal_moves()))
        });
        group.bench_function(BenchmarkId::new("pseudo", name), |b| {
            b.iter(|| {
                let mut list = MoveList::new();
                generate(black_box(&pos), GenType::NonEvasions, &mut list);
                list
            })
        });
    }

    group.finish();
}

fn bench_make_unmake(c: &mut Criterion) {
    let mut pos = Position::from_fen(KIWIPETE);
    let moves = pos.legal_moves();

    c.bench_function("do_undo_all_moves", |b| {
        b.iter(|| {
            for &mv in &moves {
                pos.do_move(black_box(mv));
                pos.undo_move(mv);
            }
        })
    });
}

fn bench_see(c: &mut Criterion) {
    let pos = Position::from_fen(KIWIPETE);
    let captures: Vec<_> = pos
        .legal_moves()
        .iter()
        .copied()
        .filter(|&mv| pos.is_capture(mv))
        .collect();

    c.bench_function("see_ge_captures", |b| {
        b.iter(|| {
            captures
                .iter()
                .filter(|&&mv| pos.see_ge(black_box(mv), 0))
                .count()
        })
    });
}

fn bench_tt(c: &mut Criterion) {
    let tt = TranspositionTable::new(16);
    let keys: Vec<u64> = (0..1024u64)
        .map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .collect();

    c.bench_function("tt_probe_write", |b| {
        b.iter(|| {
            for (i, &key) in keys.iter().enumerate() {
                let (hit, _, writer) = tt.probe(black_box(key));
                if !hit {
                    writer.write(key, i as i32, false, Bound::Lower, 5, Move::NONE, 0, 0);
                }
            }
        })
    });
}

criterion_group!(
    benches,
    bench_perft,
    bench_movegen,
    bench_make_unmake,
    bench_see,
    bench_tt
);
criterion_main!(benches);
