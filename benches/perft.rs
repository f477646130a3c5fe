// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tbcore::movegen::{self, GenType, MoveList};
use tbcore::position::{Position, RawBoard};
use tbcore::tb::Tablebases;
use tbcore::types::*;
use tbcore::KpkProber;

#[path = "../tests/common/mod.rs"]
mod common;

struct BenchCase {
    name: &'static str,
    fen: &'static str,
    depth: u32,
    expected_nodes: u64,
}

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "start",
        fen: common::START_FEN,
        depth: 4,
        expected_nodes: 197_281,
    },
    BenchCase {
        name: "kiwipete",
        fen: common::KIWIPETE_FEN,
        depth: 3,
        expected_nodes: 97_862,
    },
    BenchCase {
        name: "endgame",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depth: 4,
        expected_nodes: 43_238,
    },
];

fn bench_perft(c: &mut Criterion) {
    tbcore::init();

    let mut group = c.benchmark_group("perft");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(20);

    for case in CASES {
        let pos = common::from_fen(case.fen);

        // Correctness guard before benchmarking
        let mut warmup = pos.clone();
        assert_eq!(movegen::perft(&mut warmup, case.depth), case.expected_nodes,
            "node mismatch for {}", case.name);

        group.throughput(Throughput::Elements(case.expected_nodes));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_d{}", case.name, case.depth)),
            &pos,
            |b, pos| {
                b.iter(|| {
                    let mut pos = pos.clone();
                    black_box(movegen::perft(&mut pos, black_box(case.depth)))
                });
            },
        );
    }

    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let pos = common::from_fen(common::KIWIPETE_FEN);
    let mut group = c.benchmark_group("generation");

    for (name, gen_type) in [
        ("pseudo_legal", GenType::NonEvasions),
        ("captures", GenType::Captures),
        ("legal", GenType::Legal),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(MoveList::new(black_box(&pos), gen_type).size()));
        });
    }

    group.finish();
}

fn bench_probe(c: &mut Criterion) {
    let mut tb = Tablebases::new(KpkProber::new());
    tb.initialize(&std::env::temp_dir().to_string_lossy());

    let mut squares = [0u8; 64];
    squares[Square::E5.0 as usize] = 1;
    squares[Square::E4.0 as usize] = 6;
    squares[Square::E7.0 as usize] = 7;
    let raw = RawBoard {
        squares: &squares,
        white_to_move: true,
        ep_square: -1,
        castle_mask: 0,
        half_move_clock: 0,
        full_move_counter: 1,
    };
    let mut pos = match Position::from_raw(&raw) {
        Ok(pos) => pos,
        Err(e) => panic!("bad board: {}", e),
    };

    c.bench_function("kpk_probe_raw", |b| b.iter(|| black_box(tb.probe_raw(black_box(&raw)))));
    c.bench_function("kpk_probe_wdl", |b| b.iter(|| black_box(tb.probe_wdl(&mut pos))));
}

criterion_group!(benches, bench_perft, bench_generation, bench_probe);
criterion_main!(benches);
