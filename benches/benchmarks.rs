/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crystal_tb::input::{BlockMatrixReader, CrystalOutputParser, LineCursor, ParserConfig};
use crystal_tb::system::assembly::expand_spin_blocks;
use ndarray::Array2;
use num_complex::Complex64;
use std::io::Cursor;

fn blocked_dump(n: usize) -> String {
    let mut out = String::new();
    for start in (0..n).step_by(6) {
        let end = (start + 6).min(n);
        out.push('\n');
        for col in start..end {
            out.push_str(&format!("{:12}", col + 1));
        }
        out.push('\n');
        for row in 0..n {
            out.push_str(&format!("{:6}", row + 1));
            for col in start..end {
                out.push_str(&format!(" {:12.4E}", (row + col) as f64 * 1e-3));
            }
            out.push('\n');
        }
    }
    out
}

fn matrix_reader_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Matrix Reader");

    for n in [26usize, 104] {
        let text = blocked_dump(n);
        group.bench_function(format!("block_dump_{}", n), |b| {
            b.iter(|| {
                let mut cursor = LineCursor::new(Cursor::new(black_box(text.as_bytes())));
                black_box(BlockMatrixReader::new(n, true).read(&mut cursor, "bench"))
            })
        });
    }

    group.finish();
}

fn synthetic_report(n: usize, ncells: usize) -> String {
    let mut out = String::new();
    out.push_str(" N. OF ATOMS PER CELL          1\n");
    out.push_str(" NUMBER OF SHELLS              1\n");
    out.push_str(&format!(" NUMBER OF AO              {:5}\n", n));
    out.push_str(" N. OF ELECTRONS PER CELL      8\n");
    out.push_str(" DIRECT LATTICE VECTOR COMPONENTS (ANGSTROM)\n");
    out.push_str("   3.0 0.0 0.0\n   0.0 3.0 0.0\n   0.0 0.0 3.0\n");
    out.push_str("   ATOM  AT.N.  SPECIES  N.SHELL   X   Y   Z\n ****\n");
    out.push_str("     1    26 FE          1   0.0 0.0 0.0\n");
    out.push_str(" LOCAL ATOMIC FUNCTIONS BASIS SET\n ****\n   ATOM   X(AU)\n ****\n");
    out.push_str(&format!("   1 FE   0.0 0.0 0.0\n   1-{:4} SP\n", n));
    out.push_str("     1.0E+00 1.0E+00 1.0E+00 0.0E+00\n ****\n");
    for cell in 1..=ncells {
        out.push_str(&format!(" OVERLAP MATRIX - CELL N. {:3}({:3}  0  0)\n", cell, cell - 1));
        out.push_str(&blocked_dump(n));
    }
    for cell in 1..=ncells {
        out.push_str(&format!(" FOCK MATRIX - CELL N. {:3}({:3}  0  0)\n", cell, cell - 1));
        out.push_str(&blocked_dump(n));
    }
    out
}

fn full_parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Full Parse");

    let text = synthetic_report(26, 7);
    let parser = CrystalOutputParser::new(ParserConfig::new(7));
    group.bench_function("restricted_26x7", |b| {
        b.iter(|| black_box(parser.parse_reader(black_box(text.as_bytes()))))
    });

    group.finish();
}

fn spin_expansion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Spin Expansion");

    let n = 52;
    let ncells = 19;
    let alpha: Vec<Array2<Complex64>> = (0..ncells)
        .map(|k| Array2::from_elem((n, n), Complex64::new(k as f64, 0.0)))
        .collect();
    let beta = alpha.clone();
    let overlap = alpha.clone();

    group.bench_function("expand_spin_blocks", |b| {
        b.iter(|| black_box(expand_spin_blocks(&alpha, &beta, &overlap)))
    });

    group.finish();
}

criterion_group!(
    benches,
    matrix_reader_benchmark,
    full_parse_benchmark,
    spin_expansion_benchmark
);
criterion_main!(benches);
