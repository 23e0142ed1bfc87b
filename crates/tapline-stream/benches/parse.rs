// Tapline - Streaming Test Anything Protocol Parser
//
// Copyright (c) 2025 Tapline contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tapline_stream::parse;

fn flat_stream(points: usize) -> String {
    let mut input = String::from("TAP version 13\n");
    input.push_str(&format!("1..{}\n", points));
    for i in 1..=points {
        input.push_str(&format!("ok {} - test case number {}\n", i, i));
    }
    input
}

fn diagnostic_stream(points: usize) -> String {
    let mut input = format!("1..{}\n", points);
    for i in 1..=points {
        input.push_str(&format!("not ok {} - failed\n", i));
        input.push_str("  ---\n  got: 1\n  want: 2\n  severity: fail\n  ...\n");
    }
    input
}

fn nested_stream(depth: usize) -> String {
    let mut input = String::new();
    for level in 0..depth {
        input.push_str(&"    ".repeat(level));
        input.push_str("1..1\n");
    }
    // innermost point first, then each enclosing level closes on dedent
    for level in (0..depth).rev() {
        input.push_str(&"    ".repeat(level));
        input.push_str(&format!("ok 1 - level {}\n", level));
    }
    input
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    let flat = flat_stream(1000);
    group.throughput(Throughput::Bytes(flat.len() as u64));
    group.bench_function("flat_1000_points", |b| {
        b.iter(|| parse(black_box(flat.as_str())))
    });

    let with_diag = diagnostic_stream(200);
    group.throughput(Throughput::Bytes(with_diag.len() as u64));
    group.bench_function("diagnostics_200_points", |b| {
        b.iter(|| parse(black_box(with_diag.as_str())))
    });

    let nested = nested_stream(8);
    group.throughput(Throughput::Bytes(nested.len() as u64));
    group.bench_function("nested_8_deep", |b| {
        b.iter(|| parse(black_box(nested.as_str())))
    });

    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
