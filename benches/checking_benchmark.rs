use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use std::io::Cursor;

use playcheck::config::parse_task;
use playcheck::{Checker, Compression};

const TASK: &str = "\
base:mob:zombie:::0:
req:mob:zombie:1:200::
1:approach:player::mob:zombie:0
2:proxy:player::mob:zombie:2.0
3:destroy:mob:zombie::::
";

/// Builds a synthetic log: a crowd of zombies shuffling around while the
/// player walks through them and picks them off one by one.
fn synthetic_log(zombies: usize, ticks: usize) -> String {
    let mut log = String::new();
    log.push_str("Player Start Position: (0,0)\n");
    log.push_str("ID | Name | Object ID | Type | Position | HP | Damage\n---\n");
    for i in 0..zombies {
        writeln!(
            log,
            "zombie_{} | zombie | n{} | mob | ({},{}) | 10 | 1",
            i, i, i, i
        )
        .unwrap();
    }
    log.push_str("---\n");
    for t in 0..ticks {
        write!(log, "[{}] Player position: ({},0)", t, t).unwrap();
        for i in 0..zombies {
            write!(log, "; zombie_{} position: ({},{})", i, i, i + t % 2).unwrap();
        }
        log.push('\n');
        if t < zombies {
            writeln!(log, "[{}] zombie_{} died", t, t).unwrap();
        }
    }
    log.push_str("Session ended\n");
    log
}

/// This benchmark tests the full in-memory check on a mid-sized log.
///
/// This is the path every caller of check_stream takes: parse the log,
/// validate the scene, replay the events against the conditions. The
/// quadratic pair search of the positional conditions dominates, so this is
/// the number to watch when the evaluator changes.
fn check_crowd_benchmark(c: &mut Criterion) {
    let task = parse_task("crowd", Cursor::new(TASK)).unwrap();
    let checker = Checker::new("bench-secret", vec![task]).unwrap();
    let log = synthetic_log(50, 100);
    let log_data = log.as_bytes();

    c.bench_function("in-memory crowd check", |b| {
        b.iter(|| {
            checker
                .check_stream("crowd", black_box(42), Cursor::new(log_data), Compression::None)
                .unwrap()
        })
    });
}

/// This benchmark isolates the log grammar.
///
/// This is important because parsing is pure string work and independent of
/// the configured task; regressions here affect every check regardless of
/// how cheap its conditions are.
fn parse_crowd_benchmark(c: &mut Criterion) {
    let log = synthetic_log(50, 100);
    let log_data = log.as_bytes();

    c.bench_function("parse crowd log", |b| {
        b.iter(|| playcheck::raw::parse_log(black_box(Cursor::new(log_data))).unwrap())
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(30);
    targets = check_crowd_benchmark, parse_crowd_benchmark
}
criterion_main!(benches);
