use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rsh_core::{CompletionTrigger, Framer, ScanState};

/// Build a command line of the given length, newline included
fn command_line(len: usize) -> Vec<u8> {
    let mut line: Vec<u8> = b"echo ".iter().copied().cycle().take(len - 1).collect();
    line.push(b'\n');
    line
}

/// Simulated remote output: text lines followed by the sentinel and a space
fn remote_output(lines: usize) -> Vec<u8> {
    let mut output = Vec::new();
    for i in 0..lines {
        output.extend_from_slice(format!("drwxr-xr-x  2 root root 4096 file{i}\n").as_bytes());
    }
    output.extend_from_slice(b"\x03\x04 ");
    output
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let framer = Framer::default();

    for len in [8usize, 128, 1000].iter() {
        let line = command_line(*len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &line, |b, l| {
            b.iter(|| {
                let framed = framer.frame(black_box(l));
                black_box(framed).ok();
            });
        });
    }

    group.finish();
}

fn bench_scan_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_state");

    for lines in [1usize, 100, 1000].iter() {
        let output = remote_output(*lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &output, |b, o| {
            b.iter(|| {
                let mut state = ScanState::new();
                for &byte in o.iter() {
                    if state
                        .feed(black_box(byte), CompletionTrigger::SpaceAfterSentinel)
                        .completes()
                    {
                        break;
                    }
                }
                black_box(state.output_bytes);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frame, bench_scan_state);
criterion_main!(benches);
