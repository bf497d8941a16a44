//! Benchmarks for the parameter splitter and the line stream.
//!
//! Run with: `cargo bench`

use std::hint::black_box;
use std::io::{BufReader, Cursor};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use combatlog_stream::config::ReaderConfig;
use combatlog_stream::parser::{EventStream, LineSplitter};

/// Sample combat log data for benchmarking.
fn generate_sample_log(line_count: usize) -> String {
    let mut lines = Vec::with_capacity(line_count);

    for i in 0..line_count {
        let timestamp = format!("4/12 20:{:02}:{:02}.{:03}", (i / 60) % 60, i % 60, i % 1000);
        if i % 3 == 0 {
            lines.push(format!(
                r#"{timestamp}  SPELL_DAMAGE,Player-1403-{i:08X},"Thrall-Draenor",0x512,0x0,Creature-0-4218-2657-1-215657-{i:010X},"Ulgrax the Devourer",0x10a48,0x0,133,"Fireball",0x4,{},-1,4,0,0,0,nil,nil,nil"#,
                1000 + i
            ));
        } else if i % 3 == 1 {
            lines.push(format!(
                r#"{timestamp}  SPELL_AURA_APPLIED,Player-1403-{i:08X},"Anduin-Draenor",0x511,0x0,Player-1403-{i:08X},"Anduin-Draenor",0x511,0x0,17,"Power Word: Shield",0x2,BUFF"#
            ));
        } else {
            lines.push(format!(
                r#"{timestamp}  CHAT_MSG,"Thrall-Draenor","pull in {}, then \"go\"""#,
                i % 10
            ));
        }
    }

    lines.join("\n")
}

fn bench_splitter(c: &mut Criterion) {
    let mut group = c.benchmark_group("splitter");
    let splitter = LineSplitter::default();

    let inputs = [
        ("plain", "Player-1403-0A1B2C3D,0x512,0x0,133,0x4,120431,-1,4,0,0,0,nil,nil,nil"),
        ("quoted", r#""Thrall-Draenor","Ulgrax the Devourer","Fireball","Nerub-ar Palace""#),
        ("escaped", r#""pull in 3, then \"go\"","she said \"hi\"","a,b,c""#),
    ];

    for (name, text) in inputs {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("split", name), text, |b, text| {
            b.iter(|| black_box(splitter.split(black_box(text))));
        });
    }

    let mut tokens = Vec::new();
    group.bench_function("split_into/reused", |b| {
        b.iter(|| {
            splitter.split_into(black_box(inputs[0].1), &mut tokens);
            black_box(tokens.len())
        });
    });

    group.finish();
}

fn bench_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream");

    for size in [100, 1000, 10000].iter() {
        let data = generate_sample_log(*size);
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(BenchmarkId::new("events", size), &data, |b, data| {
            b.iter(|| {
                let reader = BufReader::new(Cursor::new(data.as_bytes()));
                let stream = EventStream::new(reader, &ReaderConfig::default()).unwrap();
                black_box(stream.filter_map(Result::ok).count())
            });
        });

        group.bench_with_input(BenchmarkId::new("offset_half", size), &data, |b, data| {
            let config = ReaderConfig::default().with_offset(size / 2);
            b.iter(|| {
                let reader = BufReader::new(Cursor::new(data.as_bytes()));
                let stream = EventStream::new(reader, &config).unwrap();
                black_box(stream.filter_map(Result::ok).count())
            });
        });
    }

    group.finish();
}

fn bench_async_stream(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let data = generate_sample_log(10000);

    let mut group = c.benchmark_group("async_stream");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("events/10000", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut stream = combatlog_stream::async_io::AsyncEventStream::new(
                data.as_bytes(),
                &ReaderConfig::default(),
            )
            .unwrap();
            let mut count = 0;
            while let Some(event) = stream.next_event().await {
                if event.is_ok() {
                    count += 1;
                }
            }
            black_box(count)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_splitter, bench_stream, bench_async_stream);
criterion_main!(benches);
