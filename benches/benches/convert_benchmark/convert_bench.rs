use std::{hint::black_box, io::Cursor};

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nims_core::{
    mseed::{MseedEncoder, RecordEncoder, RecordTemplate},
    BinReader, BinWriter,
};
use nims_types::{BinHeader, Encoding, Endianness, CHANNEL_COUNT};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Случайное блуждание, похожее на магнитотеллурический ряд.
fn waveform(
    len: usize,
    step: i32,
) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut v = 0i32;
    (0..len)
        .map(|_| {
            v += rng.gen_range(-step..=step);
            v
        })
        .collect()
}

fn template(encoding: Encoding) -> RecordTemplate {
    RecordTemplate {
        network: "EM".into(),
        station: "BENCH".into(),
        location: String::new(),
        channel: "LFZ".into(),
        start_time: NaiveDate::from_ymd_opt(2008, 7, 8)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default(),
        sample_rate: 8.0,
        encoding,
        record_len: 4096,
        byte_order: Endianness::Big,
        blockette_100: false,
    }
}

fn bench_encode(c: &mut Criterion) {
    let samples = waveform(100_000, 300);
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(samples.len() as u64));

    for encoding in [Encoding::Int32, Encoding::Steim1, Encoding::Steim2] {
        let tpl = template(encoding);

        group.bench_with_input(BenchmarkId::from_parameter(encoding), &samples, |b, s| {
            b.iter(|| {
                let mut out = Vec::with_capacity(s.len() * 4);
                let stats = MseedEncoder::new()
                    .encode(&tpl, black_box(s), &mut out)
                    .unwrap();
                black_box(stats)
            })
        });
    }

    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let nscans = 50_000;
    let raw = waveform(nscans * CHANNEL_COUNT, 1000);
    let header = BinHeader::new(0.125, [2008, 7, 8, 0, 0, 0], nscans as i32, -999_999);

    let mut group = c.benchmark_group("read_bin");
    group.throughput(Throughput::Bytes((raw.len() * 4) as u64));

    for order in [Endianness::Little, Endianness::Big] {
        let mut writer = BinWriter::new(Vec::new(), order);
        writer.write_header(&header).unwrap();
        writer.write_data(&raw).unwrap();
        let bytes = writer.finish().unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(order), &bytes, |b, bytes| {
            b.iter(|| {
                let file = BinReader::new(Cursor::new(black_box(bytes)))
                    .unwrap()
                    .read_block()
                    .unwrap();
                black_box(file.block.valid_count())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_read);
criterion_main!(benches);
