use arc_decoder::{ArcDecoder, GzipMemberSource, MemoryUnitSource, ZstdFrameSource};
use arc_tests::{gzip_members, malformed_unit, sample_archive, with_container, zstd_frames};
use arc_types::Record;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn count_records(mut decoder: ArcDecoder<impl arc_decoder::UnitSource>) -> usize {
    let mut record = Record::new();
    let mut n = 0;
    while decoder.next_record(&mut record).unwrap() {
        n += 1;
    }
    n
}

fn bench_decode_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_memory");
    for body_len in [256, 4096, 65536] {
        let units = sample_archive(100, body_len);
        let bytes: usize = units.iter().map(Vec::len).sum();
        group.throughput(Throughput::Bytes(bytes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(body_len), &units, |b, units| {
            b.iter(|| {
                let decoder = ArcDecoder::open(MemoryUnitSource::new(units.clone())).unwrap();
                count_records(decoder)
            });
        });
    }
    group.finish();
}

fn bench_decode_compressed(c: &mut Criterion) {
    let units = sample_archive(100, 4096);
    let gz = gzip_members(&units);
    let zst = zstd_frames(&units);

    let mut group = c.benchmark_group("decode_compressed");
    group.bench_function("gzip", |b| {
        b.iter(|| {
            let src = GzipMemberSource::new(gz.as_slice(), gz.len() as u64);
            count_records(ArcDecoder::open(src).unwrap())
        });
    });
    group.bench_function("zstd", |b| {
        b.iter(|| {
            let src = ZstdFrameSource::new(zst.as_slice(), zst.len() as u64);
            count_records(ArcDecoder::open(src).unwrap())
        });
    });
    group.finish();
}

fn bench_resync(c: &mut Criterion) {
    let units = with_container((0..99).map(malformed_unit).chain(sample_archive(1, 64).into_iter().skip(1)));
    c.bench_function("resync_99_malformed", |b| {
        b.iter(|| count_records(ArcDecoder::open(MemoryUnitSource::new(units.clone())).unwrap()));
    });
}

fn bench_envelope(c: &mut Criterion) {
    let units = sample_archive(100, 1024);
    let records: Vec<Record> = ArcDecoder::open(MemoryUnitSource::new(units))
        .unwrap()
        .map(Result::unwrap)
        .collect();

    c.bench_function("envelope_first_access", |b| {
        b.iter(|| {
            records
                .iter()
                .map(|r| {
                    let mut fresh = r.clone();
                    fresh.set_payload(r.payload().to_vec());
                    fresh.status_code()
                })
                .sum::<i32>()
        });
    });
}

criterion_group!(
    benches,
    bench_decode_memory,
    bench_decode_compressed,
    bench_resync,
    bench_envelope
);
criterion_main!(benches);
