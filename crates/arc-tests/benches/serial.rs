use arc_decoder::{ArcDecoder, MemoryUnitSource};
use arc_tests::sample_archive;
use arc_types::Record;
use arc_types::serial::{decode_from, encode_into, encoded_len};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

fn records() -> Vec<Record> {
    ArcDecoder::open(MemoryUnitSource::new(sample_archive(100, 2048)))
        .unwrap()
        .map(Result::unwrap)
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let records = records();
    let total: usize = records.iter().map(encoded_len).sum();

    let mut group = c.benchmark_group("serial");
    group.throughput(Throughput::Bytes(total as u64));
    group.bench_function("encode_100", |b| {
        let mut buf = Vec::with_capacity(total);
        b.iter(|| {
            buf.clear();
            for record in &records {
                encode_into(record, &mut buf).unwrap();
            }
            buf.len()
        });
    });

    let mut stream = Vec::with_capacity(total);
    for record in &records {
        encode_into(record, &mut stream).unwrap();
    }
    group.bench_function("decode_100", |b| {
        b.iter(|| {
            let mut rest = stream.as_slice();
            let mut n = 0;
            while !rest.is_empty() {
                let (_, used) = decode_from(rest).unwrap();
                rest = &rest[used..];
                n += 1;
            }
            n
        });
    });
    group.finish();
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
