use std::hint::black_box;

use bencher::{TestCase, TestFile};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use micro_httputil::{HeaderMap, header_elements};

static SMALL_HEADER: TestFile = TestFile::new("browser_small.txt", include_str!("../resources/header/browser_small.txt"));
static LARGE_HEADER: TestFile = TestFile::new("browser_large.txt", include_str!("../resources/header/browser_large.txt"));

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::small("small_header", SMALL_HEADER), TestCase::large("large_header", LARGE_HEADER)]
}

fn benchmark_header_elements(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("header_elements");

    for case in create_test_cases() {
        let fields = case.file().header_fields();
        group.throughput(Throughput::Bytes(case.file().content().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &fields, |b, fields| {
            b.iter(|| {
                for (name, value) in fields {
                    let elements = header_elements(name, value.trim()).expect("fixture should hold valid quality values");
                    black_box(elements);
                }
            });
        });
    }

    group.finish();
}

fn benchmark_header_map_from_wire(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("header_map_from_wire");

    for case in create_test_cases() {
        let fields = case.file().header_fields();
        group.throughput(Throughput::Elements(fields.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &fields, |b, fields| {
            b.iter(|| black_box(HeaderMap::from_wire(fields.iter().copied())));
        });
    }

    group.finish();
}

fn benchmark_header_map_output(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("header_map_output");

    for case in create_test_cases() {
        let fields = case.file().header_fields();
        group.throughput(Throughput::Elements(fields.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &fields, |b, fields| {
            b.iter_batched_ref(
                || HeaderMap::from_wire(fields.iter().copied()),
                |headers| {
                    let output = headers.output().expect("fixture headers should be encodable");
                    black_box(output);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(header, benchmark_header_elements, benchmark_header_map_from_wire, benchmark_header_map_output);
criterion_main!(header);
