use criterion::{criterion_group, criterion_main, Criterion};
use sieve_core::config::LoaderConfig;
use sieve_core::schema::Schema;
use sieve_core::types::{Scalar, Table};
use sieve_loader::{BernoulliSampler, BoundedLoader, LoadRequest};
use std::io::Write;

fn make_table(rows: usize) -> Table {
    let schema = Schema::from_names(["headline", "publisher", "publication_date"]);
    let mut table = Table::with_capacity(&schema, rows);
    for i in 0..rows {
        table
            .push_record(vec![
                Scalar::Str(format!("headline {}", i)),
                Scalar::Str(format!("publisher {}", i % 13)),
                Scalar::Str(format!("2020-01-{:02}", i % 28 + 1)),
            ])
            .unwrap();
    }
    table
}

fn write_source(rows: usize) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "headline,publisher,publication_date").unwrap();
    for i in 0..rows {
        writeln!(f, "headline {},publisher {},2020-01-{:02}", i, i % 13, i % 28 + 1).unwrap();
    }
    f.flush().unwrap();
    f
}

fn bench_sampler(c: &mut Criterion) {
    let chunk = make_table(16 * 1024);
    c.bench_function("bernoulli_sample_16k", |b| {
        let mut sampler = BernoulliSampler::new(0.1, 0);
        b.iter(|| {
            let _ = sampler.sample(&chunk).unwrap();
        })
    });
}

fn bench_load_paths(c: &mut Criterion) {
    let source = write_source(50_000);
    let full = BoundedLoader::new(LoaderConfig::default()).unwrap();
    let sampled = BoundedLoader::new(LoaderConfig {
        row_ceiling: Some(0),
        ..Default::default()
    })
    .unwrap();
    let req = LoadRequest::default()
        .with_sample_frac(0.1)
        .with_chunk_size(10_000);

    c.bench_function("load_full_50k", |b| {
        b.iter(|| {
            let _ = full.load(source.path(), &req).unwrap();
        })
    });
    c.bench_function("load_sampled_50k", |b| {
        b.iter(|| {
            let _ = sampled.load(source.path(), &req).unwrap();
        })
    });
}

criterion_group!(loading, bench_sampler, bench_load_paths);
criterion_main!(loading);
