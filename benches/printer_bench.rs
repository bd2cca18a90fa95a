use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sql_seeder::generator::{GeneratorSettings, SeedGenerator, SeedRequest};
use sql_seeder::printer::{chunk_rows, print_chunk, PrintOptions};
use sql_seeder::source::{DuckDbSource, Row};
use sql_seeder::storage::LocalFileStore;
use std::fs;
use tempfile::TempDir;

fn generate_rows(count: usize, text_size: usize) -> Vec<Row> {
    let text = "it's (x)\n".repeat(text_size / 9 + 1);
    (0..count)
        .map(|i| {
            Row::new()
                .with("id", i as i64)
                .with("email", format!("user{}@example.com", i))
                .with("bio", text.clone())
                .with("score", i as f64 / 3.0)
                .with("active", i % 2 == 0)
        })
        .collect()
}

fn bench_print_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("print_chunk");
    let options = PrintOptions::default();

    for text_size in [10, 100, 1000] {
        let rows = generate_rows(500, text_size);

        group.throughput(Throughput::Elements(rows.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("500_rows", format!("{}B_text", text_size)),
            &rows,
            |b, rows| b.iter(|| print_chunk(rows, &options)),
        );
    }

    group.finish();
}

fn bench_chunk_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_sizes");
    let options = PrintOptions::default();
    let rows = generate_rows(5000, 50);

    for chunk_size in [10, 100, 500, 5000] {
        group.throughput(Throughput::Elements(rows.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("5000_rows", chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    chunk_rows(&rows, chunk_size)
                        .map(|chunk| print_chunk(chunk, &options).len())
                        .sum::<usize>()
                })
            },
        );
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.sample_size(20);

    for row_count in [100, 1000, 10000] {
        let source = DuckDbSource::open_in_memory().unwrap();
        source
            .execute_batch(&format!(
                "CREATE TABLE users AS SELECT i AS id, 'user' || CAST(i AS VARCHAR) AS name \
                 FROM range({}) t(i);",
                row_count
            ))
            .unwrap();

        group.throughput(Throughput::Elements(row_count as u64));
        group.bench_with_input(
            BenchmarkId::new("users_table", row_count),
            &source,
            |b, source| {
                b.iter_with_setup(
                    || {
                        let temp_dir = TempDir::new().unwrap();
                        let output_dir = temp_dir.path().join("seeders");
                        fs::create_dir_all(&output_dir).unwrap();
                        let settings = GeneratorSettings::default()
                            .with_output_dir(output_dir)
                            .with_register(false);
                        (temp_dir, settings)
                    },
                    |(_temp_dir, settings)| {
                        SeedGenerator::new(source, LocalFileStore, settings)
                            .generate(&SeedRequest::new("users"))
                            .unwrap()
                    },
                )
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_print_chunk, bench_chunk_sizes, bench_generate);
criterion_main!(benches);
