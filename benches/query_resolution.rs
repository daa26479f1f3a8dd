use std::fmt::Write as _;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use csv_insight::dataset::Dataset;
use csv_insight::keywords::KeywordTable;
use csv_insight::session::Session;
use encoding_rs::UTF_8;

fn generate_sales(rows: usize) -> String {
    let mut csv = String::from("order_id,region,amount,units,ordered_at\n");
    for i in 0..rows {
        let region = match i % 4 {
            0 => "north",
            1 => "south",
            2 => "east",
            _ => "west",
        };
        let day = (i % 28) + 1;
        let _ = writeln!(
            csv,
            "{i},{region},{}.{:02},{},2024-02-{day:02}",
            (i * 37) % 1000,
            i % 100,
            (i % 9) + 1
        );
    }
    csv
}

fn bench_queries(c: &mut Criterion) {
    let csv = generate_sales(20_000);
    let dataset = Dataset::from_reader(csv.as_bytes(), b',', UTF_8, "bench").expect("dataset");
    let queries = [
        "highest amount",
        "top 25 units",
        "pie chart of region",
        "show the trend of amount over ordered_at",
        "histogram of amount",
    ];

    let mut group = c.benchmark_group("query_resolution");
    for query in queries {
        group.bench_function(query, |b| {
            b.iter_batched(
                || {
                    let mut session = Session::with_seed(KeywordTable::default(), None, Some(7));
                    session.upload(dataset.clone());
                    session
                },
                |mut session| session.ask(query),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_keyword_lookup(c: &mut Criterion) {
    let table = KeywordTable::default();
    let text = "Interpret the following query and suggest the appropriate graph. \
                A frequency distribution split into bins would suit these ranges.";
    c.bench_function("keyword_lookup_last_entry", |b| b.iter(|| table.resolve(text)));
}

criterion_group!(benches, bench_queries, bench_keyword_lookup);
criterion_main!(benches);
