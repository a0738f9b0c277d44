use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jsondoc::{from_str, to_json_string, Date, Document, FieldPath, Value};

fn sample_document(rows: usize) -> Document {
    let mut doc = Document::new();
    doc.set_id("order0001");
    doc.set("customer.name", "Alice").unwrap();
    doc.set("customer.joined", Date::parse("2024-03-15").unwrap())
        .unwrap();
    for i in 0..rows {
        let base = format!("items[{}]", i);
        doc.set(format!("{}.sku", base), format!("SKU-{:05}", i))
            .unwrap();
        doc.set(format!("{}.price", base), 9.99 + i as f64).unwrap();
        doc.set(format!("{}.quantity", base), Value::Long(i as i64))
            .unwrap();
    }
    doc
}

fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for size in [10, 100, 500] {
        let doc = sample_document(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            b.iter(|| doc.to_json_string().unwrap())
        });
    }
    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for size in [10, 100, 500] {
        let json = sample_document(size).to_json_string().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &json, |b, json| {
            b.iter(|| from_str(black_box(json)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_tagged_scalars(c: &mut Criterion) {
    let json = concat!(
        r#"{"l":{"$long":5},"d":{"$date":"2024-03-15"},"#,
        r#""ts":{"$timestamp":"2024-03-15T10:30:00.000Z"},"#,
        r#""dec":{"$decimal":"123.450"},"bin":{"$binary":"AQIDBAU="}}"#
    );
    c.bench_function("decode_tagged_scalars", |b| {
        b.iter(|| from_str(black_box(json)).unwrap())
    });
}

fn benchmark_path_parse(c: &mut Criterion) {
    c.bench_function("path_parse", |b| {
        b.iter(|| FieldPath::parse(black_box("a.b[3].`odd name`.c[]")).unwrap())
    });
}

fn benchmark_path_get(c: &mut Criterion) {
    let doc = sample_document(100);
    let path = FieldPath::parse("items[50].sku").unwrap();
    c.bench_function("path_get", |b| {
        b.iter(|| doc.get(black_box(&path)).unwrap())
    });
}

fn benchmark_event_walk(c: &mut Criterion) {
    use jsondoc::DocumentReader;
    let doc = sample_document(100);
    c.bench_function("event_walk", |b| {
        b.iter(|| {
            let mut reader = doc.as_reader();
            let mut count = 0usize;
            while reader.next().unwrap().is_some() {
                count += 1;
            }
            count
        })
    });
}

fn benchmark_dom_round_trip(c: &mut Criterion) {
    let doc = sample_document(50);
    c.bench_function("round_trip", |b| {
        b.iter(|| {
            let json = doc.to_json_string().unwrap();
            from_str(&json).unwrap()
        })
    });
}

fn benchmark_to_json_value(c: &mut Criterion) {
    let value = Value::Map(sample_document(50));
    c.bench_function("to_json_string_value", |b| {
        b.iter(|| to_json_string(black_box(&value)).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_encode,
    benchmark_decode,
    benchmark_tagged_scalars,
    benchmark_path_parse,
    benchmark_path_get,
    benchmark_event_walk,
    benchmark_dom_round_trip,
    benchmark_to_json_value,
);
criterion_main!(benches);
