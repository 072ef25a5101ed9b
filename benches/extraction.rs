use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pith::{ExtractOptions, Extractor};

fn synthetic_article(paragraphs: usize) -> String {
    let mut body = String::from("<html><head><title>Benchmark Article Page</title></head><body><article><h1>Benchmark Article</h1>");
    for i in 0..paragraphs {
        body.push_str(&format!(
            "<p>Paragraph {i} carries enough prose to be scored by the candidate \
             selector, with a comma or two, and a full stop at the end.</p>"
        ));
    }
    body.push_str("</article></body></html>");
    body
}

fn synthetic_index(links: usize) -> String {
    let mut body = String::from("<html><body><nav>");
    for i in 0..links {
        body.push_str(&format!("<a href='/item/{i}'>Item number {i}</a>"));
    }
    body.push_str("</nav><main>");
    for i in 0..links {
        body.push_str(&format!("<a href='/story/{i}'>Story teaser number {i}</a>"));
    }
    body.push_str("</main></body></html>");
    body
}

fn bench_extract_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    for (name, paragraphs) in [("small", 5usize), ("medium", 50), ("large", 500)] {
        let html = synthetic_article(paragraphs);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::new("article", name), &html, |b, html| {
            b.iter(|| {
                let extractor =
                    Extractor::new(std::hint::black_box(html), None, None).unwrap();
                std::hint::black_box(extractor.extract().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_aria_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("aria");

    for links in [20usize, 200] {
        let html = synthetic_index(links);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::new("index", links), &html, |b, html| {
            let options = ExtractOptions::builder().build_aria_tree(true).build();
            b.iter(|| {
                let extractor = Extractor::new(
                    std::hint::black_box(html),
                    None,
                    Some(options.clone()),
                )
                .unwrap();
                std::hint::black_box(extractor.extract().unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract_by_size, bench_aria_snapshot);
criterion_main!(benches);
