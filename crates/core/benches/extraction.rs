use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use contextprompt_core::{
    CaptureDepth, CaptureRequest, Document, ExtractConfig, PreprocessConfig, Readability, ScoreConfig, extract_chat,
    extract_content, handle_request, preprocess_document,
};

const CHAT_URL: &str = "https://chatgpt.com/c/bench";

fn bench_parse(c: &mut Criterion) {
    let article = std::fs::read_to_string("../../tests/fixtures/article.html").unwrap();
    let chat = std::fs::read_to_string("../../tests/fixtures/chatgpt.html").unwrap();

    let mut group = c.benchmark_group("parse");

    group.bench_with_input(BenchmarkId::new("article", "2KB"), &article, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.bench_with_input(BenchmarkId::new("chat", "5KB"), &chat, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.finish();
}

fn bench_main_content(c: &mut Criterion) {
    let mut group = c.benchmark_group("main_content");

    for name in ["article", "boilerplate"] {
        let html = std::fs::read_to_string(format!("../../tests/fixtures/{}.html", name)).unwrap();
        let doc = Document::parse(&html).unwrap();
        let reader = Readability::new();

        group.bench_with_input(BenchmarkId::new("extract", name), &doc, |b, doc| {
            b.iter(|| reader.extract_main_content(black_box(doc)))
        });
    }

    group.finish();
}

fn bench_preprocess(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/boilerplate.html").unwrap();
    let doc = Document::parse(&html).unwrap();
    let config = PreprocessConfig::default();

    c.bench_function("preprocess", |b| b.iter(|| preprocess_document(black_box(&doc), &config)));
}

fn bench_scoring(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/boilerplate.html").unwrap();
    let doc = Document::parse(&html).unwrap();
    let tree = preprocess_document(&doc, &PreprocessConfig::default());
    let extract_config = ExtractConfig::default();
    let score_config = ScoreConfig::default();

    c.bench_function("scoring_and_selection", |b| {
        b.iter(|| extract_content(black_box(&tree), &extract_config, &score_config))
    });
}

fn bench_chat(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/chatgpt.html").unwrap();
    let doc = Document::parse_with_url(&html, CHAT_URL).unwrap();

    c.bench_function("chat_transcript", |b| {
        b.iter(|| extract_chat(black_box(&doc), CaptureDepth::Standard))
    });
}

fn bench_capture(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/chatgpt.html").unwrap();
    let doc = Document::parse_with_url(&html, CHAT_URL).unwrap();
    let request = CaptureRequest::capture(CaptureDepth::Deep);

    c.bench_function("capture_request", |b| {
        b.iter(|| handle_request(black_box(&doc), &request, None))
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_main_content,
    bench_preprocess,
    bench_scoring,
    bench_chat,
    bench_capture
);
criterion_main!(benches);
