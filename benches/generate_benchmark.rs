//! Benchmarks for deckfill generation.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use deckfill::substitute::{self, TitleLabels};
use deckfill::{ContentSlide, DeckContent, Generator, Image, Presentation};

#[path = "../tests/common/mod.rs"]
mod common;

fn content(images_per_slide: usize) -> DeckContent {
    let image = Image::from_bytes(common::PNG.to_vec(), Some("bench.png".to_string())).unwrap();
    DeckContent {
        title: "Benchmark Deck".to_string(),
        subtopics: "Parsing, Substitution, Packaging".to_string(),
        agenda: (1..=6).map(|i| format!("Agenda item {}", i)).collect(),
        slides: (1..=13)
            .map(|i| ContentSlide {
                topic: format!("Topic {}", i),
                syntax: "fn main() {\n    println!(\"hello\");\n}".to_string(),
                explanation: "Prints a greeting.".to_string(),
                images: vec![image.clone(); images_per_slide],
            })
            .collect(),
        summary: (1..=10).map(|i| format!("Point {}", i)).collect(),
    }
}

/// Benchmark template loading.
fn bench_template_loading(c: &mut Criterion) {
    let data = common::standard_template();
    let mut group = c.benchmark_group("template_loading");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("standard", |b| {
        b.iter(|| Presentation::from_bytes(black_box(data.clone())).unwrap());
    });
    group.finish();
}

/// Benchmark the full pipeline with and without picture replacement.
fn bench_generation(c: &mut Criterion) {
    let data = common::standard_template();
    let generator = Generator::default();
    let mut group = c.benchmark_group("generation");

    for images in [0usize, 1, 2] {
        let content = content(images);
        group.bench_with_input(BenchmarkId::new("images_per_slide", images), &content, |b, content| {
            b.iter(|| {
                let template = Presentation::from_bytes(data.clone()).unwrap();
                generator.generate_from(template, black_box(content)).unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark the recursive title pass on its own.
fn bench_title_substitution(c: &mut Criterion) {
    let slides = vec![common::titles_slide("Summary", 40)];
    let presentation = Presentation::from_bytes(common::build_pptx(&slides)).unwrap();
    let labels = TitleLabels::new((1..=40).map(|i| format!("Item {}", i)));

    c.bench_function("replace_titles_40", |b| {
        b.iter(|| {
            let mut shapes = presentation.slide(0).unwrap().shapes().clone();
            substitute::replace_titles(&mut shapes, black_box(&labels))
        });
    });
}

criterion_group!(
    benches,
    bench_template_loading,
    bench_generation,
    bench_title_substitution
);
criterion_main!(benches);
