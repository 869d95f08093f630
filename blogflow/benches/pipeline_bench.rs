//! Benchmarks for the pure pipeline helpers.

use blogflow::frontmatter;
use blogflow::results::word_count;
use blogflow::stages::domain_names::candidate_keywords;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const ARTICLE: &str = "---\ntitle: \"Ten Weeknight Dinners\"\nslug: ten-weeknight-dinners\n\
description: Quick meals for busy evenings\nkeywords: cooking, dinner, recipes, quick meals\n---\n\n";

fn frontmatter_benchmark(c: &mut Criterion) {
    let text = format!("{ARTICLE}{}", "Chop the onions and warm the pan. ".repeat(200));

    c.bench_function("frontmatter_parse", |b| b.iter(|| frontmatter::parse(black_box(&text))));
    c.bench_function("word_count", |b| b.iter(|| word_count(black_box(&text))));
}

fn keyword_benchmark(c: &mut Criterion) {
    let words = ["Home Cooking", "Weeknight Dinners", "Meal Prep", "Baking", "Vegan"];

    c.bench_function("candidate_keywords", |b| {
        b.iter(|| candidate_keywords(black_box(words)))
    });
}

criterion_group!(benches, frontmatter_benchmark, keyword_benchmark);
criterion_main!(benches);
