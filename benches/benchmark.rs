// Query throughput of the exact indexes and the domain recommenders
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use simrec::{
    Catalog, Domain, DomainRecommender, FeatureVector, Metric, RecommendationService, TextAdapter, Vector,
    VectorIndex, VocabularyModel,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

const WORDS: [&str; 16] = [
    "deep", "learning", "rust", "systems", "cooking", "travel", "history", "music", "space", "ocean", "market",
    "health", "garden", "poetry", "robots", "climate",
];

fn random_vector(rng: &mut StdRng, dim: usize) -> FeatureVector {
    let data: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
    FeatureVector::Dense(Vector::new(data))
}

fn random_title(rng: &mut StdRng) -> String {
    let len = rng.random_range(2..6);
    (0..len)
        .map(|_| WORDS[rng.random_range(0..WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

fn text_recommender(items: usize) -> DomainRecommender {
    let mut rng = StdRng::seed_from_u64(42);
    let vocabulary: HashMap<String, u32> = WORDS
        .iter()
        .enumerate()
        .map(|(i, w)| (w.to_string(), i as u32))
        .collect();
    let idf = (0..WORDS.len()).map(|i| 1.0 + i as f32 * 0.1).collect();
    let adapter = TextAdapter::new(VocabularyModel::new(vocabulary, idf)).unwrap();

    let titles: Vec<String> = (0..items).map(|_| random_title(&mut rng)).collect();
    let catalog = Catalog::from_titles(Domain::Blogs, titles);
    let vectors = catalog
        .iter()
        .map(|item| FeatureVector::Sparse(adapter.vectorize(&item.title)))
        .collect();
    DomainRecommender::text(catalog, adapter, vectors, Metric::Cosine).unwrap()
}

fn benchmark_dense_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_index");
    let mut rng = StdRng::seed_from_u64(7);

    // Below and above the parallel scan threshold
    for size in [2_000usize, 50_000] {
        let vectors: Vec<FeatureVector> = (0..size).map(|_| random_vector(&mut rng, 11)).collect();
        let index = VectorIndex::build(vectors, 11, Metric::Euclidean).unwrap();
        let query = random_vector(&mut rng, 11);

        group.bench_with_input(BenchmarkId::new("query_k10", size), &size, |b, _| {
            b.iter(|| black_box(index.query(black_box(&query), 10).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_text_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_recommend");

    for size in [1_000usize, 20_000] {
        let recommender = text_recommender(size);
        group.bench_with_input(BenchmarkId::new("recommend_5", size), &size, |b, _| {
            b.iter(|| black_box(recommender.recommend(black_box("deep learning in rust"), 5).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_reads");
    let service = Arc::new(RecommendationService::with_recommenders([text_recommender(5_000)]));

    group.bench_function("blogs_10_threads", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..10)
                .map(|_| {
                    let service = Arc::clone(&service);
                    thread::spawn(move || service.recommend_blogs("space robots", 5))
                })
                .collect();
            for handle in handles {
                black_box(handle.join().unwrap().unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_dense_index,
    benchmark_text_recommend,
    benchmark_concurrent_reads
);
criterion_main!(benches);
