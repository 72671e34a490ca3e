//! Criterion benchmarks for the per-hit scoring pipeline.
//!
//! Measures the CPU-bound path one candidate takes through the engine:
//! token alignment, field evaluation, main scoring, phonetic overlap, and
//! final combination. The oracle is out of the picture — this is the cost
//! the re-ranker adds per hit.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use meili_rerank_core::normalize::{FrenchNormalizer, Normalizer};
use meili_rerank_core::phonetic::score_phonetic;
use meili_rerank_core::query::preprocess;
use meili_rerank_core::scoring::score_candidate;
use meili_rerank_core::synonyms::SynonymTable;
use meili_rerank_core::{Candidate, bounded_levenshtein, combine};
use serde_json::json;

fn sample_candidates() -> Vec<Candidate> {
    (0..64)
        .map(|i| {
            serde_json::from_value(json!({
                "id": i,
                "name": format!("Lycée Saint Jean {i}"),
                "name_search": format!("lycee saint jean {i}"),
                "name_no_space": format!("lyceesaintjean{i}"),
                "name_soundex": "L200 S500 J500"
            }))
            .unwrap()
        })
        .collect()
}

fn bench_levenshtein_bounded(c: &mut Criterion) {
    c.bench_function("levenshtein_bounded_pairs", |b| {
        let pairs = [
            ("saintjean", "saint"),
            ("bordeaux", "bordot"),
            ("etablissement", "etablisement"),
            ("paris", "marseille"),
        ];
        b.iter(|| {
            for (a, word) in pairs {
                black_box(bounded_levenshtein(black_box(a), black_box(word), 4));
            }
        });
    });
}

fn bench_main_scoring_64_hits(c: &mut Criterion) {
    c.bench_function("main_scoring_64_hits", |b| {
        let forms = preprocess("lycee saint jean", &FrenchNormalizer);
        let synonyms = SynonymTable::new();
        let candidates = sample_candidates();
        b.iter(|| {
            for candidate in &candidates {
                black_box(score_candidate(&forms, candidate, &synonyms, 4));
            }
        });
    });
}

fn bench_full_hit_pipeline(c: &mut Criterion) {
    c.bench_function("score_combine_single_hit", |b| {
        let forms = preprocess("lycee saint jean", &FrenchNormalizer);
        let synonyms = SynonymTable::new();
        let candidate = &sample_candidates()[0];
        b.iter(|| {
            let main = score_candidate(&forms, candidate, &synonyms, 4);
            let phonetic = score_phonetic(&forms.soundex, &candidate.name_soundex);
            black_box(combine(&main, phonetic.as_ref()));
        });
    });
}

fn bench_soundex_coding(c: &mut Criterion) {
    c.bench_function("soundex_fr_phrase", |b| {
        let normalizer = FrenchNormalizer;
        b.iter(|| {
            black_box(normalizer.soundex_fr(black_box("lycée professionnel saint jean de bordeaux")));
        });
    });
}

criterion_group!(
    benches,
    bench_levenshtein_bounded,
    bench_main_scoring_64_hits,
    bench_full_hit_pipeline,
    bench_soundex_coding
);
criterion_main!(benches);
