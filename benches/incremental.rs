// Full versus incremental checks over a growing document.
//
// Run:
//   cargo bench --bench incremental

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use spellflow::checker::dictionary::WordListDictionary;
use spellflow::diff::{calculate_regions, DEFAULT_CONTEXT_WORDS};
use spellflow::{EngineHandle, EngineOptions, SpellCheckEngine};
use std::hint::black_box;
use tokio::runtime::Runtime;

const VOCABULARY: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "while", "editor",
    "keeps", "typing", "words", "into", "long", "document", "and", "every", "change",
    "should", "feel", "instant",
];

fn document(paragraphs: usize) -> String {
    let mut text = String::new();
    for p in 0..paragraphs {
        for (i, word) in VOCABULARY.iter().cycle().skip(p).take(40).enumerate() {
            if i > 0 {
                text.push(' ');
            }
            // Sprinkle a few misspellings so the invalid path is exercised too.
            if i % 13 == 7 {
                text.push_str("mispeled");
            } else {
                text.push_str(word);
            }
        }
        text.push_str(".\n\n");
    }
    text
}

/// Insert a word halfway through, the way a single keystroke burst would.
fn edit(text: &str) -> String {
    let middle = text.len() / 2;
    let at = text[middle..].find(' ').map_or(middle, |offset| middle + offset);
    format!("{} wrold{}", &text[..at], &text[at..])
}

fn word_list() -> String {
    VOCABULARY.join("\n")
}

fn engine() -> SpellCheckEngine {
    let mut engine = SpellCheckEngine::new(EngineOptions::default());
    let dictionary = WordListDictionary::from_sources("", &word_list()).unwrap();
    engine.set_dictionary(Box::new(dictionary));
    engine
}

fn bench_full_vs_incremental(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("check");

    for paragraphs in [10, 100, 1000] {
        let before = document(paragraphs);
        let after = edit(&before);
        let regions = calculate_regions(&before, &after, DEFAULT_CONTEXT_WORDS);

        group.bench_with_input(BenchmarkId::new("full", paragraphs), &after, |b, text| {
            let mut engine = engine();
            b.iter(|| black_box(rt.block_on(engine.check_full(text))));
        });

        group.bench_with_input(
            BenchmarkId::new("incremental", paragraphs),
            &after,
            |b, text| {
                let mut engine = engine();
                rt.block_on(engine.check_full(&before));
                b.iter(|| black_box(rt.block_on(engine.check_incremental(text, &regions))));
            },
        );
    }

    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let before = document(1000);
    let after = edit(&before);

    c.bench_function("calculate_regions_1000_paragraphs", |b| {
        b.iter(|| calculate_regions(black_box(&before), black_box(&after), DEFAULT_CONTEXT_WORDS));
    });
}

fn bench_actor_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let handle = rt.block_on(async {
        let handle = EngineHandle::spawn(EngineOptions::default());
        handle.init_dictionary("", word_list()).await.unwrap();
        handle
    });
    let before = document(100);
    let after = edit(&before);
    rt.block_on(handle.check_text(before.as_str())).unwrap();

    let handle = &handle;
    let (before, after) = (before.as_str(), after.as_str());
    c.bench_function("actor_check_revision_100_paragraphs", |b| {
        b.to_async(&rt)
            .iter(|| async move { handle.check_revision(before, after).await.unwrap() });
    });
}

criterion_group!(
    benches,
    bench_full_vs_incremental,
    bench_diff,
    bench_actor_round_trip
);
criterion_main!(benches);
