use criterion::{Criterion, black_box, criterion_group, criterion_main};

use keyscore::engine::alignment::Aligner;
use keyscore::engine::compare::compare;
use keyscore::engine::scoring::score;

const WORDS: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "while", "typing",
];

fn make_text(chars: usize) -> String {
    let mut text = String::new();
    let mut i = 0;
    while text.len() < chars {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(WORDS[i % WORDS.len()]);
        i += 1;
    }
    text.truncate(chars);
    text
}

/// Every 13th char replaced and every 29th dropped.
fn make_typo_input(target: &str) -> String {
    target
        .chars()
        .enumerate()
        .filter(|(i, _)| i % 29 != 28)
        .map(|(i, ch)| if i % 13 == 12 { 'x' } else { ch })
        .collect()
}

fn bench_align(c: &mut Criterion) {
    let aligner = Aligner::default();
    for len in [200, 1000, 4000] {
        let target: Vec<char> = make_text(len).chars().collect();
        let input: Vec<char> = make_typo_input(&make_text(len)).chars().collect();
        c.bench_function(&format!("align ({len} chars)"), |b| {
            b.iter(|| aligner.align(black_box(&input), black_box(&target)))
        });
    }
}

fn bench_live_compare(c: &mut Criterion) {
    let aligner = Aligner::default();
    let target = make_text(1000);
    let input = make_typo_input(&target[..400]);

    c.bench_function("compare (400 of 1000 chars typed)", |b| {
        b.iter(|| compare(&aligner, black_box(&input), black_box(&target)))
    });
}

fn bench_score(c: &mut Criterion) {
    let target = make_text(2000);
    let input = make_typo_input(&target);

    c.bench_function("score (2000 chars)", |b| {
        b.iter(|| score(black_box(&input), black_box(&target), 120.0))
    });
}

criterion_group!(benches, bench_align, bench_live_compare, bench_score);
criterion_main!(benches);
