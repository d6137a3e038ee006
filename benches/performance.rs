/// 採点パイプラインとキーワード抽出の性能ベンチマーク。
use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use trend_worker::pipeline::{
    TrendPipeline,
    keywords::{extract_keywords, top_keywords},
    rank::SortMode,
    types::{ContentItem, Platform},
};

fn synthetic_items(count: u64) -> Vec<ContentItem> {
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            ContentItem::new(
                format!("v{i}"),
                format!("video {i}"),
                format!("https://www.youtube.com/watch?v=v{i}"),
                Platform::Video,
            )
            .with_counts(i * 37 % 100_000, i % 500)
            .with_duration_seconds(i % 240)
            .with_published_at(now - Duration::minutes(i64::try_from(i * 13).unwrap_or(0)))
        })
        .collect()
}

fn synthetic_titles(count: usize) -> Vec<String> {
    let words = ["속보", "태풍", "제주", "국회", "날씨", "손흥민", "삼성전자", "실적"];
    (0..count)
        .map(|i| {
            format!(
                "<b>{}</b> {} {} 2026 update",
                words[i % words.len()],
                words[(i * 3) % words.len()],
                words[(i * 5 + 1) % words.len()]
            )
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let items = synthetic_items(1000);
    let pipeline = TrendPipeline::default();
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

    c.bench_function("trend_pipeline_1k_items", |b| {
        b.iter(|| {
            let report = pipeline.run_at(black_box(items.clone()), SortMode::Trend, now);
            black_box(report.len());
        });
    });
}

fn bench_keywords(c: &mut Criterion) {
    let titles = synthetic_titles(1000);

    c.bench_function("keyword_top_n_1k_titles", |b| {
        b.iter(|| {
            let tokens = extract_keywords(black_box(&titles));
            black_box(top_keywords(&tokens, 20).len());
        });
    });
}

criterion_group!(benches, bench_pipeline, bench_keywords);
criterion_main!(benches);
