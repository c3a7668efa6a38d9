//! Benchmarks for buffer operations.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use markbar::editor::{
    Alignment, Selection, prefix_current_line, wrap_line_containing_marker, wrap_selection,
};
use markbar::image::IMAGE_MARKERS;

fn large_buffer() -> String {
    let mut text = String::from("🖼️[Image 1]\n");
    for i in 0..5_000 {
        text.push_str(&format!("Line {i} with some *markdown* text\n"));
    }
    text
}

fn bench_wrap_selection(c: &mut Criterion) {
    let text = large_buffer();
    let mid = text.len() / 2;
    let selection = Selection::new(mid - 10, mid);
    c.bench_function("wrap_selection", |b| {
        b.iter(|| wrap_selection(black_box(&text), selection, "**", "**"))
    });
}

fn bench_prefix_current_line(c: &mut Criterion) {
    let text = large_buffer();
    let selection = Selection::caret(text.len() - 5);
    c.bench_function("prefix_current_line", |b| {
        b.iter(|| prefix_current_line(black_box(&text), selection, "# "))
    });
}

fn bench_marker_scan(c: &mut Criterion) {
    let text = large_buffer();
    let selection = Selection::caret(text.len());
    c.bench_function("wrap_line_containing_marker", |b| {
        b.iter(|| {
            wrap_line_containing_marker(black_box(&text), selection, IMAGE_MARKERS, Alignment::Center)
        })
    });
}

criterion_group!(
    benches,
    bench_wrap_selection,
    bench_prefix_current_line,
    bench_marker_scan
);
criterion_main!(benches);
