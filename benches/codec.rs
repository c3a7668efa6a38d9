//! Benchmarks for the image placeholder codec.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use markbar::image::{ImageMap, decode, embed, encode};

fn document_with_images(count: usize) -> (String, ImageMap) {
    let mut map = ImageMap::new();
    let mut text = String::from("# Gallery\n");
    let payload = vec![0xAB_u8; 16 * 1024];
    for i in 0..count {
        text.push_str(&format!("Paragraph {i}\n"));
        text.push_str(&encode(&mut map, &payload).text);
        text.push('\n');
    }
    (text, map)
}

fn bench_decode(c: &mut Criterion) {
    let (text, _) = document_with_images(32);
    c.bench_function("decode_32_images", |b| b.iter(|| decode(black_box(&text))));
}

fn bench_embed(c: &mut Criterion) {
    let (text, _) = document_with_images(32);
    let decoded = decode(&text);
    c.bench_function("embed_32_images", |b| {
        b.iter(|| embed(black_box(&decoded.text), &decoded.images))
    });
}

criterion_group!(benches, bench_decode, bench_embed);
criterion_main!(benches);
