use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vsearch_core::{Point, SearchItem, StimulusKind};
use vsearch_render::{CanvasStyle, DisplayGeometry, SkiaRenderer};

fn harness() -> (SkiaRenderer, Vec<u8>, Vec<SearchItem>) {
    let geometry = DisplayGeometry::from_monitor(1920, 1080, 53.0, 90.0);
    let r = SkiaRenderer::new(geometry, CanvasStyle::default(), None).expect("renderer");
    let fb = vec![0u8; 1920 * 1080 * 4];
    // 18 items on a ring, the largest default set size
    let items = (0..18)
        .map(|i| {
            let a = i as f64 / 18.0 * std::f64::consts::TAU;
            SearchItem {
                position: Point::new(5.0 * a.cos(), 5.0 * a.sin()),
                rotation: [0, 90, 180, 270][i % 4],
                stimulus: if i == 0 {
                    StimulusKind::Target
                } else if i % 2 == 0 {
                    StimulusKind::DistractorA
                } else {
                    StimulusKind::DistractorB
                },
            }
        })
        .collect();
    (r, fb, items)
}

pub fn bench_search_frame(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_search");
    g.sample_size(40);

    let (mut r, mut fb, items) = harness();
    g.bench_function("draw_18", |b| {
        b.iter(|| r.draw_search(black_box(&items)))
    });
    g.bench_function("draw_and_present_18", |b| {
        b.iter(|| {
            r.draw_search(black_box(&items));
            r.present(&mut fb).expect("present");
        })
    });

    g.finish();
}

criterion_group!(benches, bench_search_frame);
criterion_main!(benches);
