use criterion::{black_box, criterion_group, criterion_main, Criterion};
use livewire_rust::{shortest_path_to, shortest_path_tree, CostField, PixelGraph, Point};
use ndarray::Array3;

/// Grayscale image with a dark disc, giving a circular edge to trace.
fn build_disc_u8(width: usize, height: usize) -> Array3<u8> {
    let cx = 0.5 * width as f32;
    let cy = 0.5 * height as f32;
    let r = 0.35 * width.min(height) as f32;

    Array3::from_shape_fn((height, width, 1), |(y, x, _)| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        if dx * dx + dy * dy <= r * r {
            40
        } else {
            210
        }
    })
}

fn bench_cost_field(c: &mut Criterion) {
    let img = build_disc_u8(640, 480);

    c.bench_function("cost_field_640x480", |b| {
        b.iter(|| {
            let field = CostField::from_image(black_box(img.view())).expect("valid image");
            black_box(field.len());
        });
    });
}

fn bench_search(c: &mut Criterion) {
    let img = build_disc_u8(640, 480);
    let graph = PixelGraph::from_image(img.view()).expect("valid image");
    let seed = Point::new(320, 72);
    let target = Point::new(152, 240);

    c.bench_function("shortest_path_to_quarter_arc", |b| {
        b.iter(|| {
            let found = shortest_path_to(black_box(&graph), seed, target);
            black_box(found.map(|t| t.path.len()));
        });
    });

    c.bench_function("shortest_path_tree_640x480", |b| {
        b.iter(|| {
            let tree = shortest_path_tree(black_box(&graph), seed);
            black_box(tree.map(|t| t.reachable_count()));
        });
    });
}

criterion_group!(benches, bench_cost_field, bench_search);
criterion_main!(benches);
