use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geojson::GeoJson;
use quake_map::map::{MapRenderer, Overlays, Viewport};
use quake_map::style::{color_for_depth, radius_for_magnitude};

/// Synthetic month-sized earthquake feed
fn quake_feed(count: usize) -> GeoJson {
    let features: Vec<String> = (0..count)
        .map(|i| {
            let lon = -180.0 + (i as f64 * 7.31) % 360.0;
            let lat = -60.0 + (i as f64 * 3.17) % 120.0;
            let depth = (i as f64 * 1.7) % 120.0 - 5.0;
            let mag = (i % 70) as f64 / 10.0;
            format!(
                r#"{{"type":"Feature","properties":{{"mag":{},"place":"quake {}"}},"geometry":{{"type":"Point","coordinates":[{},{},{}]}}}}"#,
                mag, i, lon, lat, depth
            )
        })
        .collect();
    format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
        .parse()
        .expect("valid synthetic feed")
}

fn bench_style(c: &mut Criterion) {
    c.bench_function("color_for_depth sweep", |b| {
        b.iter(|| {
            for d in -20..200 {
                black_box(color_for_depth(black_box(d as f64)));
            }
        })
    });
    c.bench_function("radius_for_magnitude sweep", |b| {
        b.iter(|| {
            for m in 0..100 {
                black_box(radius_for_magnitude(black_box(m as f64 / 10.0)));
            }
        })
    });
}

fn bench_overlays(c: &mut Criterion) {
    let feed = quake_feed(10_000);

    c.bench_function("populate 10k quakes", |b| {
        b.iter(|| {
            let mut overlays = Overlays::new();
            black_box(overlays.populate_quakes(&feed))
        })
    });

    let mut overlays = Overlays::new();
    overlays.populate_quakes(&feed);
    let renderer = MapRenderer::new();
    let viewport = Viewport::from_level(-95.7129, 37.0902, 4.0, 400, 200);

    c.bench_function("render 10k quakes", |b| {
        b.iter(|| black_box(renderer.render(200, 50, &viewport, &overlays)))
    });

    c.bench_function("pick quake", |b| {
        b.iter(|| black_box(overlays.quake_at(&viewport, 200, 100).is_some()))
    });
}

criterion_group!(benches, bench_style, bench_overlays);
criterion_main!(benches);
