use std::fs;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use earclip::{Earcut, Options};

fn load_fixture(name: &str) -> (Vec<f64>, Vec<usize>) {
    // load JSON
    type Coords = Vec<Vec<[f64; 2]>>;
    let s = fs::read_to_string("./tests/fixtures/".to_string() + name + ".json").unwrap();
    let rings = serde_json::from_str::<Coords>(&s).unwrap();

    // prepare input
    let num_rings = rings.len();
    let data: Vec<_> = rings.iter().flatten().flatten().copied().collect();
    let hole_indices: Vec<_> = rings
        .iter()
        .map(|x| x.len())
        .scan(0, |sum, e| {
            *sum += e;
            Some(*sum)
        })
        .take(num_rings - 1)
        .collect();

    (data, hole_indices)
}

/// A star with `n` spikes and a bit of radial noise, flattened.
fn star(n: usize) -> Vec<f64> {
    (0..n)
        .flat_map(|k| {
            let t = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
            let r = if k % 2 == 0 { 1000.0 } else { 400.0 + (k * 37 % 101) as f64 };
            [t.cos() * r, t.sin() * r]
        })
        .collect()
}

fn bench(c: &mut Criterion) {
    let mut earcut = Earcut::new();
    let mut triangles: Vec<usize> = Vec::new();

    for name in ["building", "lake", "spiral", "comb", "star"] {
        let (data, hole_indices) = load_fixture(name);
        c.bench_function(name, |b| {
            b.iter(|| {
                earcut
                    .earcut(&data, &hole_indices, 2, &mut triangles)
                    .unwrap();
            })
        });
    }

    let mut group = c.benchmark_group("star");
    for n in [1_000, 10_000] {
        let data = star(n);
        group.bench_with_input(BenchmarkId::new("indexed", n), &data, |b, data| {
            let mut earcut = Earcut::new();
            b.iter(|| {
                earcut.earcut(data, &[], 2, &mut triangles).unwrap();
                assert_eq!(triangles.len(), (n - 2) * 3);
            })
        });
        group.bench_with_input(BenchmarkId::new("exhaustive", n), &data, |b, data| {
            let mut earcut = Earcut::with_options(Options::default().without_spatial_index());
            b.iter(|| {
                earcut.earcut(data, &[], 2, &mut triangles).unwrap();
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
