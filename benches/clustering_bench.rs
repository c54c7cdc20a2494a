use std::hint::black_box;

use clusterlab::{DBSCAN, Dataset, KMeans, ParameterSearch, metrics};
use criterion::{Criterion, criterion_group, criterion_main};
use ndarray::array;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn blobs(n_per_center: usize) -> Dataset {
    let centers = array![[0.0, 0.0, 0.0], [5.0, 5.0, 0.0], [0.0, 5.0, 5.0], [5.0, 0.0, 5.0]];
    let mut rng = StdRng::seed_from_u64(1);
    Dataset::make_blobs(&centers, n_per_center, 0.4, &mut rng).unwrap()
}

fn bench_kmeans(c: &mut Criterion) {
    let data = blobs(250);
    c.bench_function("kmeans_k4_1000pts_5_restarts", |b| {
        b.iter(|| {
            let mut kmeans = KMeans::new(4).n_init(5).random_state(3);
            kmeans.fit(black_box(&data.features)).unwrap();
            black_box(kmeans.inertia)
        })
    });
}

fn bench_dbscan(c: &mut Criterion) {
    let data = blobs(250);
    c.bench_function("dbscan_1000pts", |b| {
        b.iter(|| DBSCAN::new(0.8, 6).fit_predict(black_box(&data.features)).unwrap())
    });
}

fn bench_search(c: &mut Criterion) {
    let data = blobs(50);
    c.bench_function("parameter_search_200pts", |b| {
        b.iter(|| {
            ParameterSearch::new(4, 0.2)
                .run(black_box(&data.features), &data.targets)
                .unwrap()
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let data = blobs(250);
    let labels = DBSCAN::new(0.8, 6).fit_predict(&data.features).unwrap();
    c.bench_function("evaluate_1000pts", |b| {
        b.iter(|| metrics::evaluate(black_box(&labels), &data.targets, &data.features).unwrap())
    });
}

criterion_group!(benches, bench_kmeans, bench_dbscan, bench_search, bench_evaluate);
criterion_main!(benches);
