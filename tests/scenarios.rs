use clusterlab::{
    ClusterError, ClusteringConfig, DBSCAN, Dataset, KMeans, Labels, Matrix, NOISE,
    ParameterSearch, metrics,
};
use ndarray::array;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn three_blobs(seed: u64) -> Dataset {
    let centers = array![[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]];
    let mut rng = StdRng::seed_from_u64(seed);
    Dataset::make_blobs(&centers, 30, 0.15, &mut rng).unwrap()
}

#[test]
fn kmeans_two_separated_pairs() {
    let x = array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
    let mut kmeans = KMeans::new(2).n_init(5).random_state(42);
    let labels = kmeans.fit_predict(&x).unwrap();

    assert_eq!(labels.len(), 4);
    assert_eq!(labels[0], labels[1]);
    assert_eq!(labels[2], labels[3]);
    assert_ne!(labels[0], labels[2]);
    assert!(kmeans.n_iter.unwrap() <= 3);

    // Two within-pair squared half-distances per pair: 4 * 0.5^2.
    assert!((kmeans.inertia.unwrap() - 1.0).abs() < 1e-12);

    let centers = kmeans.cluster_centers.unwrap();
    let left = centers.row(labels[0] as usize);
    let right = centers.row(labels[2] as usize);
    assert!((left[0] - 0.0).abs() < 1e-12 && (left[1] - 0.5).abs() < 1e-12);
    assert!((right[0] - 10.0).abs() < 1e-12 && (right[1] - 0.5).abs() < 1e-12);
}

#[test]
fn dbscan_two_dense_groups_and_outliers() {
    let x = array![
        [0.0, 0.0],
        [0.3, 0.0],
        [0.0, 0.3],
        [0.3, 0.3],
        [5.0, 5.0],
        [5.3, 5.0],
        [5.0, 5.3],
        [5.3, 5.3],
        [20.0, 0.0],
        [-20.0, 20.0]
    ];
    let mut dbscan = DBSCAN::new(1.0, 3);
    let labels = dbscan.fit_predict(&x).unwrap();

    assert_eq!(labels.to_vec(), vec![0, 0, 0, 0, 1, 1, 1, 1, NOISE, NOISE]);
    assert_eq!(dbscan.n_clusters(), Some(2));
    assert_eq!(dbscan.n_noise_points(), Some(2));
}

#[test]
fn parameter_search_on_three_blobs() {
    let data = three_blobs(2024);
    let search = ParameterSearch::new(3, 0.2);
    let outcome = search.run(&data.features, &data.targets).unwrap();

    let best = outcome.best.clone().expect("an eligible candidate");
    assert!((2..=4).contains(&best.n_clusters));
    assert!(best.noise_fraction <= 0.2);
    assert!(best.ari > 0.95, "best ari = {}", best.ari);
    for candidate in outcome.candidates.iter().filter(|c| c.eligible) {
        assert!(best.ari >= candidate.ari);
    }

    let (eps, min_samples) = outcome.best_parameters().unwrap();
    let labels = DBSCAN::new(eps, min_samples).fit_predict(&data.features).unwrap();
    let report = metrics::evaluate(&labels, &data.targets, &data.features).unwrap();
    assert_eq!(report.n_clusters, best.n_clusters);
    assert!((report.adjusted_rand_index - best.ari).abs() < 1e-12);
    assert!(report.silhouette.is_some());
}

#[test]
fn labels_always_match_point_count() {
    let data = three_blobs(7);
    let n = data.n_samples();

    let kmeans_labels = KMeans::new(3).fit_predict(&data.features).unwrap();
    assert_eq!(kmeans_labels.len(), n);
    assert!(kmeans_labels.iter().all(|&l| l != NOISE));

    let dbscan_labels = DBSCAN::new(0.4, 5).fit_predict(&data.features).unwrap();
    assert_eq!(dbscan_labels.len(), n);
}

#[test]
fn injected_generator_is_reproducible() {
    let data = three_blobs(11);
    let kmeans = KMeans::new(3).n_init(3);

    let first = kmeans
        .cluster(&data.features, &mut StdRng::seed_from_u64(77))
        .unwrap();
    let second = kmeans
        .cluster(&data.features, &mut StdRng::seed_from_u64(77))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn config_driven_pipeline() {
    let config = ClusteringConfig::from_toml_str(
        r#"
        [kmeans]
        n_clusters = 3
        n_init = 4
        random_state = 5

        [search]
        target_clusters = 3
        max_noise = 0.2
        "#,
    )
    .unwrap();
    let data = three_blobs(99);

    let mut kmeans = KMeans::from_config(&config.kmeans);
    let labels = kmeans.fit_predict(&data.features).unwrap();
    let report = metrics::evaluate(&labels, &data.targets, &data.features).unwrap();
    assert_eq!(report.n_noise, 0);
    assert!(report.overall_purity > 0.95);

    let mut auto = clusterlab::AutoDbscan::from_config(&config);
    auto.fit(&data.features, &data.targets).unwrap();
    let report = auto.evaluate(&data.targets).unwrap();
    assert!(report.noise_fraction <= 0.2);
}

#[test]
fn silhouette_needs_two_clusters() {
    let x: Matrix = array![[0.0], [0.1], [0.2], [9.0]];
    let labels: Labels = array![0, 0, 0, NOISE];
    let truth: Labels = array![1, 1, 1, 2];

    assert!(matches!(
        metrics::silhouette_score(&x, &labels),
        Err(ClusterError::UndefinedMetric { .. })
    ));
    let report = metrics::evaluate(&labels, &truth, &x).unwrap();
    assert_eq!(report.silhouette, None);
    assert_eq!(report.n_noise, 1);
}
