use clusterlab::{
    AutoDbscan, ClusteringConfig, DBSCAN, Dataset, KMeans, Labels, Matrix, ParameterSearch,
    StandardScaler, metrics, suggest_eps,
};
use ndarray::array;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Clustering Algorithms Comparison ===\n");

    // Three natural clusters with known labels.
    let centers = array![[2.0, 2.0], [8.0, 8.0], [2.0, 8.0]];
    let mut rng = StdRng::seed_from_u64(42);
    let data = Dataset::make_blobs(&centers, 40, 0.6, &mut rng)?;

    println!(
        "Dataset: {} samples, {} features, {} classes\n",
        data.n_samples(),
        data.n_features(),
        data.n_classes()
    );

    let mut scaler = StandardScaler::new();
    let x = scaler.fit_transform(&data.features)?;

    println!("=== K-Means Clustering ===");
    for &k in &[2, 3, 4, 5] {
        match test_kmeans(&x, &data.targets, k) {
            Ok(result) => println!("{}", result),
            Err(e) => println!("K-Means(k={}) failed: {}", k, e),
        }
    }

    println!("\n=== DBSCAN Clustering ===");
    let min_samples = 2 * x.ncols();
    let eps = suggest_eps(&x, min_samples)?;
    println!("k-distance heuristic suggests eps = {:.3} (k = {})", eps, min_samples);

    for &(eps, min_samples) in &[(0.1, 4), (0.2, 4), (eps, min_samples), (0.5, 8)] {
        match test_dbscan(&x, eps, min_samples) {
            Ok(result) => println!("DBSCAN(eps={:.3}, min_samples={}): {}", eps, min_samples, result),
            Err(e) => println!("DBSCAN(eps={:.3}, min_samples={}) failed: {}", eps, min_samples, e),
        }
    }

    println!("\n=== Parameter Search ===");
    let outcome = ParameterSearch::new(3, 0.15).run(&x, &data.targets)?;
    println!(
        "{} grid cells produced clusters, {} eligible",
        outcome.candidates.len(),
        outcome.candidates.iter().filter(|c| c.eligible).count()
    );
    match &outcome.best {
        Some(best) => println!(
            "Best: eps={:.2}, min_samples={}, clusters={}, noise={:.1}%, ARI={:.3}",
            best.eps,
            best.min_samples,
            best.n_clusters,
            best.noise_fraction * 100.0,
            best.ari
        ),
        None => println!("No parameters found within constraints"),
    }

    println!("\n=== Detailed Analysis ===");
    let mut config = ClusteringConfig::default();
    config.kmeans.n_clusters = 3;
    config.search.target_clusters = 3;

    let mut kmeans = KMeans::from_config(&config.kmeans);
    let labels = kmeans.fit_predict(&x)?;
    println!("K-Means (k=3), inertia {:.4}", kmeans.inertia.unwrap_or(f64::NAN));
    println!("{}", metrics::evaluate(&labels, &data.targets, &x)?);

    let assignment = metrics::assignment_matrix(&labels, &data.targets, 3, data.n_classes())?;
    println!("Label distribution per cluster (%):");
    for (cluster, row) in assignment.rows().into_iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|p| format!("{:6.1}", p)).collect();
        println!("  Cluster {}: {}", cluster, cells.join(" "));
    }

    let mut auto = AutoDbscan::from_config(&config);
    auto.fit(&x, &data.targets)?;
    if let Some((eps, min_samples)) = auto.parameters {
        println!("\nDBSCAN (eps={:.3}, min_samples={})", eps, min_samples);
    }
    println!("{}", auto.evaluate(&data.targets)?);

    Ok(())
}

fn test_kmeans(x: &Matrix, truth: &Labels, k: usize) -> Result<String, clusterlab::ClusterError> {
    let mut kmeans = KMeans::new(k).max_iter(100);
    let labels = kmeans.fit_predict(x)?;
    let ari = metrics::adjusted_rand_index(&labels, truth)?;

    Ok(format!(
        "K-Means(k={}): inertia {:.4}, {} iterations, ARI {:.3}",
        k,
        kmeans.inertia.unwrap_or(f64::NAN),
        kmeans.n_iter.unwrap_or(0),
        ari
    ))
}

fn test_dbscan(x: &Matrix, eps: f64, min_samples: usize) -> Result<String, clusterlab::ClusterError> {
    let mut dbscan = DBSCAN::new(eps, min_samples);
    dbscan.fit(x)?;

    Ok(format!(
        "{} clusters, {} noise points, {} core samples",
        dbscan.n_clusters().unwrap_or(0),
        dbscan.n_noise_points().unwrap_or(0),
        dbscan.core_sample_indices.as_ref().map_or(0, Vec::len)
    ))
}
