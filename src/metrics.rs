//! Cluster-validity metrics.
//!
//! External indices compare a computed labelling to reference labels;
//! points labelled [`NOISE`] are dropped from both sides before any index
//! is computed. When nothing is left, the external indices and purity are
//! reported as `0.0`.
//!
//! Degenerate partitions follow the usual conventions: ARI is `1.0` when
//! its chance-corrected denominator vanishes, homogeneity is `1.0` when the
//! reference labels carry no entropy, completeness is `1.0` when the
//! clusters carry none, and NMI is `1.0` when both are constant.

use std::collections::BTreeMap;
use std::fmt;

use crate::distance::euclidean;
use crate::error::{ClusterError, Result};
use crate::{Labels, Matrix, NOISE};

/// Majority-label summary of one cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterPurity {
    /// Most frequent external label; ties go to the smallest label.
    pub dominant_label: i32,
    /// Share of members carrying the dominant label, in `[0, 1]`.
    pub purity: f64,
    pub size: usize,
    pub label_distribution: BTreeMap<i32, usize>,
}

/// Everything [`evaluate`] reports for one labelling.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub n_clusters: usize,
    pub n_noise: usize,
    pub noise_fraction: f64,
    pub adjusted_rand_index: f64,
    pub normalized_mutual_info: f64,
    pub homogeneity: f64,
    pub completeness: f64,
    pub v_measure: f64,
    /// `None` when the silhouette is not computable for this labelling.
    pub silhouette: Option<f64>,
    pub overall_purity: f64,
    pub cluster_purities: BTreeMap<i32, ClusterPurity>,
}

impl Evaluation {
    pub fn misclassification_rate(&self) -> f64 {
        1.0 - self.overall_purity
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cluster statistics:")?;
        writeln!(f, "  Number of clusters: {}", self.n_clusters)?;
        writeln!(
            f,
            "  Noise points: {} ({:.2}%)",
            self.n_noise,
            self.noise_fraction * 100.0
        )?;
        writeln!(f, "  Clustered points: {:.2}%", (1.0 - self.noise_fraction) * 100.0)?;

        writeln!(f, "Agreement with reference labels:")?;
        writeln!(f, "  Adjusted Rand Index (ARI): {:.4}", self.adjusted_rand_index)?;
        writeln!(f, "  Normalized Mutual Info (NMI): {:.4}", self.normalized_mutual_info)?;
        writeln!(f, "  Homogeneity: {:.4}", self.homogeneity)?;
        writeln!(f, "  Completeness: {:.4}", self.completeness)?;
        writeln!(f, "  V-measure: {:.4}", self.v_measure)?;
        match self.silhouette {
            Some(s) => writeln!(f, "  Silhouette: {s:.4}")?,
            None => writeln!(f, "  Silhouette: not computable")?,
        }

        writeln!(f, "Classification accuracy:")?;
        writeln!(f, "  Overall cluster purity: {:.2}%", self.overall_purity * 100.0)?;
        writeln!(
            f,
            "  Misclassification rate: {:.2}%",
            self.misclassification_rate() * 100.0
        )?;

        writeln!(f, "Cluster details:")?;
        for (id, info) in &self.cluster_purities {
            writeln!(
                f,
                "  Cluster {id}: size={}, purity={:.2}%, dominant_label={}",
                info.size,
                info.purity * 100.0,
                info.dominant_label
            )?;
        }
        Ok(())
    }
}

/// Cluster-by-label counts over non-noise points.
struct Contingency {
    cells: BTreeMap<(i32, i32), usize>,
    cluster_sizes: BTreeMap<i32, usize>,
    class_sizes: BTreeMap<i32, usize>,
    n: usize,
}

impl Contingency {
    fn new(labels: &Labels, truth: &Labels) -> Result<Self> {
        check_lengths(labels.len(), truth.len())?;

        let mut cells = BTreeMap::new();
        let mut cluster_sizes = BTreeMap::new();
        let mut class_sizes = BTreeMap::new();
        let mut n = 0;
        for (&cluster, &class) in labels.iter().zip(truth.iter()) {
            if cluster == NOISE {
                continue;
            }
            *cells.entry((cluster, class)).or_insert(0) += 1;
            *cluster_sizes.entry(cluster).or_insert(0) += 1;
            *class_sizes.entry(class).or_insert(0) += 1;
            n += 1;
        }

        Ok(Self {
            cells,
            cluster_sizes,
            class_sizes,
            n,
        })
    }

    fn mutual_information(&self) -> f64 {
        let n = self.n as f64;
        let mi: f64 = self
            .cells
            .iter()
            .map(|(&(cluster, class), &count)| {
                let count = count as f64;
                let a = self.cluster_sizes[&cluster] as f64;
                let b = self.class_sizes[&class] as f64;
                (count / n) * (n * count / (a * b)).ln()
            })
            .sum();
        mi.max(0.0)
    }
}

fn check_lengths(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(ClusterError::LengthMismatch { expected, got });
    }
    Ok(())
}

fn entropy<'a>(sizes: impl Iterator<Item = &'a usize>, n: usize) -> f64 {
    let n = n as f64;
    sizes
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.ln()
        })
        .sum()
}

fn comb2(n: usize) -> f64 {
    let n = n as f64;
    n * (n - 1.0) / 2.0
}

pub fn adjusted_rand_index(labels: &Labels, truth: &Labels) -> Result<f64> {
    let table = Contingency::new(labels, truth)?;
    if table.n == 0 {
        return Ok(0.0);
    }

    let index: f64 = table.cells.values().map(|&c| comb2(c)).sum();
    let sum_a: f64 = table.cluster_sizes.values().map(|&c| comb2(c)).sum();
    let sum_b: f64 = table.class_sizes.values().map(|&c| comb2(c)).sum();
    let total = comb2(table.n);

    let expected = if total > 0.0 { sum_a * sum_b / total } else { 0.0 };
    let max_index = (sum_a + sum_b) / 2.0;
    if max_index == expected {
        return Ok(1.0);
    }
    Ok((index - expected) / (max_index - expected))
}

/// Mutual information normalised by the arithmetic mean of both entropies.
pub fn normalized_mutual_info(labels: &Labels, truth: &Labels) -> Result<f64> {
    let table = Contingency::new(labels, truth)?;
    if table.n == 0 {
        return Ok(0.0);
    }

    let h_clusters = entropy(table.cluster_sizes.values(), table.n);
    let h_classes = entropy(table.class_sizes.values(), table.n);
    if h_clusters == 0.0 && h_classes == 0.0 {
        return Ok(1.0);
    }
    let mean = (h_clusters + h_classes) / 2.0;
    Ok((table.mutual_information() / mean).min(1.0))
}

/// Homogeneity, completeness and their harmonic mean (V-measure).
pub fn homogeneity_completeness_v_measure(labels: &Labels, truth: &Labels) -> Result<(f64, f64, f64)> {
    let table = Contingency::new(labels, truth)?;
    if table.n == 0 {
        return Ok((0.0, 0.0, 0.0));
    }

    let h_clusters = entropy(table.cluster_sizes.values(), table.n);
    let h_classes = entropy(table.class_sizes.values(), table.n);
    let mi = table.mutual_information();

    let homogeneity = if h_classes == 0.0 { 1.0 } else { (mi / h_classes).min(1.0) };
    let completeness = if h_clusters == 0.0 { 1.0 } else { (mi / h_clusters).min(1.0) };
    let v_measure = if homogeneity + completeness == 0.0 {
        0.0
    } else {
        2.0 * homogeneity * completeness / (homogeneity + completeness)
    };
    Ok((homogeneity, completeness, v_measure))
}

/// Mean silhouette over non-noise points.
///
/// Needs at least two non-noise clusters and fewer clusters than non-noise
/// points. Members of singleton clusters contribute `0`.
pub fn silhouette_score(x: &Matrix, labels: &Labels) -> Result<f64> {
    check_lengths(x.nrows(), labels.len())?;

    let members: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] != NOISE).collect();
    let mut cluster_index = BTreeMap::new();
    for &i in &members {
        let next = cluster_index.len();
        cluster_index.entry(labels[i]).or_insert(next);
    }

    let n_clusters = cluster_index.len();
    if n_clusters < 2 {
        return Err(ClusterError::UndefinedMetric {
            metric: "silhouette",
            reason: format!("needs at least 2 non-noise clusters, found {n_clusters}"),
        });
    }
    if n_clusters >= members.len() {
        return Err(ClusterError::UndefinedMetric {
            metric: "silhouette",
            reason: format!(
                "{n_clusters} clusters over {} non-noise points leaves no cohesion to measure",
                members.len()
            ),
        });
    }

    let assigned: Vec<usize> = members.iter().map(|&i| cluster_index[&labels[i]]).collect();
    let mut sizes = vec![0usize; n_clusters];
    for &c in &assigned {
        sizes[c] += 1;
    }

    let mut total = 0.0;
    let mut sums = vec![0.0; n_clusters];
    for (pos, &i) in members.iter().enumerate() {
        sums.fill(0.0);
        for (other_pos, &j) in members.iter().enumerate() {
            if other_pos != pos {
                sums[assigned[other_pos]] += euclidean(&x.row(i), &x.row(j));
            }
        }

        let own = assigned[pos];
        if sizes[own] == 1 {
            continue;
        }
        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = (0..n_clusters)
            .filter(|&c| c != own)
            .map(|c| sums[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);
        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    Ok(total / members.len() as f64)
}

pub fn cluster_purities(labels: &Labels, truth: &Labels) -> Result<BTreeMap<i32, ClusterPurity>> {
    let table = Contingency::new(labels, truth)?;

    let mut distributions: BTreeMap<i32, BTreeMap<i32, usize>> = BTreeMap::new();
    for (&(cluster, class), &count) in &table.cells {
        distributions.entry(cluster).or_default().insert(class, count);
    }

    Ok(distributions
        .into_iter()
        .map(|(cluster, label_distribution)| {
            let size: usize = label_distribution.values().sum();
            let mut dominant_label = 0;
            let mut dominant_count = 0;
            for (&class, &count) in &label_distribution {
                if count > dominant_count {
                    dominant_label = class;
                    dominant_count = count;
                }
            }
            let info = ClusterPurity {
                dominant_label,
                purity: dominant_count as f64 / size as f64,
                size,
                label_distribution,
            };
            (cluster, info)
        })
        .collect())
}

/// Sum of dominant-label counts over the number of non-noise points.
pub fn overall_purity(labels: &Labels, truth: &Labels) -> Result<f64> {
    let purities = cluster_purities(labels, truth)?;
    Ok(weighted_purity(&purities))
}

fn weighted_purity(purities: &BTreeMap<i32, ClusterPurity>) -> f64 {
    let (correct, total) = purities.values().fold((0, 0), |(correct, total), info| {
        (correct + info.label_distribution[&info.dominant_label], total + info.size)
    });
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64
}

/// Percentage of each cluster's members carrying each external label,
/// shape `(n_clusters, n_classes)`. Noise and out-of-range ids are skipped.
pub fn assignment_matrix(
    labels: &Labels,
    truth: &Labels,
    n_clusters: usize,
    n_classes: usize,
) -> Result<Matrix> {
    check_lengths(labels.len(), truth.len())?;

    let mut matrix = Matrix::zeros((n_clusters, n_classes));
    let mut totals = vec![0usize; n_clusters];
    for (&cluster, &class) in labels.iter().zip(truth.iter()) {
        let Ok(row) = usize::try_from(cluster) else {
            continue;
        };
        if row >= n_clusters {
            continue;
        }
        totals[row] += 1;
        if let Ok(col) = usize::try_from(class) {
            if col < n_classes {
                matrix[[row, col]] += 1.0;
            }
        }
    }

    for (row, &total) in totals.iter().enumerate() {
        if total > 0 {
            matrix.row_mut(row).mapv_inplace(|c| c / total as f64 * 100.0);
        }
    }
    Ok(matrix)
}

/// Computes every metric for `labels` against the reference `truth`, using
/// `x` for the silhouette.
pub fn evaluate(labels: &Labels, truth: &Labels, x: &Matrix) -> Result<Evaluation> {
    check_lengths(labels.len(), truth.len())?;
    check_lengths(x.nrows(), labels.len())?;
    if labels.is_empty() {
        return Err(ClusterError::EmptyInput);
    }

    let n_noise = crate::cluster::count_noise(labels);
    let (homogeneity, completeness, v_measure) = homogeneity_completeness_v_measure(labels, truth)?;
    let cluster_purities = cluster_purities(labels, truth)?;

    Ok(Evaluation {
        n_clusters: crate::cluster::count_clusters(labels),
        n_noise,
        noise_fraction: n_noise as f64 / labels.len() as f64,
        adjusted_rand_index: adjusted_rand_index(labels, truth)?,
        normalized_mutual_info: normalized_mutual_info(labels, truth)?,
        homogeneity,
        completeness,
        v_measure,
        silhouette: silhouette_score(x, labels).ok(),
        overall_purity: weighted_purity(&cluster_purities),
        cluster_purities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_ari_self_is_exactly_one() {
        let labels = array![0, 0, 1, 1, 2, 2, 2, 0];
        assert_eq!(adjusted_rand_index(&labels, &labels).unwrap(), 1.0);
    }

    #[test]
    fn test_ari_ignores_label_names() {
        let labels = array![0, 0, 1, 1, 2, 2];
        let truth = array![5, 5, 9, 9, 7, 7];
        assert!(close(adjusted_rand_index(&labels, &truth).unwrap(), 1.0));
    }

    #[test]
    fn test_ari_known_value() {
        // sklearn: adjusted_rand_score([0, 0, 1, 2], [0, 0, 1, 1]) == 0.5714285714285715
        let labels = array![0, 0, 1, 1];
        let truth = array![0, 0, 1, 2];
        assert!(close(adjusted_rand_index(&labels, &truth).unwrap(), 4.0 / 7.0));
    }

    #[test]
    fn test_ari_random_relabelling_near_zero() {
        let truth: Labels = (0..3000).map(|i| (i % 3) as i32).collect();
        let mut rng = StdRng::seed_from_u64(17);
        let mut shuffled = truth.to_vec();
        shuffled.shuffle(&mut rng);
        let shuffled = Labels::from(shuffled);

        let ari = adjusted_rand_index(&shuffled, &truth).unwrap();
        assert!(ari.abs() < 0.02, "ari = {ari}");
    }

    #[test]
    fn test_noise_is_excluded() {
        let labels = array![0, 0, NOISE, 1, 1, NOISE];
        let truth = array![3, 3, 4, 4, 4, 3];
        assert!(close(adjusted_rand_index(&labels, &truth).unwrap(), 1.0));
        assert!(close(overall_purity(&labels, &truth).unwrap(), 1.0));
        assert!(close(normalized_mutual_info(&labels, &truth).unwrap(), 1.0));
    }

    #[test]
    fn test_all_noise_reports_zero() {
        let labels = array![NOISE, NOISE, NOISE];
        let truth = array![0, 1, 2];
        assert_eq!(adjusted_rand_index(&labels, &truth).unwrap(), 0.0);
        assert_eq!(normalized_mutual_info(&labels, &truth).unwrap(), 0.0);
        assert_eq!(overall_purity(&labels, &truth).unwrap(), 0.0);
        assert_eq!(
            homogeneity_completeness_v_measure(&labels, &truth).unwrap(),
            (0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_length_mismatch() {
        let labels = array![0, 1];
        let truth = array![0, 1, 1];
        assert_eq!(
            adjusted_rand_index(&labels, &truth).unwrap_err(),
            ClusterError::LengthMismatch { expected: 2, got: 3 }
        );
    }

    #[test]
    fn test_homogeneous_but_incomplete() {
        // Each cluster is pure, but class 0 is split in two.
        let labels = array![0, 0, 1, 1, 2, 2];
        let truth = array![0, 0, 0, 0, 1, 1];
        let (h, c, v) = homogeneity_completeness_v_measure(&labels, &truth).unwrap();
        assert!(close(h, 1.0));
        assert!(c < 1.0 && c > 0.0);
        assert!(close(v, 2.0 * h * c / (h + c)));
    }

    #[test]
    fn test_complete_but_not_homogeneous() {
        let labels = array![0, 0, 0, 0];
        let truth = array![0, 0, 1, 1];
        let (h, c, v) = homogeneity_completeness_v_measure(&labels, &truth).unwrap();
        assert!(close(h, 0.0));
        assert!(close(c, 1.0));
        assert!(close(v, 0.0));
    }

    #[test]
    fn test_nmi_known_value() {
        // Perfectly independent labellings carry no shared information.
        let labels = array![0, 0, 1, 1];
        let truth = array![0, 1, 0, 1];
        assert!(close(normalized_mutual_info(&labels, &truth).unwrap(), 0.0));

        let perfect = array![1, 1, 0, 0];
        assert!(close(normalized_mutual_info(&labels, &perfect).unwrap(), 1.0));
    }

    #[test]
    fn test_purity_weighted_average() {
        let labels = array![0, 0, 0, 1, 1, NOISE];
        let truth = array![7, 7, 8, 8, 9, 7];
        let purities = cluster_purities(&labels, &truth).unwrap();

        assert_eq!(purities.len(), 2);
        assert_eq!(purities[&0].dominant_label, 7);
        assert_eq!(purities[&0].size, 3);
        assert!(close(purities[&0].purity, 2.0 / 3.0));
        // Tie between 8 and 9 resolves to the smaller label.
        assert_eq!(purities[&1].dominant_label, 8);
        assert!(close(purities[&1].purity, 0.5));

        let overall = overall_purity(&labels, &truth).unwrap();
        let weighted: f64 = purities.values().map(|p| p.purity * p.size as f64).sum::<f64>() / 5.0;
        assert!(close(overall, weighted));
        assert!(close(overall, 3.0 / 5.0));
        for info in purities.values() {
            assert!((0.0..=1.0).contains(&info.purity));
        }
    }

    #[test]
    fn test_silhouette_two_tight_clusters() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
        let labels = array![0, 0, 1, 1];
        let s = silhouette_score(&x, &labels).unwrap();
        // a = 1, b = mean(10, sqrt(101)) for every point.
        let b = (10.0 + 101f64.sqrt()) / 2.0;
        assert!(close(s, (b - 1.0) / b));
    }

    #[test]
    fn test_silhouette_single_cluster_not_computable() {
        let x = array![[0.0], [1.0], [2.0], [50.0]];
        let labels = array![0, 0, 0, NOISE];
        assert!(matches!(
            silhouette_score(&x, &labels),
            Err(ClusterError::UndefinedMetric { metric: "silhouette", .. })
        ));
    }

    #[test]
    fn test_silhouette_all_singletons_not_computable() {
        let x = array![[0.0], [1.0], [2.0]];
        let labels = array![0, 1, 2];
        assert!(silhouette_score(&x, &labels).is_err());
    }

    #[test]
    fn test_silhouette_singleton_contributes_zero() {
        let x = array![[0.0], [1.0], [9.0]];
        let labels = array![0, 0, 1];
        let s = silhouette_score(&x, &labels).unwrap();
        // point 0: a = 1, b = 9; point 1: a = 1, b = 8; point 2: 0.
        let expected = ((9.0 - 1.0) / 9.0 + (8.0 - 1.0) / 8.0) / 3.0;
        assert!(close(s, expected));
    }

    #[test]
    fn test_assignment_matrix_percentages() {
        let labels = array![0, 0, 0, 0, 1, NOISE];
        let truth = array![0, 0, 0, 1, 1, 0];
        let m = assignment_matrix(&labels, &truth, 2, 2).unwrap();
        assert_eq!(m.shape(), &[2, 2]);
        assert!(close(m[[0, 0]], 75.0));
        assert!(close(m[[0, 1]], 25.0));
        assert!(close(m[[1, 0]], 0.0));
        assert!(close(m[[1, 1]], 100.0));
    }

    #[test]
    fn test_evaluate_collects_everything() {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [5.0, 5.0],
            [5.1, 5.0],
            [5.0, 5.1],
            [20.0, 20.0]
        ];
        let labels = array![0, 0, 0, 1, 1, 1, NOISE];
        let truth = array![2, 2, 2, 4, 4, 4, 2];
        let report = evaluate(&labels, &truth, &x).unwrap();

        assert_eq!(report.n_clusters, 2);
        assert_eq!(report.n_noise, 1);
        assert!(close(report.noise_fraction, 1.0 / 7.0));
        assert!(close(report.adjusted_rand_index, 1.0));
        assert!(close(report.normalized_mutual_info, 1.0));
        assert!(close(report.v_measure, 1.0));
        assert!(close(report.overall_purity, 1.0));
        assert!(report.silhouette.unwrap() > 0.9);
        assert!(close(report.misclassification_rate(), 0.0));

        let text = report.to_string();
        assert!(text.contains("Number of clusters: 2"));
        assert!(text.contains("Cluster 1: size=3, purity=100.00%, dominant_label=4"));
    }

    #[test]
    fn test_evaluate_single_cluster_has_no_silhouette() {
        let x = array![[0.0], [0.1], [0.2]];
        let labels = array![0, 0, 0];
        let truth = array![1, 1, 1];
        let report = evaluate(&labels, &truth, &x).unwrap();
        assert_eq!(report.silhouette, None);
        assert!(report.to_string().contains("Silhouette: not computable"));
    }
}
