//! Feature importance aggregation across trees.

/// Average per-tree importances into one vector of length `n_features`.
///
/// Each tree's vector is already normalized (or all zeros for a lone leaf).
/// The sum over trees is renormalized to 1; when every tree is a leaf the
/// result is uniform so it still sums to 1.
pub(crate) fn aggregate_importances(per_tree: &[Vec<f64>], n_features: usize) -> Vec<f64> {
    if n_features == 0 {
        return Vec::new();
    }
    let mut totals = vec![0.0f64; n_features];
    for tree in per_tree {
        for (total, &value) in totals.iter_mut().zip(tree) {
            *total += value;
        }
    }
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    } else {
        totals.fill(1.0 / n_features as f64);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::aggregate_importances;

    #[test]
    fn averages_and_renormalizes() {
        let per_tree = vec![vec![1.0, 0.0, 0.0], vec![0.5, 0.5, 0.0]];
        let result = aggregate_importances(&per_tree, 3);
        assert!((result[0] - 0.75).abs() < 1e-12);
        assert!((result[1] - 0.25).abs() < 1e-12);
        assert_eq!(result[2], 0.0);
    }

    #[test]
    fn leaf_only_trees_give_uniform() {
        let per_tree = vec![vec![0.0; 4], vec![0.0; 4]];
        assert_eq!(aggregate_importances(&per_tree, 4), vec![0.25; 4]);
        assert_eq!(aggregate_importances(&[], 2), vec![0.5; 2]);
    }
}
