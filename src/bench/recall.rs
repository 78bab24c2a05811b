//! Recall scoring for collected query results.

use std::collections::HashSet;

/// Micro-averaged recall@k across the whole query set.
///
/// `sum_i |results[i] ∩ groundtruth[i]| / (num_queries * k)`: every query
/// contributes `k` to the denominator, so queries with small overlaps are
/// not weighted up the way a mean of per-query recalls would. Each result
/// set is intersected against its full groundtruth row, which may hold
/// more than `k` ids.
pub fn micro_averaged_recall(results: &[Vec<u32>], groundtruth: &[Vec<u32>], k: usize) -> f64 {
    if results.is_empty() || k == 0 {
        return 0.0;
    }

    let mut true_positives = 0usize;
    for (result, gt) in results.iter().zip(groundtruth.iter()) {
        let found: HashSet<u32> = result.iter().copied().collect();
        true_positives += gt.iter().filter(|id| found.contains(id)).count();
    }

    true_positives as f64 / (results.len() * k) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_results_score_one() {
        let groundtruth: Vec<Vec<u32>> = (0..4)
            .map(|q| (0..10).map(|i| q * 100 + i).collect())
            .collect();
        let results = groundtruth.clone();
        assert_eq!(micro_averaged_recall(&results, &groundtruth, 10), 1.0);
    }

    #[test]
    fn empty_results_score_zero() {
        let groundtruth = vec![vec![1, 2, 3], vec![4, 5, 6]];
        let results = vec![vec![], vec![]];
        assert_eq!(micro_averaged_recall(&results, &groundtruth, 10), 0.0);
    }

    #[test]
    fn half_overlap_scores_half() {
        // 2 queries, k = 10, 5 true positives each -> 10 / 20.
        let groundtruth: Vec<Vec<u32>> = vec![(0..10).collect(), (100..110).collect()];
        let results = vec![
            vec![0, 1, 2, 3, 4, 50, 51, 52, 53, 54],
            vec![100, 101, 102, 103, 104, 60, 61, 62, 63, 64],
        ];
        assert_eq!(micro_averaged_recall(&results, &groundtruth, 10), 0.5);
    }

    #[test]
    fn groundtruth_beyond_k_still_counts() {
        // The row holds 20 ids; a result id matching the 15th entry is a
        // true positive even though only k = 10 are scored per query.
        let groundtruth = vec![(0..20).collect::<Vec<u32>>()];
        let results = vec![vec![14]];
        assert_eq!(micro_averaged_recall(&results, &groundtruth, 10), 0.1);
    }

    #[test]
    fn no_queries_scores_zero() {
        assert_eq!(micro_averaged_recall(&[], &[], 10), 0.0);
    }
}
