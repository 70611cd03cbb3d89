//! Stratified train / holdout splitting

use crate::deterministic::LcgRng;

/// Row indices of the two sides of a split, each ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

/// Split rows so both sides keep the class balance of `labels`.
///
/// Each class is shuffled with a generator seeded by `seed`, and
/// `round(n_class * ratio)` of its rows go to the holdout side. A ratio of
/// 0 keeps every row in training.
pub fn stratified_split(labels: &[bool], ratio: f64, seed: u64) -> SplitIndices {
    let ratio = ratio.clamp(0.0, 1.0);
    let mut rng = LcgRng::new(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut holdout = Vec::new();

    for class in [false, true] {
        let mut rows: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == class)
            .map(|(i, _)| i)
            .collect();
        rng.shuffle(&mut rows);
        let n_holdout = ((rows.len() as f64) * ratio).round() as usize;
        let n_holdout = n_holdout.min(rows.len());
        holdout.extend_from_slice(&rows[..n_holdout]);
        train.extend_from_slice(&rows[n_holdout..]);
    }

    train.sort_unstable();
    holdout.sort_unstable();
    SplitIndices { train, holdout }
}

/// Gather `rows` of `items` by index.
pub fn select<T: Clone>(items: &[T], rows: &[usize]) -> Vec<T> {
    rows.iter().map(|&i| items[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pos: usize, neg: usize) -> Vec<bool> {
        let mut out = vec![true; pos];
        out.extend(vec![false; neg]);
        out
    }

    #[test]
    fn test_preserves_class_ratio() {
        let labels = labels(30, 70);
        let split = stratified_split(&labels, 0.2, 42);
        assert_eq!(split.holdout.len(), 20);
        assert_eq!(split.train.len(), 80);
        let holdout_pos = split.holdout.iter().filter(|&&i| labels[i]).count();
        assert_eq!(holdout_pos, 6);
    }

    #[test]
    fn test_sides_are_disjoint_and_complete() {
        let labels = labels(13, 29);
        let split = stratified_split(&labels, 0.25, 7);
        let mut all: Vec<usize> = split.train.iter().chain(&split.holdout).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..labels.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_deterministic_for_seed() {
        let labels = labels(40, 60);
        assert_eq!(
            stratified_split(&labels, 0.2, 42),
            stratified_split(&labels, 0.2, 42)
        );
        assert_ne!(
            stratified_split(&labels, 0.2, 42).holdout,
            stratified_split(&labels, 0.2, 43).holdout
        );
    }

    #[test]
    fn test_zero_ratio_keeps_everything() {
        let split = stratified_split(&labels(3, 4), 0.0, 42);
        assert!(split.holdout.is_empty());
        assert_eq!(split.train.len(), 7);
    }

    #[test]
    fn test_select() {
        assert_eq!(select(&["a", "b", "c"], &[2, 0]), vec!["c", "a"]);
    }
}
