//! Quantile histogram binning
//!
//! Each feature is cut into at most `max_bin` bins fitted on the training
//! rows. Bin `b` holds values `v` with `upper[b-1] < v <= upper[b]`, and
//! the last bound is `+inf`, so a split "bins `0..=b` go left" is exactly
//! the raw-value rule `v <= upper[b]` that the inference trees apply.

/// Bin boundaries of one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBins {
    upper_bounds: Vec<f64>,
}

/// A value strictly between `a` and `b` when one exists, else `a`.
fn midpoint(a: f64, b: f64) -> f64 {
    let mid = a + (b - a) / 2.0;
    if mid > a && mid < b {
        mid
    } else {
        a
    }
}

impl FeatureBins {
    /// Fit bin boundaries on `values`; non-finite values are ignored.
    pub fn fit(values: &[f64], max_bin: usize) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        let mut distinct: Vec<(f64, usize)> = Vec::new();
        for v in sorted.iter().copied() {
            match distinct.last_mut() {
                Some((last, count)) if *last == v => *count += 1,
                _ => distinct.push((v, 1)),
            }
        }

        let max_bin = max_bin.max(2);
        let mut upper_bounds = Vec::new();
        if distinct.len() <= max_bin {
            for pair in distinct.windows(2) {
                upper_bounds.push(midpoint(pair[0].0, pair[1].0));
            }
        } else {
            // greedy equal-frequency cuts, never splitting a repeated value
            let per_bin = sorted.len() as f64 / max_bin as f64;
            let mut cumulative = 0usize;
            for i in 0..distinct.len() - 1 {
                cumulative += distinct[i].1;
                let wanted = per_bin * (upper_bounds.len() + 1) as f64;
                if cumulative as f64 >= wanted {
                    upper_bounds.push(midpoint(distinct[i].0, distinct[i + 1].0));
                    if upper_bounds.len() == max_bin - 1 {
                        break;
                    }
                }
            }
        }
        upper_bounds.dedup();
        upper_bounds.push(f64::INFINITY);
        Self { upper_bounds }
    }

    pub fn num_bins(&self) -> usize {
        self.upper_bounds.len()
    }

    /// Bin index of `value`; NaN lands in the last bin.
    pub fn bin(&self, value: f64) -> u16 {
        if value.is_nan() {
            return (self.upper_bounds.len() - 1) as u16;
        }
        self.upper_bounds.partition_point(|b| *b < value) as u16
    }

    /// Raw threshold equivalent to "bin <= `bin`".
    pub fn threshold(&self, bin: usize) -> f64 {
        self.upper_bounds[bin]
    }
}

/// Column-major binned copy of a feature matrix.
#[derive(Debug, Clone)]
pub struct BinnedMatrix {
    pub bins: Vec<FeatureBins>,
    pub columns: Vec<Vec<u16>>,
    pub num_rows: usize,
}

impl BinnedMatrix {
    /// Fit bins on `rows` and bin them. All rows must have `num_features` values.
    pub fn from_rows(rows: &[Vec<f64>], num_features: usize, max_bin: usize) -> Self {
        let mut bins = Vec::with_capacity(num_features);
        let mut columns = Vec::with_capacity(num_features);
        for f in 0..num_features {
            let values: Vec<f64> = rows.iter().map(|r| r[f]).collect();
            let feature_bins = FeatureBins::fit(&values, max_bin);
            columns.push(values.iter().map(|v| feature_bins.bin(*v)).collect());
            bins.push(feature_bins);
        }
        Self {
            bins,
            columns,
            num_rows: rows.len(),
        }
    }

    pub fn num_features(&self) -> usize {
        self.bins.len()
    }
}
