use std::cmp::Ordering;

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() { 0.0 } else { values.iter().sum::<f64>() / values.len() as f64 }
}

/// Population standard deviation (divisor N); zero for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() { return 0.0 }
    let mu = mean(values);
    (values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Z-scores against the population mean and deviation.
/// Identical values, or a deviation that is rounding noise next to the
/// spread of the values, map every value to 0.
pub fn z_scores(values: &[f64]) -> Vec<f64> {
    if values.windows(2).all(|w| w[0] == w[1]) {
        return vec![0.0; values.len()]
    }
    let mu = mean(values);
    let sigma = std_dev(values);
    let spread = values.iter().map(|v| (v - mu).abs()).fold(0.0, f64::max);
    if !(sigma > f64::EPSILON * spread && sigma.is_finite()) {
        return vec![0.0; values.len()]
    }
    values.iter().map(|v| (v - mu) / sigma).collect()
}

/// Percentile ranks in (0, 100]: the 1-based rank divided by N, times 100.
/// Tied values share the mean of the ranks they span.
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] { end += 1 }

        // Positions start..end hold ranks start+1 ..= end.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] { ranks[i] = rank * 100.0 / n as f64 }
        start = end;
    }
    ranks
}
