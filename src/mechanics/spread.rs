//! Spread mechanics: means and max-minus-min over rating samples.

/// Arithmetic mean; `None` for an empty sample.
#[inline]
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}

/// `max - min` of a sample; 0 for an empty sample, never negative.
#[inline]
pub fn range<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let bounds = values.into_iter().fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    });
    match bounds {
        Some((lo, hi)) => (hi - lo).max(0.0),
        None => 0.0,
    }
}
