//! Numeric helpers shared by the aggregator and the consolidator.

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean, rounded to two decimals. Empty input is 0.
pub fn mean(scores: &[u8]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let sum: u64 = scores.iter().map(|score| u64::from(*score)).sum();
    round2(sum as f64 / scores.len() as f64)
}

/// Median of an ascending slice: the middle element, or the mean of the two middles.
pub fn median_sorted(sorted: &[u8]) -> f64 {
    let len = sorted.len();
    if len == 0 {
        return 0.0;
    }
    let mid = len / 2;
    if len % 2 == 0 {
        round2((f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0)
    } else {
        f64::from(sorted[mid])
    }
}

/// Median of arbitrary-order scores.
pub fn median(scores: &[u8]) -> f64 {
    let mut sorted = scores.to_vec();
    sorted.sort_unstable();
    median_sorted(&sorted)
}

/// `part / whole` as a whole-number percentage. A zero denominator yields 0.
pub fn percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

/// `part / whole` as a percentage with two decimals. A zero denominator yields 0.
pub fn percentage2(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(100.0 * part as f64 / whole as f64)
}
