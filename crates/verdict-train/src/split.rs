//! Seeded shuffling, splitting and scoring

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle a slice in place with a seeded generator
pub fn shuffle<T>(items: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
}

/// Split into `(train, test)` after a seeded shuffle.
///
/// The test side gets `round(len * test_fraction)` items, clamped so the
/// training side is never empty.
pub fn train_test_split<T>(mut items: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    shuffle(&mut items, seed);

    let len = items.len();
    let test_len = ((len as f64) * test_fraction.clamp(0.0, 1.0)).round() as usize;
    let test_len = test_len.min(len.saturating_sub(1));

    let test = items.split_off(len - test_len);
    (items, test)
}

/// Fraction of matching labels; zero for empty input
pub fn accuracy(predicted: &[usize], expected: &[usize]) -> f64 {
    if expected.is_empty() {
        return 0.0;
    }
    let hits = predicted
        .iter()
        .zip(expected)
        .filter(|(p, e)| p == e)
        .count();
    hits as f64 / expected.len() as f64
}
