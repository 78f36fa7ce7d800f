//! Row-level Bernoulli sampling with a seeded generator.
//!
//! One uniform draw per row, in row order; a row is kept iff its draw is
//! strictly below the rate. Draws depend only on the seed and the row's
//! position, so the same seed over the same rows keeps the same rows.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sieve_core::types::Table;

use crate::error::Result;

pub struct BernoulliSampler {
    rate: f64,
    rng: StdRng,
    drawn: u64,
    kept: u64,
}

impl BernoulliSampler {
    pub fn new(rate: f64, seed: u64) -> Self {
        Self {
            rate,
            rng: StdRng::seed_from_u64(seed),
            drawn: 0,
            kept: 0,
        }
    }

    /// Draw keep/drop decisions for the next `rows` rows.
    pub fn draw_mask(&mut self, rows: usize) -> Vec<bool> {
        let mut mask = Vec::with_capacity(rows);
        for _ in 0..rows {
            let keep = self.rng.gen::<f64>() < self.rate;
            self.kept += keep as u64;
            mask.push(keep);
        }
        self.drawn += rows as u64;
        mask
    }

    /// Retained rows of `chunk`, in order, with the chunk's columns.
    pub fn sample(&mut self, chunk: &Table) -> Result<Table> {
        let mask = self.draw_mask(chunk.num_rows());
        Ok(chunk.retain_rows(&mask)?)
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn drawn(&self) -> u64 {
        self.drawn
    }

    pub fn kept(&self) -> u64 {
        self.kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_mask() {
        let mut a = BernoulliSampler::new(0.3, 0);
        let mut b = BernoulliSampler::new(0.3, 0);
        assert_eq!(a.draw_mask(1000), b.draw_mask(1000));
        assert_eq!(a.kept(), b.kept());
    }

    #[test]
    fn different_seed_differs() {
        let mut a = BernoulliSampler::new(0.5, 1);
        let mut b = BernoulliSampler::new(0.5, 2);
        assert_ne!(a.draw_mask(256), b.draw_mask(256));
    }

    #[test]
    fn rate_one_keeps_everything() {
        let mut s = BernoulliSampler::new(1.0, 9);
        assert!(s.draw_mask(10_000).into_iter().all(|k| k));
        assert_eq!(s.drawn(), 10_000);
    }

    #[test]
    fn split_draws_match_single_draw() {
        let mut whole = BernoulliSampler::new(0.25, 5);
        let mut split = BernoulliSampler::new(0.25, 5);
        let expected = whole.draw_mask(90);
        let mut got = split.draw_mask(40);
        got.extend(split.draw_mask(50));
        assert_eq!(expected, got);
    }

    #[test]
    fn kept_fraction_is_close_to_rate() {
        let mut s = BernoulliSampler::new(0.1, 0);
        s.draw_mask(100_000);
        // sd = sqrt(1e5 * 0.1 * 0.9) ~= 95; allow five sd.
        let kept = s.kept() as i64;
        assert!((kept - 10_000).abs() < 475, "kept {kept}");
    }
}
