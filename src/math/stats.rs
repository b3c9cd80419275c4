/// Deterministic splitmix64 generator for the dice simulation.
///
/// Scene output must be reproducible for a given `Composition.seed`, so no
/// external RNG state is involved.
#[derive(Clone, Copy, Debug)]
pub struct SplitMix64(u64);

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform die roll in `1..=6`.
    pub fn roll_die(&mut self) -> u32 {
        (self.next_u64() % 6) as u32 + 1
    }
}

/// Per-sample means of `dice_per_sample` rolls, `num_samples` times over.
pub fn dice_sample_means(seed: u64, num_samples: usize, dice_per_sample: usize) -> Vec<f64> {
    let mut rng = SplitMix64::new(seed);
    let mut means = Vec::with_capacity(num_samples);
    for _ in 0..num_samples {
        let mut sum = 0u64;
        for _ in 0..dice_per_sample {
            sum += u64::from(rng.roll_die());
        }
        means.push(sum as f64 / dice_per_sample as f64);
    }
    means
}

/// Running mean of each growing prefix: `out[i] = mean(values[0..=i])`.
pub fn running_averages(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        out.push(sum / (i + 1) as f64);
    }
    out
}

/// Bin `values` into `bins` equal-width buckets over `[lo, hi)`; values outside the
/// range are ignored. Rebinned from scratch on every call, matching the display
/// update in the statistics scene.
pub fn histogram(values: &[f64], bins: usize, lo: f64, hi: f64) -> Vec<u32> {
    let mut counts = vec![0u32; bins];
    if bins == 0 || !(hi > lo) {
        return counts;
    }
    let width = (hi - lo) / bins as f64;
    for &v in values {
        if v < lo || v >= hi {
            continue;
        }
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_stay_on_die_faces() {
        let mut rng = SplitMix64::new(123);
        for _ in 0..1000 {
            let r = rng.roll_die();
            assert!((1..=6).contains(&r));
        }
    }

    #[test]
    fn same_seed_reproduces_trace() {
        let a = dice_sample_means(123, 50, 20);
        let b = dice_sample_means(123, 50, 20);
        assert_eq!(a, b);
        let c = dice_sample_means(124, 50, 20);
        assert_ne!(a, c);
    }

    #[test]
    fn running_average_converges_to_expectation() {
        let means = dice_sample_means(123, 300, 20);
        let running = running_averages(&means);
        assert_eq!(running.len(), 300);
        // Law of large numbers: the tail should sit close to 3.5.
        assert!((running[299] - 3.5).abs() < 0.1);
        // And closer than the early estimate is on average.
        assert!((running[299] - 3.5).abs() <= (running[4] - 3.5).abs() + 0.1);
    }

    #[test]
    fn running_average_is_prefix_mean() {
        let r = running_averages(&[2.0, 4.0, 6.0]);
        assert_eq!(r, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn histogram_counts_sum_to_in_range_samples() {
        let values = [2.9, 3.1, 3.5, 3.5, 4.1, 9.0];
        let counts = histogram(&values, 12, 2.8, 4.2);
        let total: u32 = counts.iter().sum();
        assert_eq!(total, 5); // 9.0 falls outside
    }

    #[test]
    fn histogram_edge_value_lands_in_last_bin() {
        let counts = histogram(&[3.9999], 2, 2.0, 4.0);
        assert_eq!(counts, vec![0, 1]);
    }
}
