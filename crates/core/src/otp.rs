//! One-time verification code generation.
//!
//! Codes are 8-digit decimal numbers drawn uniformly from
//! `[10_000_000, 99_999_999]`. Uniformity matters: a plain `random % range`
//! mapping over a 32-bit source skews toward low codes because 2^32 is not a
//! multiple of the range, so draws above the largest whole multiple of the
//! range are rejected and retried.

use rand::Rng;

/// Smallest 8-digit code.
pub const CODE_MIN: u32 = 10_000_000;

/// Largest 8-digit code.
pub const CODE_MAX: u32 = 99_999_999;

/// Number of possible codes.
const RANGE: u32 = CODE_MAX - CODE_MIN + 1;

/// Largest whole multiple of `RANGE` that fits in a u32 draw. Draws at or
/// above this are rejected to keep `value % RANGE` unbiased.
const ACCEPT_LIMIT: u32 = (((1u64 << 32) / RANGE as u64) * RANGE as u64) as u32;

/// Generate a uniformly random 8-digit verification code.
pub fn generate_code() -> u32 {
    let mut rng = rand::rng();
    sample(|| rng.random::<u32>())
}

/// Map a stream of uniform u32 draws to a code via rejection sampling.
fn sample(mut draw: impl FnMut() -> u32) -> u32 {
    loop {
        let value = draw();
        if value < ACCEPT_LIMIT {
            return CODE_MIN + value % RANGE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_always_eight_digits() {
        for _ in 0..10_000 {
            let code = generate_code();
            assert!(
                (CODE_MIN..=CODE_MAX).contains(&code),
                "code {code} out of range"
            );
        }
    }

    #[test]
    fn rejects_draws_above_accept_limit() {
        // First draw is exactly at the rejection boundary and must be
        // discarded; the second draw of 0 maps to the minimum code.
        let draws = [ACCEPT_LIMIT, 0];
        let mut i = 0;
        let code = sample(|| {
            let v = draws[i];
            i += 1;
            v
        });
        assert_eq!(i, 2, "boundary draw must be rejected");
        assert_eq!(code, CODE_MIN);
    }

    #[test]
    fn largest_accepted_draw_maps_to_max_code() {
        let code = sample(|| ACCEPT_LIMIT - 1);
        assert_eq!(code, CODE_MAX);
    }

    /// Chi-square goodness-of-fit over 100 equal-width buckets. With 100,000
    /// draws the expected count per bucket is 1,000; the statistic for 99
    /// degrees of freedom stays below 170 except with probability ~1e-5, so
    /// a modulo-biased generator (which loads the low buckets) fails loudly.
    #[test]
    fn codes_are_uniform_chi_square() {
        const DRAWS: usize = 100_000;
        const BUCKETS: usize = 100;
        const BUCKET_WIDTH: u32 = RANGE / BUCKETS as u32;

        let mut counts = [0u32; BUCKETS];
        for _ in 0..DRAWS {
            let code = generate_code();
            let bucket = ((code - CODE_MIN) / BUCKET_WIDTH) as usize;
            counts[bucket.min(BUCKETS - 1)] += 1;
        }

        let expected = DRAWS as f64 / BUCKETS as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();

        assert!(
            chi_square < 170.0,
            "chi-square statistic {chi_square} suggests non-uniform codes"
        );
    }
}
