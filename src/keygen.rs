use rand::distributions::{Distribution, Uniform};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::Normal;

use crate::config::map::KeyDist;

/// Per-lane key source. Each lane builds its own generator: the rng is
/// seeded once from OS entropy (never from the wall clock, which
/// repeats under fast loops on coarse clocks), and the sequential
/// cursor is lane-local.
pub enum KeyGenerator {
    Uniform {
        dist: Uniform<usize>,
        rng: SmallRng,
    },
    Gaussian {
        normal: Normal<f64>,
        key_range: usize,
        rng: SmallRng,
    },
    Sequential {
        cursor: usize,
        key_range: usize,
    },
}

impl KeyGenerator {
    pub fn new(dist: KeyDist, key_range: usize) -> Self {
        match dist {
            KeyDist::Uniform => Self::uniform(key_range),
            KeyDist::Gaussian => Self::gaussian(key_range),
            KeyDist::Sequential => Self::sequential(key_range),
        }
    }

    /// Independent uniform draws over `[0, key_range)`.
    pub fn uniform(key_range: usize) -> Self {
        KeyGenerator::Uniform {
            dist: Uniform::from(0..key_range),
            rng: SmallRng::from_entropy(),
        }
    }

    /// Keys cluster around the middle of the space: mean = range / 2,
    /// std dev = range / 6. Out-of-range samples are rejected and
    /// redrawn, not clamped; clamping would pile the rejected mass onto
    /// the boundary keys.
    pub fn gaussian(key_range: usize) -> Self {
        let mean = key_range as f64 / 2.0;
        let std_dev = key_range as f64 / 6.0;
        KeyGenerator::Gaussian {
            normal: Normal::new(mean, std_dev).unwrap(),
            key_range,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Visits every key in order before repeating.
    pub fn sequential(key_range: usize) -> Self {
        KeyGenerator::Sequential {
            cursor: 0,
            key_range,
        }
    }

    pub fn next_key(&mut self) -> usize {
        match self {
            KeyGenerator::Uniform { dist, rng } => dist.sample(rng),
            KeyGenerator::Gaussian {
                normal,
                key_range,
                rng,
            } => loop {
                let sample = normal.sample(rng);
                if sample >= 0.0 && sample < *key_range as f64 {
                    return sample as usize;
                }
            },
            KeyGenerator::Sequential { cursor, key_range } => {
                let key = *cursor;
                *cursor = (*cursor + 1) % *key_range;
                key
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::KeyGenerator;

    #[test]
    fn uniform_stays_in_range() {
        let mut gen = KeyGenerator::uniform(97);
        for _ in 0..10_000 {
            assert!(gen.next_key() < 97);
        }
    }

    #[test]
    fn gaussian_stays_in_range() {
        for range in [6, 97, 16 * 1024] {
            let mut gen = KeyGenerator::gaussian(range);
            for _ in 0..10_000 {
                assert!(gen.next_key() < range);
            }
        }
    }

    #[test]
    fn gaussian_clusters_around_the_mean() {
        let range = 1200;
        let mut gen = KeyGenerator::gaussian(range);
        let count = 100_000;
        let mut within_one_sigma = 0;
        for _ in 0..count {
            let key = gen.next_key();
            if key >= range / 3 && key < 2 * range / 3 {
                within_one_sigma += 1;
            }
        }
        // ~68% of a normal falls within one std dev of the mean; a
        // uniform draw would put only a third of the keys there.
        assert!(within_one_sigma > count / 2);
    }

    #[test]
    fn sequential_covers_in_order_then_wraps() {
        let mut gen = KeyGenerator::sequential(16);
        for expected in 0..16 {
            assert_eq!(gen.next_key(), expected);
        }
        assert_eq!(gen.next_key(), 0);
    }

    #[test]
    fn sequential_cursors_are_lane_local() {
        let mut a = KeyGenerator::sequential(16);
        let mut b = KeyGenerator::sequential(16);
        a.next_key();
        a.next_key();
        assert_eq!(b.next_key(), 0);
        assert_eq!(a.next_key(), 2);
    }
}
