//! Center seeding strategies, driven by a PRNG owned by the caller (the
//! Driver in practice; see `driver.rs`).

use rand::rngs::SmallRng;
use rand::Rng;

use crate::distance::distance;
use crate::schema::FeatureSchema;
use crate::vector::FeatureVector;

/// Sample `k` distinct row indices uniformly without replacement.
pub fn seed_uniform(n: usize, k: usize, rng: &mut SmallRng) -> Vec<usize> {
    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    while chosen.len() < k {
        let candidate = rng.gen_range(0..n);
        if !chosen.contains(&candidate) {
            chosen.push(candidate);
        }
    }
    chosen
}

/// D²-weighted (k-means++ style) probabilistic seeding.
///
/// The first center is picked uniformly; each subsequent center is sampled
/// with probability proportional to its squared distance to the nearest
/// already-chosen center. Duplicate draws are resampled to enforce distinct
/// rows.
pub fn seed_d2_weighted(
    schema: &FeatureSchema,
    vectors: &[FeatureVector],
    k: usize,
    rng: &mut SmallRng,
) -> Vec<usize> {
    let n = vectors.len();
    let mut chosen: Vec<usize> = vec![rng.gen_range(0..n)];

    while chosen.len() < k {
        let min_sq_dist: Vec<f64> = (0..n)
            .map(|i| {
                chosen
                    .iter()
                    .map(|&c| {
                        let d = distance(schema, &vectors[i].cells, &vectors[c].cells);
                        d * d
                    })
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();

        let total: f64 = min_sq_dist.iter().sum();
        let next = if total <= 0.0 {
            // Every remaining candidate is coincident with a chosen center;
            // fall back to uniform sampling among the unchosen rows.
            loop {
                let candidate = rng.gen_range(0..n);
                if !chosen.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            let mut target = rng.gen_range(0.0..total);
            let mut picked = n - 1;
            for (i, &w) in min_sq_dist.iter().enumerate() {
                if target < w {
                    picked = i;
                    break;
                }
                target -= w;
            }
            picked
        };

        if chosen.contains(&next) {
            continue;
        }
        chosen.push(next);
    }

    chosen
}
