//! Heterogeneous dissimilarity between two finalized feature vectors.

use crate::schema::{ColumnMeta, FeatureSchema};
use crate::vector::FeatureCell;

/// Total dissimilarity `D(a, b) = sqrt(sum(d_c^2))` over every column that
/// contributes to distance (everything but FREE_TEXT).
///
/// `a` and `b` must be finalized vectors (no `Missing` cells) built against
/// `schema`. Symmetric and zero on the diagonal by construction; not a true
/// metric (the triangle inequality is not guaranteed by the Euclidean
/// roll-up of Jaccard terms).
pub fn distance(schema: &FeatureSchema, a: &[FeatureCell], b: &[FeatureCell]) -> f64 {
    let mut sum_sq = 0.0;
    for i in 0..schema.num_features() {
        let d = per_feature_distance(schema.column(i), &a[i], &b[i]);
        sum_sq += d * d;
    }
    sum_sq.sqrt()
}

fn per_feature_distance(column: &ColumnMeta, a: &FeatureCell, b: &FeatureCell) -> f64 {
    match (column, a, b) {
        (ColumnMeta::Numeric { min, max }, FeatureCell::Numeric(x), FeatureCell::Numeric(y)) => {
            let width = max - min;
            if width.abs() < f64::EPSILON {
                0.0
            } else {
                (x - y).abs() / width
            }
        }
        (ColumnMeta::Ordinal { labels }, FeatureCell::Ordinal(x), FeatureCell::Ordinal(y)) => {
            let l = labels.len();
            if l <= 1 {
                0.0
            } else {
                (*x as f64 - *y as f64).abs() / (l - 1) as f64
            }
        }
        (
            ColumnMeta::CategoricalSingle { .. },
            FeatureCell::CategoricalSingle(x),
            FeatureCell::CategoricalSingle(y),
        ) => {
            if x == y {
                0.0
            } else {
                1.0
            }
        }
        (
            ColumnMeta::CategoricalMulti { .. },
            FeatureCell::CategoricalMulti(x),
            FeatureCell::CategoricalMulti(y),
        ) => {
            if x.is_empty() && y.is_empty() {
                0.0
            } else {
                let intersection = x.intersection(y).count();
                let union = x.union(y).count();
                1.0 - (intersection as f64 / union as f64)
            }
        }
        (ColumnMeta::FreeText, _, _) => 0.0,
        _ => 0.0,
    }
}
