//! Cluster-quality score combining cohesion and separation.

use crate::distance::distance;
use crate::schema::FeatureSchema;
use crate::vector::FeatureVector;

/// Mean silhouette score for a clustering, in `[-1, 1]`.
///
/// `labels[i]` must be in `[0, k)`. Singleton clusters contribute `s(i) =
/// 0`. If only one non-empty cluster exists, the whole score is `0`.
pub fn silhouette(schema: &FeatureSchema, vectors: &[FeatureVector], labels: &[usize], k: usize) -> f64 {
    let n = vectors.len();
    if n == 0 {
        return 0.0;
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (i, &label) in labels.iter().enumerate() {
        members[label].push(i);
    }
    let non_empty = members.iter().filter(|m| !m.is_empty()).count();
    if non_empty <= 1 {
        return 0.0;
    }

    let scores: Vec<f64> = (0..n)
        .map(|i| {
            let own_cluster = labels[i];
            let own_members = &members[own_cluster];

            if own_members.len() <= 1 {
                return 0.0;
            }

            let a = mean_distance_to(schema, vectors, i, own_members, true);

            let b = members
                .iter()
                .enumerate()
                .filter(|(cluster_id, m)| *cluster_id != own_cluster && !m.is_empty())
                .map(|(_, m)| mean_distance_to(schema, vectors, i, m, false))
                .fold(f64::INFINITY, f64::min);

            let denom = a.max(b);
            if denom <= 0.0 {
                0.0
            } else {
                (b - a) / denom
            }
        })
        .collect();

    let mean = scores.iter().sum::<f64>() / n as f64;
    mean.clamp(-1.0, 1.0)
}

/// Mean distance from row `i` to every row in `members`. When
/// `exclude_self` is set, `i` itself (if present in `members`) is skipped.
fn mean_distance_to(
    schema: &FeatureSchema,
    vectors: &[FeatureVector],
    i: usize,
    members: &[usize],
    exclude_self: bool,
) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for &j in members {
        if exclude_self && j == i {
            continue;
        }
        total += distance(schema, &vectors[i].cells, &vectors[j].cells);
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
