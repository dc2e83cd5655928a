//! Medoid core: iterative assign / pick-minimizing-member clustering.
//!
//! Centers are row indices rather than synthetic vectors, keeping memory
//! flat and guaranteeing every center coincides with an actual respondent.

use crate::distance::distance;
use crate::schema::FeatureSchema;
use crate::vector::FeatureVector;

/// Outcome of running the medoid algorithm to completion.
pub struct MedoidRun {
    pub labels: Vec<usize>,
    pub medoids: Vec<usize>,
    pub iterations: usize,
}

/// Run the medoid algorithm from the given initial medoid row indices.
pub fn run(
    schema: &FeatureSchema,
    vectors: &[FeatureVector],
    initial_medoids: &[usize],
    max_iter: usize,
    mut should_stop: impl FnMut() -> bool,
) -> MedoidRun {
    let n = vectors.len();
    let k = initial_medoids.len();
    let mut medoids: Vec<usize> = initial_medoids.to_vec();
    let mut labels = vec![0usize; n];
    let mut iterations = 0;

    loop {
        if should_stop() {
            break;
        }

        labels = assign(schema, vectors, &medoids);
        iterations += 1;

        let new_medoids = update_medoids(schema, vectors, &labels, k, &medoids);
        let stable = new_medoids == medoids;
        medoids = new_medoids;

        if stable || iterations >= max_iter {
            break;
        }
    }

    // `medoids` is always updated (including any empty-cluster repair)
    // before this check runs, but `labels` was assigned against the
    // *previous* medoids. Reassign once more so the returned labels never
    // carry an empty cluster id when avoidable.
    if iterations > 0 && has_empty_cluster(&labels, k) {
        labels = assign(schema, vectors, &medoids);
    }

    MedoidRun {
        labels,
        medoids,
        iterations,
    }
}

fn has_empty_cluster(labels: &[usize], k: usize) -> bool {
    let mut seen = vec![false; k];
    for &label in labels {
        seen[label] = true;
    }
    seen.iter().any(|&present| !present)
}

fn assign(schema: &FeatureSchema, vectors: &[FeatureVector], medoids: &[usize]) -> Vec<usize> {
    vectors
        .iter()
        .map(|v| {
            medoids
                .iter()
                .enumerate()
                .map(|(cluster_id, &medoid_idx)| {
                    (cluster_id, distance(schema, &v.cells, &vectors[medoid_idx].cells))
                })
                // ties -> lowest cluster id: fold keeps the first (lowest-index) minimum
                .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
                .0
        })
        .collect()
}

fn update_medoids(
    schema: &FeatureSchema,
    vectors: &[FeatureVector],
    labels: &[usize],
    k: usize,
    previous_medoids: &[usize],
) -> Vec<usize> {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (i, &label) in labels.iter().enumerate() {
        members[label].push(i);
    }

    let mut new_medoids = Vec::with_capacity(k);
    for (cluster_id, member_idxs) in members.iter().enumerate() {
        if member_idxs.is_empty() {
            tracing::warn!(cluster = cluster_id, "empty cluster, re-seeding to max-min-distance point");
            new_medoids.push(farthest_from_all(schema, vectors, previous_medoids));
            continue;
        }
        if member_idxs.len() == 1 {
            new_medoids.push(member_idxs[0]);
            continue;
        }
        let best = member_idxs
            .iter()
            .map(|&candidate| {
                let total: f64 = member_idxs
                    .iter()
                    .filter(|&&other| other != candidate)
                    .map(|&other| distance(schema, &vectors[candidate].cells, &vectors[other].cells))
                    .sum();
                (candidate, total)
            })
            .fold((member_idxs[0], f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
            .0;
        new_medoids.push(best);
    }
    new_medoids
}

/// Row with maximum minimum-distance to the existing medoids, per the
/// empty-cluster repair policy.
fn farthest_from_all(schema: &FeatureSchema, vectors: &[FeatureVector], medoids: &[usize]) -> usize {
    vectors
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let min_dist = medoids
                .iter()
                .map(|&m| distance(schema, &v.cells, &vectors[m].cells))
                .fold(f64::INFINITY, f64::min);
            (i, min_dist)
        })
        .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0
}
