//! Lloyd core: iterative assign / recompute-mean-centroid clustering.
//!
//! Shared by the LLOYD (uniform seeding) and SEEDED-LLOYD (D²-weighted
//! seeding) algorithm tags — the iteration itself is identical; only the
//! seeding strategy differs, so the driver supplies the initial centers.

use std::collections::HashMap;

use crate::distance::distance;
use crate::schema::{ColumnMeta, FeatureSchema};
use crate::vector::{FeatureCell, FeatureVector};

/// Outcome of running Lloyd's algorithm to completion.
pub struct LloydRun {
    pub labels: Vec<usize>,
    pub centers: Vec<Vec<FeatureCell>>,
    pub iterations: usize,
}

/// Run Lloyd's algorithm from the given initial center indices.
///
/// `max_iter` bounds the number of assign/update cycles; convergence
/// (stable assignments) can stop earlier. A cooperative `should_stop`
/// closure is checked between iterations so long sweeps can be cancelled.
pub fn run(
    schema: &FeatureSchema,
    vectors: &[FeatureVector],
    initial_centers: &[usize],
    max_iter: usize,
    mut should_stop: impl FnMut() -> bool,
) -> LloydRun {
    let n = vectors.len();
    let k = initial_centers.len();
    let mut centers: Vec<Vec<FeatureCell>> = initial_centers
        .iter()
        .map(|&idx| vectors[idx].cells.clone())
        .collect();
    let mut labels = vec![0usize; n];
    let mut iterations = 0;

    loop {
        if should_stop() {
            break;
        }

        let new_labels = assign(schema, vectors, &centers);
        let stable = new_labels == labels && iterations > 0;
        labels = new_labels;
        iterations += 1;

        if stable || iterations >= max_iter {
            break;
        }

        centers = update_centers(schema, vectors, &labels, k, &centers);
    }

    // If the loop exited (cancellation or max_iter) on the same pass that
    // would have repaired an empty cluster, `labels` still reflects the
    // pre-repair assignment because the repaired center was never
    // reassigned against. Run the repair and one more assignment so the
    // returned labels never carry an empty cluster id when avoidable.
    if iterations > 0 && has_empty_cluster(&labels, k) {
        centers = update_centers(schema, vectors, &labels, k, &centers);
        labels = assign(schema, vectors, &centers);
    }

    LloydRun {
        labels,
        centers,
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

fn assign(
    schema: &FeatureSchema,
    vectors: &[FeatureVector],
    centers: &[Vec<FeatureCell>],
) -> Vec<usize> {
    vectors
        .iter()
        .map(|v| {
            centers
                .iter()
                .enumerate()
                .map(|(i, c)| (i, distance(schema, &v.cells, c)))
                .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
                .0
        })
        .collect()
}

fn update_centers(
    schema: &FeatureSchema,
    vectors: &[FeatureVector],
    labels: &[usize],
    k: usize,
    previous_centers: &[Vec<FeatureCell>],
) -> Vec<Vec<FeatureCell>> {
    let f = schema.num_features();
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (i, &label) in labels.iter().enumerate() {
        members[label].push(i);
    }

    let mut centers = Vec::with_capacity(k);
    for (cluster_id, member_idxs) in members.iter().enumerate() {
        if member_idxs.is_empty() {
            tracing::warn!(cluster = cluster_id, "empty cluster, re-seeding to farthest point");
            let farthest = farthest_point(schema, vectors, &previous_centers[cluster_id]);
            centers.push(vectors[farthest].cells.clone());
            continue;
        }
        let mut cell_row = Vec::with_capacity(f);
        for col_idx in 0..f {
            cell_row.push(aggregate_column(schema.column(col_idx), vectors, member_idxs, col_idx));
        }
        centers.push(cell_row);
    }
    centers
}

fn farthest_point(schema: &FeatureSchema, vectors: &[FeatureVector], from: &[FeatureCell]) -> usize {
    vectors
        .iter()
        .enumerate()
        .map(|(i, v)| (i, distance(schema, &v.cells, from)))
        .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0
}

fn aggregate_column(
    column: &ColumnMeta,
    vectors: &[FeatureVector],
    member_idxs: &[usize],
    col_idx: usize,
) -> FeatureCell {
    match column {
        ColumnMeta::Numeric { min, max } => {
            // Clamp to the declared range for center computation only;
            // distance still uses the raw value.
            let sum: f64 = member_idxs
                .iter()
                .map(|&i| match &vectors[i].cells[col_idx] {
                    FeatureCell::Numeric(v) => v.clamp(*min, *max),
                    _ => 0.0,
                })
                .sum();
            FeatureCell::Numeric(sum / member_idxs.len() as f64)
        }
        ColumnMeta::Ordinal { .. } => {
            let sum: usize = member_idxs
                .iter()
                .map(|&i| match &vectors[i].cells[col_idx] {
                    FeatureCell::Ordinal(r) => *r,
                    _ => 0,
                })
                .sum();
            let mean = sum as f64 / member_idxs.len() as f64;
            FeatureCell::Ordinal(mean.round() as usize)
        }
        ColumnMeta::CategoricalSingle { universe } => {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for &i in member_idxs {
                if let FeatureCell::CategoricalSingle(label) = &vectors[i].cells[col_idx] {
                    *counts.entry(label.as_str()).or_insert(0) += 1;
                }
            }
            // `max_by_key` would keep the *last* tied label; declared order
            // must win ties, so fold with a strict `>` instead.
            let mode = universe
                .iter()
                .fold(None::<(&String, usize)>, |best, label| {
                    let count = counts.get(label.as_str()).copied().unwrap_or(0);
                    match best {
                        Some((_, best_count)) if best_count >= count => best,
                        _ => Some((label, count)),
                    }
                })
                .map(|(label, _)| label.clone())
                .unwrap_or_else(|| universe[0].clone());
            FeatureCell::CategoricalSingle(mode)
        }
        ColumnMeta::CategoricalMulti { universe } => {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for &i in member_idxs {
                if let FeatureCell::CategoricalMulti(set) = &vectors[i].cells[col_idx] {
                    for label in set {
                        *counts.entry(label.as_str()).or_insert(0) += 1;
                    }
                }
            }
            let threshold = member_idxs.len() as f64 / 2.0;
            let majority: std::collections::HashSet<String> = universe
                .iter()
                .filter(|label| counts.get(label.as_str()).copied().unwrap_or(0) as f64 > threshold)
                .cloned()
                .collect();
            FeatureCell::CategoricalMulti(majority)
        }
        ColumnMeta::FreeText => FeatureCell::FreeText(String::new()),
    }
}
