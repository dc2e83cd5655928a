//! Driver: validates inputs, sweeps k, performs multi-restart selection,
//! and returns one best result per k.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::AlgorithmTag;
use crate::distance::distance as distance_fn;
use crate::error::{EngineError, Result};
use crate::lloyd;
use crate::medoid;
use crate::respondent::{QuestionIndexResolver, RespondentRecord};
use crate::schema::{FeatureSchema, QuestionDef};
use crate::seeding::{seed_d2_weighted, seed_uniform};
use crate::silhouette::silhouette as silhouette_fn;
use crate::vector::{FeatureVector, VectorBuilder};

/// Tunable driver parameters (Open Question #3: restart count is
/// configurable rather than a hard-coded constant).
#[derive(Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum assign/update iterations per restart.
    pub max_iter: usize,
    /// Number of restarts evaluated per k; the best-silhouette restart wins.
    pub restarts: usize,
    /// Multiplier used to derive each restart's PRNG seed: `seed = restart_index * seed_base`.
    pub seed_base: u64,
    /// Cooperative cancellation check, consulted between algorithm iterations.
    #[serde(skip)]
    pub cancel: Option<Arc<dyn Fn() -> bool + Send + Sync>>,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("max_iter", &self.max_iter)
            .field("restarts", &self.restarts)
            .field("seed_base", &self.seed_base)
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iter: 100,
            restarts: 10,
            seed_base: 1000,
            cancel: None,
        }
    }
}

impl EngineConfig {
    pub fn with_max_iter(max_iter: usize) -> Self {
        Self {
            max_iter,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(EngineError::InvalidParameters(
                "max_iter must be > 0".to_string(),
            ));
        }
        if self.restarts == 0 {
            return Err(EngineError::InvalidParameters(
                "restarts must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    fn should_stop(&self) -> bool {
        self.cancel.as_ref().map(|f| f()).unwrap_or(false)
    }
}

/// One best-per-k clustering result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterResult {
    pub survey_id: String,
    pub algorithm_tag: AlgorithmTag,
    pub k: usize,
    pub silhouette: f64,
    /// cluster id -> member user ids; partitions the respondent population.
    pub groups: HashMap<usize, Vec<String>>,
    pub seed: u64,
}

/// Sweep k in `[2, k_max]` (clamped to `n`), running `config.restarts`
/// restarts per k and keeping the best-silhouette run. Returns one `Result`
/// per k, in increasing k order.
pub fn sweep(
    survey_id: &str,
    respondents: &[RespondentRecord],
    questions: &[QuestionDef],
    resolver: &dyn QuestionIndexResolver,
    algo: AlgorithmTag,
    k_max: usize,
    max_iter: usize,
) -> Result<Vec<ClusterResult>> {
    sweep_with_config(
        survey_id,
        respondents,
        questions,
        resolver,
        algo,
        k_max,
        &EngineConfig::with_max_iter(max_iter),
    )
}

/// Same as [`sweep`] but with full control over restart count, seed base,
/// and cooperative cancellation via [`EngineConfig`].
pub fn sweep_with_config(
    survey_id: &str,
    respondents: &[RespondentRecord],
    questions: &[QuestionDef],
    resolver: &dyn QuestionIndexResolver,
    algo: AlgorithmTag,
    k_max: usize,
    config: &EngineConfig,
) -> Result<Vec<ClusterResult>> {
    if survey_id.is_empty() {
        return Err(EngineError::InvalidParameters("survey_id must not be empty".to_string()));
    }
    if k_max < 2 {
        return Err(EngineError::InvalidParameters(format!(
            "k_max must be >= 2, got {k_max}"
        )));
    }
    config.validate()?;
    if respondents.is_empty() {
        return Err(EngineError::NoRespondents);
    }

    let schema = FeatureSchema::build(questions)?;
    let vectors = VectorBuilder::new(&schema).build(survey_id, respondents, resolver)?;

    let n = vectors.len();
    let clamped_k_max = k_max.min(n);

    if config.should_stop() {
        return Err(EngineError::Cancelled);
    }

    tracing::info!(survey_id = %survey_id, algorithm = algo.as_str(), k_max = clamped_k_max, n, "starting sweep");

    let ks: Vec<usize> = (2..=clamped_k_max).collect();
    let results: Vec<ClusterResult> = ks
        .into_par_iter()
        .map(|k| best_of_restarts(&schema, &vectors, survey_id, algo, k, config))
        .collect::<std::result::Result<Vec<_>, EngineError>>()?;

    Ok(results)
}

fn best_of_restarts(
    schema: &FeatureSchema,
    vectors: &[FeatureVector],
    survey_id: &str,
    algo: AlgorithmTag,
    k: usize,
    config: &EngineConfig,
) -> std::result::Result<ClusterResult, EngineError> {
    if config.should_stop() {
        return Err(EngineError::Cancelled);
    }

    let restarts: Vec<(usize, u64, Vec<usize>, f64)> = (0..config.restarts)
        .into_par_iter()
        .map(|r| {
            let seed = r as u64 * config.seed_base;
            let mut rng = SmallRng::seed_from_u64(seed);
            let initial = match algo {
                AlgorithmTag::Lloyd | AlgorithmTag::Medoid => seed_uniform(vectors.len(), k, &mut rng),
                AlgorithmTag::SeededLloyd => seed_d2_weighted(schema, vectors, k, &mut rng),
            };

            let labels = match algo {
                AlgorithmTag::Lloyd | AlgorithmTag::SeededLloyd => {
                    lloyd::run(schema, vectors, &initial, config.max_iter, || config.should_stop()).labels
                }
                AlgorithmTag::Medoid => {
                    medoid::run(schema, vectors, &initial, config.max_iter, || config.should_stop()).labels
                }
            };

            let score = silhouette_fn(schema, vectors, &labels, k);
            (r, seed, labels, score)
        })
        .collect();

    // Keep the run with highest silhouette; ties favor the earlier restart.
    // `restarts` preserves input order (rayon's collect on an indexed
    // iterator), so a strict `>` comparison during a left-to-right fold
    // keeps the first of any tied restarts.
    let (best_r, best_seed, best_labels, best_score) = restarts
        .into_iter()
        .fold(None, |acc: Option<(usize, u64, Vec<usize>, f64)>, cur| match acc {
            None => Some(cur),
            Some(best) if cur.3 > best.3 => Some(cur),
            Some(best) => Some(best),
        })
        .expect("restarts is non-empty because config.restarts > 0 was validated");

    tracing::debug!(k, restart = best_r, seed = best_seed, silhouette = best_score, "best restart selected");

    let mut groups: HashMap<usize, Vec<String>> = HashMap::new();
    for (i, &label) in best_labels.iter().enumerate() {
        groups.entry(label).or_default().push(vectors[i].user_id.clone());
    }

    Ok(ClusterResult {
        survey_id: survey_id.to_string(),
        algorithm_tag: algo,
        k,
        silhouette: best_score,
        groups,
        seed: best_seed,
    })
}

/// The entry with maximum silhouette, or `None` for an empty input.
pub fn best(results: &[ClusterResult]) -> Option<&ClusterResult> {
    results
        .iter()
        .fold(None, |acc, cur| match acc {
            None => Some(cur),
            Some(best) if cur.silhouette > best.silhouette => Some(cur),
            Some(best) => Some(best),
        })
}

/// Standalone distance entry point (exposed per the engine's external
/// interface contract alongside `sweep`, `best`, and `silhouette`).
pub fn distance(schema: &FeatureSchema, a: &FeatureVector, b: &FeatureVector) -> f64 {
    distance_fn(schema, &a.cells, &b.cells)
}

/// Standalone silhouette entry point.
pub fn silhouette(schema: &FeatureSchema, vectors: &[FeatureVector], labels: &[usize], k: usize) -> f64 {
    silhouette_fn(schema, vectors, labels, k)
}
