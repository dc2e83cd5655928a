//! Feature schema: per-column metadata derived once from a survey's question list.

use crate::error::{EngineError, Result};

/// The kind of a survey question, and therefore of the feature column it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FeatureKind {
    Numeric,
    Ordinal,
    CategoricalSingle,
    CategoricalMulti,
    FreeText,
}

/// One question in a survey's ordered question list, as supplied by the
/// domain store collaborator.
#[derive(Debug, Clone)]
pub struct QuestionDef {
    pub id: String,
    pub kind: FeatureKind,
    /// Declared (min, max) for NUMERIC questions.
    pub numeric_range: Option<(f64, f64)>,
    /// Declared option order for ORDINAL questions.
    pub ordinal_labels: Vec<String>,
    /// Declared option universe for CATEGORICAL_SINGLE / CATEGORICAL_MULTI questions.
    pub option_universe: Vec<String>,
}

impl QuestionDef {
    pub fn numeric(id: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            id: id.into(),
            kind: FeatureKind::Numeric,
            numeric_range: Some((min, max)),
            ordinal_labels: Vec::new(),
            option_universe: Vec::new(),
        }
    }

    pub fn ordinal(id: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            id: id.into(),
            kind: FeatureKind::Ordinal,
            numeric_range: None,
            ordinal_labels: labels,
            option_universe: Vec::new(),
        }
    }

    pub fn categorical_single(id: impl Into<String>, universe: Vec<String>) -> Self {
        Self {
            id: id.into(),
            kind: FeatureKind::CategoricalSingle,
            numeric_range: None,
            ordinal_labels: Vec::new(),
            option_universe: universe,
        }
    }

    pub fn categorical_multi(id: impl Into<String>, universe: Vec<String>) -> Self {
        Self {
            id: id.into(),
            kind: FeatureKind::CategoricalMulti,
            numeric_range: None,
            ordinal_labels: Vec::new(),
            option_universe: universe,
        }
    }

    pub fn free_text(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: FeatureKind::FreeText,
            numeric_range: None,
            ordinal_labels: Vec::new(),
            option_universe: Vec::new(),
        }
    }
}

/// Per-column metadata needed for vector building, distance, and aggregation.
#[derive(Debug, Clone)]
pub enum ColumnMeta {
    Numeric {
        min: f64,
        max: f64,
    },
    Ordinal {
        /// Declared labels in rank order; rank of `labels[i]` is `i`.
        labels: Vec<String>,
    },
    CategoricalSingle {
        universe: Vec<String>,
    },
    CategoricalMulti {
        universe: Vec<String>,
    },
    FreeText,
}

impl ColumnMeta {
    pub fn kind(&self) -> FeatureKind {
        match self {
            ColumnMeta::Numeric { .. } => FeatureKind::Numeric,
            ColumnMeta::Ordinal { .. } => FeatureKind::Ordinal,
            ColumnMeta::CategoricalSingle { .. } => FeatureKind::CategoricalSingle,
            ColumnMeta::CategoricalMulti { .. } => FeatureKind::CategoricalMulti,
            ColumnMeta::FreeText => FeatureKind::FreeText,
        }
    }

    /// Rank of `label` in an ORDINAL column's declared order, if any.
    pub fn ordinal_rank(&self, label: &str) -> Option<usize> {
        match self {
            ColumnMeta::Ordinal { labels } => labels.iter().position(|l| l == label),
            _ => None,
        }
    }

    /// Number of declared ranks for an ORDINAL column.
    pub fn ordinal_len(&self) -> usize {
        match self {
            ColumnMeta::Ordinal { labels } => labels.len(),
            _ => 0,
        }
    }
}

/// Immutable, deterministic per-column metadata derived once from the
/// ordered question list. Independent of the respondent set.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Vec<ColumnMeta>,
}

impl FeatureSchema {
    /// Build the schema from an ordered question list.
    ///
    /// Column order follows question order; column index `i` corresponds to
    /// `questions[i]`.
    pub fn build(questions: &[QuestionDef]) -> Result<Self> {
        let mut columns = Vec::with_capacity(questions.len());

        for q in questions {
            let column = match q.kind {
                FeatureKind::Numeric => {
                    let (mut min, mut max) = q.numeric_range.ok_or_else(|| {
                        EngineError::InvalidSchema(format!(
                            "question '{}' is NUMERIC but has no declared range",
                            q.id
                        ))
                    })?;
                    if min > max {
                        return Err(EngineError::InvalidSchema(format!(
                            "question '{}' has min > max ({} > {})",
                            q.id, min, max
                        )));
                    }
                    if (max - min).abs() < f64::EPSILON {
                        // Zero-width range: expand symmetrically so normalization
                        // in the distance function never divides by zero.
                        min -= 0.5;
                        max += 0.5;
                    }
                    ColumnMeta::Numeric { min, max }
                }
                FeatureKind::Ordinal => {
                    if q.ordinal_labels.is_empty() {
                        return Err(EngineError::InvalidSchema(format!(
                            "question '{}' is ORDINAL but has no declared labels",
                            q.id
                        )));
                    }
                    let mut seen = std::collections::HashSet::new();
                    for label in &q.ordinal_labels {
                        if !seen.insert(label) {
                            return Err(EngineError::InvalidSchema(format!(
                                "question '{}' has duplicate ordinal label '{}'",
                                q.id, label
                            )));
                        }
                    }
                    ColumnMeta::Ordinal {
                        labels: q.ordinal_labels.clone(),
                    }
                }
                FeatureKind::CategoricalSingle => {
                    if q.option_universe.is_empty() {
                        return Err(EngineError::InvalidSchema(format!(
                            "question '{}' is CATEGORICAL_SINGLE but has an empty universe",
                            q.id
                        )));
                    }
                    ColumnMeta::CategoricalSingle {
                        universe: q.option_universe.clone(),
                    }
                }
                FeatureKind::CategoricalMulti => {
                    if q.option_universe.is_empty() {
                        return Err(EngineError::InvalidSchema(format!(
                            "question '{}' is CATEGORICAL_MULTI but has an empty universe",
                            q.id
                        )));
                    }
                    ColumnMeta::CategoricalMulti {
                        universe: q.option_universe.clone(),
                    }
                }
                FeatureKind::FreeText => ColumnMeta::FreeText,
            };
            columns.push(column);
        }

        Ok(Self { columns })
    }

    pub fn num_features(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> &ColumnMeta {
        &self.columns[index]
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Number of features that actually contribute to distance (everything
    /// but FREE_TEXT, which is carried for reporting only).
    pub fn num_effective_features(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| !matches!(c, ColumnMeta::FreeText))
            .count()
    }
}
