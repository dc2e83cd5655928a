//! Vector builder: converts respondent answer maps into fixed-length
//! feature vectors of tagged cells, imputing missing cells column-wise.

use std::collections::{HashMap, HashSet};

use crate::error::{EngineError, Result};
use crate::respondent::{AnswerValue, QuestionIndexResolver, RespondentRecord};
use crate::schema::{ColumnMeta, FeatureSchema};

/// One respondent's value for one column. Matches the column's declared
/// kind; `Missing` is resolved away during imputation.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureCell {
    Numeric(f64),
    Ordinal(usize),
    CategoricalSingle(String),
    CategoricalMulti(HashSet<String>),
    FreeText(String),
    Missing,
}

impl FeatureCell {
    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureCell::Missing)
    }
}

/// A fixed-length sequence of feature cells representing one respondent.
/// After [`VectorBuilder::build`], no cell is `Missing`.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub user_id: String,
    pub cells: Vec<FeatureCell>,
}

/// Builds finalized feature vectors for a respondent population against a
/// fixed schema.
pub struct VectorBuilder<'a> {
    schema: &'a FeatureSchema,
}

impl<'a> VectorBuilder<'a> {
    pub fn new(schema: &'a FeatureSchema) -> Self {
        Self { schema }
    }

    /// Build finalized vectors for every respondent.
    ///
    /// `survey_id` is forwarded to the resolver for every answer lookup.
    pub fn build(
        &self,
        survey_id: &str,
        respondents: &[RespondentRecord],
        resolver: &dyn QuestionIndexResolver,
    ) -> Result<Vec<FeatureVector>> {
        if respondents.is_empty() {
            return Err(EngineError::NoRespondents);
        }

        let f = self.schema.num_features();
        let mut raw: Vec<Vec<FeatureCell>> = Vec::with_capacity(respondents.len());

        for respondent in respondents {
            let mut row = vec![FeatureCell::Missing; f];
            for answer in &respondent.answers {
                let idx = resolver.resolve(survey_id, &answer.question_id);
                if idx < 0 {
                    continue;
                }
                let idx = idx as usize;
                if idx >= f {
                    continue;
                }
                row[idx] = self.convert(self.schema.column(idx), &answer.value);
            }
            raw.push(row);
        }

        let imputed = self.impute(raw, f);

        Ok(respondents
            .iter()
            .zip(imputed.into_iter())
            .map(|(r, cells)| FeatureVector {
                user_id: r.user_id.clone(),
                cells,
            })
            .collect())
    }

    fn convert(&self, column: &ColumnMeta, value: &AnswerValue) -> FeatureCell {
        match (column, value) {
            (_, AnswerValue::Missing) => FeatureCell::Missing,
            (ColumnMeta::Numeric { .. }, AnswerValue::Number(v)) => {
                if v.is_finite() {
                    FeatureCell::Numeric(*v)
                } else {
                    tracing::warn!(value = v, "numeric value not finite, treating as missing");
                    FeatureCell::Missing
                }
            }
            (ColumnMeta::Numeric { .. }, AnswerValue::Label(s) | AnswerValue::Text(s)) => {
                match s.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => FeatureCell::Numeric(v),
                    _ => {
                        tracing::warn!(raw = %s, "numeric parse failed, treating as missing");
                        FeatureCell::Missing
                    }
                }
            }
            (ColumnMeta::Ordinal { .. }, AnswerValue::Label(s) | AnswerValue::Text(s)) => {
                match column.ordinal_rank(s) {
                    Some(rank) => FeatureCell::Ordinal(rank),
                    None => FeatureCell::Missing,
                }
            }
            (ColumnMeta::CategoricalSingle { universe }, AnswerValue::Label(s) | AnswerValue::Text(s)) => {
                if s.is_empty() {
                    FeatureCell::Missing
                } else if universe.iter().any(|u| u == s) {
                    FeatureCell::CategoricalSingle(s.clone())
                } else {
                    FeatureCell::Missing
                }
            }
            (ColumnMeta::CategoricalMulti { universe }, value) => {
                let raw_labels = match value {
                    AnswerValue::Set(labels) => labels.clone(),
                    AnswerValue::Label(s) | AnswerValue::Text(s) => parse_multi_string(s),
                    _ => Vec::new(),
                };
                let set: HashSet<String> = raw_labels
                    .into_iter()
                    .filter(|l| universe.iter().any(|u| u == l))
                    .collect();
                if set.is_empty() {
                    FeatureCell::Missing
                } else {
                    FeatureCell::CategoricalMulti(set)
                }
            }
            (ColumnMeta::FreeText, AnswerValue::Label(s) | AnswerValue::Text(s)) => {
                if s.is_empty() {
                    FeatureCell::Missing
                } else {
                    FeatureCell::FreeText(s.clone())
                }
            }
            _ => FeatureCell::Missing,
        }
    }

    /// Impute missing cells column-wise, per §4.2.
    fn impute(&self, mut rows: Vec<Vec<FeatureCell>>, f: usize) -> Vec<Vec<FeatureCell>> {
        for col_idx in 0..f {
            let column = self.schema.column(col_idx);
            match column {
                ColumnMeta::Numeric { min, max } => {
                    let values: Vec<f64> = rows
                        .iter()
                        .filter_map(|r| match &r[col_idx] {
                            FeatureCell::Numeric(v) => Some(*v),
                            _ => None,
                        })
                        .collect();
                    let fill = if values.is_empty() {
                        tracing::warn!(column = col_idx, "numeric column fully missing, imputing midpoint");
                        (min + max) / 2.0
                    } else {
                        values.iter().sum::<f64>() / values.len() as f64
                    };
                    for row in rows.iter_mut() {
                        if row[col_idx].is_missing() {
                            row[col_idx] = FeatureCell::Numeric(fill);
                        }
                    }
                }
                ColumnMeta::Ordinal { .. } => {
                    let ranks: Vec<usize> = rows
                        .iter()
                        .filter_map(|r| match &r[col_idx] {
                            FeatureCell::Ordinal(rank) => Some(*rank),
                            _ => None,
                        })
                        .collect();
                    let fill = if ranks.is_empty() {
                        0
                    } else {
                        let mean = ranks.iter().sum::<usize>() as f64 / ranks.len() as f64;
                        mean.round() as usize
                    };
                    for row in rows.iter_mut() {
                        if row[col_idx].is_missing() {
                            row[col_idx] = FeatureCell::Ordinal(fill);
                        }
                    }
                }
                ColumnMeta::CategoricalSingle { universe } => {
                    let mut counts: HashMap<&str, usize> = HashMap::new();
                    for row in &rows {
                        if let FeatureCell::CategoricalSingle(label) = &row[col_idx] {
                            *counts.entry(label.as_str()).or_insert(0) += 1;
                        }
                    }
                    // `max_by_key` would keep the *last* tied label; declared
                    // order must win ties, so fold with a strict `>` instead.
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
                    for row in rows.iter_mut() {
                        if row[col_idx].is_missing() {
                            row[col_idx] = FeatureCell::CategoricalSingle(mode.clone());
                        }
                    }
                }
                ColumnMeta::CategoricalMulti { .. } => {
                    for row in rows.iter_mut() {
                        if row[col_idx].is_missing() {
                            row[col_idx] = FeatureCell::CategoricalMulti(HashSet::new());
                        }
                    }
                }
                ColumnMeta::FreeText => {
                    for row in rows.iter_mut() {
                        if row[col_idx].is_missing() {
                            row[col_idx] = FeatureCell::FreeText(String::new());
                        }
                    }
                }
            }
        }
        rows
    }
}

/// Parse a CATEGORICAL_MULTI raw string value into labels.
///
/// Accepts the persistence layer's `SET:a|||b|||c` encoding (Open Question
/// #2) as well as a plain comma-separated string.
fn parse_multi_string(raw: &str) -> Vec<String> {
    let body = raw.strip_prefix("SET:").unwrap_or(raw);
    if raw.starts_with("SET:") {
        body.split("|||").map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
    } else {
        body.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
    }
}
