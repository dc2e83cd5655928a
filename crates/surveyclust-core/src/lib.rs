//! SurveyClust Core - mixed-type respondent clustering engine for survey platforms.
//!
//! This crate provides:
//! - A feature schema derived from a survey's question list (numeric,
//!   ordinal, single/multi-select categorical, and free-text columns)
//! - Conversion of raw respondent answers into imputed feature vectors
//! - A heterogeneous distance function composing per-kind terms
//! - LLOYD, SEEDED-LLOYD, and MEDOID partitional clustering cores
//! - Silhouette scoring and a multi-restart, multi-k sweep driver

pub mod algorithm;
pub mod distance;
pub mod driver;
pub mod error;
pub mod lloyd;
pub mod medoid;
pub mod respondent;
pub mod schema;
pub mod seeding;
pub mod silhouette;
pub mod vector;

pub use algorithm::AlgorithmTag;
pub use driver::{best, distance as vector_distance, silhouette as clustering_silhouette, sweep, sweep_with_config, ClusterResult, EngineConfig};
pub use error::{EngineError, Result};
pub use schema::{FeatureKind, FeatureSchema, QuestionDef};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::algorithm::AlgorithmTag;
    pub use crate::driver::{best, sweep, sweep_with_config, ClusterResult, EngineConfig};
    pub use crate::error::{EngineError, Result};
    pub use crate::respondent::{Answer, AnswerValue, OrderedResolver, QuestionIndexResolver, RespondentRecord};
    pub use crate::schema::{FeatureKind, FeatureSchema, QuestionDef};
    pub use crate::vector::{FeatureCell, FeatureVector, VectorBuilder};
}
