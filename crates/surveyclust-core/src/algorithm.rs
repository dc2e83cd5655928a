//! Algorithm tag parsing.

use crate::error::EngineError;

/// The three partitional clustering algorithms sharing the data/feature
/// model. Parsed case-insensitively; numeric aliases are accepted for
/// backward compatibility with the source system's persisted tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AlgorithmTag {
    Lloyd,
    SeededLloyd,
    Medoid,
}

impl AlgorithmTag {
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        match raw.trim().to_uppercase().as_str() {
            "LLOYD" | "1" => Ok(AlgorithmTag::Lloyd),
            "SEEDED_LLOYD" | "2" => Ok(AlgorithmTag::SeededLloyd),
            "MEDOID" | "3" => Ok(AlgorithmTag::Medoid),
            other => Err(EngineError::UnknownAlgorithm(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmTag::Lloyd => "LLOYD",
            AlgorithmTag::SeededLloyd => "SEEDED_LLOYD",
            AlgorithmTag::Medoid => "MEDOID",
        }
    }
}
