use crate::domain::stock::StockDetails;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub stock: StockDetails,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Initial,
    Shuffle,
}

impl RunKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RunKind::Initial => "initial",
            RunKind::Shuffle => "shuffle",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRun {
    pub kind: RunKind,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<Recommendation>,
}

/// Body of `GET /shuffle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShuffleResponse {
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recommendations: Vec<Recommendation>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Recommendation>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Recommendation>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ShuffleResponse {
    pub const NO_MATCHES: &'static str = "No matching investments found";

    pub fn found(recommendations: Vec<Recommendation>) -> Self {
        Self {
            error: None,
            recommendations,
        }
    }

    pub fn not_found() -> Self {
        Self {
            error: Some(Self::NO_MATCHES.to_string()),
            recommendations: Vec::new(),
        }
    }

    /// Records a client should render: nothing at all when `error` is set.
    pub fn renderable(&self) -> &[Recommendation] {
        if self.error.is_some() {
            &[]
        } else {
            &self.recommendations
        }
    }
}
