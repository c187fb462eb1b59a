use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{Opportunity, StudentProfile};

/// Request to find matches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(nested)]
    pub profile: StudentProfile,
    /// Catalog to match against; the service's loaded catalog when absent
    #[serde(default)]
    pub opportunities: Option<Vec<Opportunity>>,
    #[serde(default)]
    #[serde(alias = "top_n", rename = "topN")]
    pub top_n: Option<u16>,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default)]
    #[serde(alias = "min_confidence", rename = "minConfidence")]
    pub min_confidence: Option<f64>,
}
