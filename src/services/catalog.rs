use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::Opportunity;

/// Errors that can occur while loading the opportunity catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable snapshot of the opportunity catalog
///
/// Expired flags are computed once at load time; the matcher only reads them.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    opportunities: Arc<Vec<Opportunity>>,
}

impl Catalog {
    /// Load the catalog from a JSON array of opportunities
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let catalog = Self::from_json(&raw, Utc::now())?;

        tracing::info!(
            "Loaded {} opportunities from {}",
            catalog.len(),
            path.as_ref().display()
        );

        Ok(catalog)
    }

    pub fn from_json(raw: &str, now: DateTime<Utc>) -> Result<Self, CatalogError> {
        let opportunities: Vec<Opportunity> = serde_json::from_str(raw)?;
        Ok(Self::from_opportunities(opportunities, now))
    }

    pub fn from_opportunities(opportunities: Vec<Opportunity>, now: DateTime<Utc>) -> Self {
        let opportunities = opportunities
            .into_iter()
            .map(|mut opportunity| {
                if opportunity.is_past_deadline(now) {
                    opportunity.expired = true;
                }
                opportunity
            })
            .collect();

        Self {
            opportunities: Arc::new(opportunities),
        }
    }

    /// Shared read-only view handed to the matcher
    pub fn snapshot(&self) -> Arc<Vec<Opportunity>> {
        Arc::clone(&self.opportunities)
    }

    pub fn len(&self) -> usize {
        self.opportunities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }

    pub fn expired_count(&self) -> usize {
        self.opportunities.iter().filter(|o| o.expired).count()
    }
}
