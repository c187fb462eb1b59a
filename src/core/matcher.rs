use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use thiserror::Error;
use validator::Validate;

use crate::core::{
    blindspot::assess,
    criteria::{evaluate_criteria, CriteriaError},
    explanation::{insight, ExplanationBuilder},
    scoring::compose,
};
use crate::models::{BlindspotRules, MatchResult, Opportunity, ScoringWeights, StudentProfile};

/// Errors surfaced by a matching run
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Malformed criteria on opportunity {opportunity_id}: {source}")]
    MalformedCriteria {
        opportunity_id: String,
        #[source]
        source: CriteriaError,
    },
}

/// Caller-controlled knobs for a single run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MatchOptions {
    /// Keep only the best `top_n` results; `None` returns everything
    pub top_n: Option<usize>,
    /// Drop results whose confidence falls below this floor
    pub min_confidence: Option<f64>,
}

/// Result of the matching process
#[derive(Debug)]
pub struct MatchReport {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
    pub expired: usize,
    /// Identifiers of opportunities skipped for malformed criteria
    pub skipped: Vec<String>,
    pub below_confidence: usize,
    /// Run-level takeaway over the returned matches
    pub insight: String,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Expired opportunity filter
/// 2. Criteria evaluation
/// 3. Blindspot classification
/// 4. Score composition
/// 5. Explanation
/// 6. Ranking and truncation
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    rules: BlindspotRules,
    explainer: ExplanationBuilder,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, rules: BlindspotRules) -> Self {
        Self {
            weights,
            rules,
            explainer: ExplanationBuilder { weights, ..ExplanationBuilder::default() },
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ScoringWeights::default(), BlindspotRules::default())
    }

    /// Override the deadline urgency window and the next-step cap
    pub fn with_explanation_limits(mut self, urgency_days: i64, max_next_steps: usize) -> Self {
        self.explainer = ExplanationBuilder::new(self.weights, urgency_days, max_next_steps);
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Find, score, explain and rank opportunities for a student
    ///
    /// # Arguments
    /// * `profile` - Validated student profile
    /// * `opportunities` - Catalog snapshot; never mutated
    /// * `options` - Result cap and optional confidence floor
    ///
    /// # Returns
    /// MatchReport with ranked results, or `InvalidProfile` when the profile
    /// is missing required fields
    pub fn find_matches(
        &self,
        profile: &StudentProfile,
        opportunities: &[Opportunity],
        options: MatchOptions,
    ) -> Result<MatchReport, MatchError> {
        self.find_matches_at(profile, opportunities, options, Utc::now())
    }

    /// Same as [`Matcher::find_matches`] with an explicit clock for deadline urgency
    pub fn find_matches_at(
        &self,
        profile: &StudentProfile,
        opportunities: &[Opportunity],
        options: MatchOptions,
        now: DateTime<Utc>,
    ) -> Result<MatchReport, MatchError> {
        validate_profile(profile)?;

        let total_candidates = opportunities.len();
        let mut expired = 0;
        let mut skipped = Vec::new();
        let mut below_confidence = 0;

        let mut matches: Vec<MatchResult> = Vec::with_capacity(total_candidates);

        for opportunity in opportunities {
            // Stage 1: expired opportunities are never scored
            if opportunity.expired {
                expired += 1;
                continue;
            }

            // Stages 2-5
            let result = match self.score_opportunity(profile, opportunity, now) {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!("Skipping opportunity: {}", e);
                    skipped.push(opportunity.id.clone());
                    continue;
                }
            };

            if let Some(floor) = options.min_confidence {
                if result.score.confidence < floor {
                    below_confidence += 1;
                    continue;
                }
            }

            matches.push(result);
        }

        tracing::debug!(
            "Filtered {} expired and {} low-confidence opportunities",
            expired,
            below_confidence
        );

        // Stage 6: deterministic ranking
        matches.sort_by(rank_order);

        if let Some(top_n) = options.top_n {
            matches.truncate(top_n);
        }

        tracing::info!(
            "Returning {} matches for student {} (from {} candidates, {} skipped)",
            matches.len(),
            profile.student_id.as_deref().unwrap_or("anonymous"),
            total_candidates,
            skipped.len()
        );

        let insight = insight(profile, &matches);

        Ok(MatchReport {
            matches,
            total_candidates,
            expired,
            skipped,
            below_confidence,
            insight,
        })
    }

    /// Run evaluation, classification, scoring and explanation for one opportunity
    pub fn score_opportunity(
        &self,
        profile: &StudentProfile,
        opportunity: &Opportunity,
        now: DateTime<Utc>,
    ) -> Result<MatchResult, MatchError> {
        let verdicts = evaluate_criteria(profile, &opportunity.eligibility).map_err(|source| {
            MatchError::MalformedCriteria {
                opportunity_id: opportunity.id.clone(),
                source,
            }
        })?;

        let blindspot = assess(profile, opportunity, &self.rules);
        let score = compose(&verdicts, &self.weights);
        let goal = opportunity.opportunity_type.goal();
        let aligned_goal = profile.goals.contains(&goal).then_some(goal);
        let explanation = self.explainer.explain(
            &verdicts,
            &score,
            &blindspot,
            aligned_goal,
            opportunity.deadline,
            now,
        );

        Ok(MatchResult {
            opportunity: opportunity.clone(),
            score,
            blindspot_tier: blindspot.tier,
            explanation,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Check the matching preconditions on a profile
pub fn validate_profile(profile: &StudentProfile) -> Result<(), MatchError> {
    profile
        .validate()
        .map_err(|errors| MatchError::InvalidProfile(errors.to_string()))?;

    if profile.gpa.is_some_and(|gpa| !gpa.is_finite()) {
        return Err(MatchError::InvalidProfile("gpa: must be a finite number".to_string()));
    }

    Ok(())
}

/// Score descending, then earliest deadline, then harder-to-find first,
/// then opportunities serving a stated goal. Impact and identifier make the
/// order total.
fn rank_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.score
        .overall
        .total_cmp(&a.score.overall)
        .then_with(|| a.opportunity.deadline.cmp(&b.opportunity.deadline))
        .then_with(|| b.blindspot_tier.cmp(&a.blindspot_tier))
        .then_with(|| b.explanation.goal_aligned.cmp(&a.explanation.goal_aligned))
        .then_with(|| impact_rank(b).cmp(&impact_rank(a)))
        .then_with(|| a.opportunity.id.cmp(&b.opportunity.id))
}

fn impact_rank(result: &MatchResult) -> u8 {
    result.opportunity.impact.map_or(0, |impact| impact.rank())
}
