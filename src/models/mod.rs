// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AcademicLevel, BackgroundIndicator, Benefits, BlindspotRules, BlindspotTier, ContributingFactor,
    CriterionDetail, DemographicConstraints, Demographics, Dimension, EligibilityCriteria, ImpactLevel,
    InstitutionType, Location, MatchExplanation, MatchResult, MatchScore, Opportunity, OpportunityGoal,
    OpportunityType, ScoringWeights, StudentProfile, VisibilityLevel,
};
pub use requests::FindMatchesRequest;
pub use responses::{ErrorResponse, FindMatchesResponse, HealthResponse};
