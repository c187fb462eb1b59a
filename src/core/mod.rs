// Core algorithm exports
pub mod blindspot;
pub mod criteria;
pub mod explanation;
pub mod matcher;
pub mod scoring;

pub use blindspot::{assess, classify, BlindspotAssessment, BlindspotSignal};
pub use criteria::{evaluate, evaluate_criteria, Constraint, CriteriaError, Criterion, ProfileValue, Verdict, VerdictStatus};
pub use explanation::{insight, ExplanationBuilder};
pub use matcher::{validate_profile, MatchError, MatchOptions, MatchReport, Matcher};
pub use scoring::{compose, contributing_factors};
