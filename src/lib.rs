//! Saarthi Match - opportunity matching and blindspot explainability engine
//!
//! Given a student profile and a catalog of opportunities (scholarships,
//! internships, research programs, government schemes) this library scores
//! eligibility per opportunity, classifies how likely the student is to miss
//! it, explains both, and returns a deterministic ranking.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchError, MatchOptions, MatchReport, Matcher};
pub use crate::models::{
    BlindspotTier, EligibilityCriteria, MatchExplanation, MatchResult, MatchScore, Opportunity, StudentProfile,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let report = Matcher::default()
            .find_matches(
                &StudentProfile {
                    student_id: None,
                    academic_level: Some(models::AcademicLevel::Graduate),
                    gpa: None,
                    major: String::new(),
                    skills: vec![],
                    interests: vec![],
                    location: Default::default(),
                    demographics: Default::default(),
                    institution_type: None,
                    background: vec![],
                    goals: vec![models::OpportunityGoal::Research],
                    prior_miss: false,
                    context: None,
                },
                &[],
                MatchOptions::default(),
            )
            .unwrap();

        // An empty catalog is not an error
        assert!(report.matches.is_empty());
        assert_eq!(report.total_candidates, 0);
    }
}
