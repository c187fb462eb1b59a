// Integration tests for Saarthi Match

use chrono::{Duration, TimeZone, Utc};
use saarthi_match::core::{MatchOptions, Matcher};
use saarthi_match::models::{
    AcademicLevel, BackgroundIndicator, BlindspotTier, EligibilityCriteria, ImpactLevel, Opportunity,
    OpportunityGoal, OpportunityType, StudentProfile, VisibilityLevel,
};
use saarthi_match::services::Catalog;

fn create_test_profile() -> StudentProfile {
    StudentProfile {
        student_id: Some("student_42".to_string()),
        academic_level: Some(AcademicLevel::Undergraduate),
        gpa: Some(8.5),
        major: "Engineering".to_string(),
        skills: vec!["python".to_string()],
        interests: vec!["robotics".to_string()],
        location: Default::default(),
        demographics: Default::default(),
        institution_type: None,
        background: vec![BackgroundIndicator::Rural],
        goals: vec![OpportunityGoal::Scholarships],
        prior_miss: true,
        context: None,
    }
}

fn create_opportunity(id: &str, visibility: VisibilityLevel, eligibility: EligibilityCriteria) -> Opportunity {
    Opportunity {
        id: id.to_string(),
        title: format!("Opportunity {}", id),
        description: String::new(),
        opportunity_type: OpportunityType::Scholarship,
        eligibility,
        deadline: Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap(),
        benefits: None,
        requirements: vec![],
        source: "catalog".to_string(),
        visibility,
        impact: None,
        expired: false,
    }
}

#[test]
fn test_integration_worked_example() {
    let matcher = Matcher::with_defaults();

    let a = create_opportunity(
        "a",
        VisibilityLevel::Low,
        EligibilityCriteria {
            min_gpa: Some(7.0),
            max_gpa: Some(10.0),
            required_skills: vec!["python".to_string()],
            ..Default::default()
        },
    );
    let b = create_opportunity(
        "b",
        VisibilityLevel::High,
        EligibilityCriteria {
            min_gpa: Some(9.0),
            max_gpa: Some(10.0),
            ..Default::default()
        },
    );

    let report = matcher
        .find_matches(&create_test_profile(), &[b, a], MatchOptions::default())
        .unwrap();

    assert_eq!(report.matches.len(), 2);

    let first = &report.matches[0];
    assert_eq!(first.opportunity.id, "a");
    assert_eq!(first.score.academic, 100.0);
    assert_eq!(first.score.skill, 100.0);
    assert_eq!(first.score.confidence, 100.0);
    assert_eq!(first.blindspot_tier, BlindspotTier::High);
    assert!(first.explanation.summary.starts_with("Strong match"));
    assert!(first.explanation.summary.contains("commonly overlooked"));
    assert!(first.explanation.miss_reason.is_some());

    let second = &report.matches[1];
    assert_eq!(second.opportunity.id, "b");
    assert_eq!(second.score.academic, 0.0);
    assert!(second.score.overall < first.score.overall);
    assert_eq!(second.blindspot_tier, BlindspotTier::Medium);
    assert_eq!(second.explanation.unmatched.len(), 1);
    assert_eq!(second.explanation.unmatched[0].criterion, "gpa");
    assert_eq!(second.explanation.unmatched[0].student_value, "8.5");
}

#[test]
fn test_visibility_never_changes_score() {
    let matcher = Matcher::with_defaults();
    let eligibility = EligibilityCriteria {
        min_gpa: Some(6.0),
        academic_levels: vec![AcademicLevel::Undergraduate, AcademicLevel::Graduate],
        required_skills: vec!["python".to_string(), "rust".to_string()],
        ..Default::default()
    };

    let hidden = create_opportunity("hidden", VisibilityLevel::Low, eligibility.clone());
    let visible = create_opportunity("visible", VisibilityLevel::High, eligibility);

    let report = matcher
        .find_matches(&create_test_profile(), &[visible, hidden], MatchOptions::default())
        .unwrap();

    assert_eq!(report.matches[0].score, report.matches[1].score);
    assert_ne!(report.matches[0].blindspot_tier, report.matches[1].blindspot_tier);
    // Equal score and deadline: the harder-to-find opportunity ranks first
    assert_eq!(report.matches[0].opportunity.id, "hidden");
}

#[test]
fn test_ranking_is_deterministic() {
    let matcher = Matcher::with_defaults();
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

    let opportunities: Vec<Opportunity> = (0..30)
        .map(|i| {
            let visibility = match i % 3 {
                0 => VisibilityLevel::Low,
                1 => VisibilityLevel::Medium,
                _ => VisibilityLevel::High,
            };
            let mut opportunity = create_opportunity(
                &format!("opp_{:02}", i),
                visibility,
                EligibilityCriteria {
                    min_gpa: Some((i % 10) as f64),
                    ..Default::default()
                },
            );
            opportunity.deadline = now + Duration::days(i % 4);
            opportunity.impact = Some(if i % 2 == 0 { ImpactLevel::High } else { ImpactLevel::Low });
            opportunity
        })
        .collect();

    let first = matcher
        .find_matches_at(&create_test_profile(), &opportunities, MatchOptions::default(), now)
        .unwrap();

    let mut reversed = opportunities.clone();
    reversed.reverse();
    let second = matcher
        .find_matches_at(&create_test_profile(), &reversed, MatchOptions::default(), now)
        .unwrap();

    let first_ids: Vec<&str> = first.matches.iter().map(|m| m.opportunity.id.as_str()).collect();
    let second_ids: Vec<&str> = second.matches.iter().map(|m| m.opportunity.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);

    for pair in first.matches.windows(2) {
        assert!(
            pair[0].score.overall >= pair[1].score.overall,
            "Matches not sorted by score"
        );
    }
}

#[test]
fn test_score_and_confidence_ranges() {
    let matcher = Matcher::with_defaults();
    let mut profile = create_test_profile();
    profile.demographics.age = Some(20);
    profile.location.country = "India".to_string();

    let mut mixed = EligibilityCriteria {
        min_gpa: Some(9.0),
        majors: vec!["Physics".to_string()],
        required_skills: vec!["python".to_string(), "matlab".to_string()],
        focus_areas: vec!["robotics".to_string()],
        locations: vec!["Kenya".to_string()],
        min_age: Some(18),
        max_age: Some(24),
        ..Default::default()
    };
    mixed.demographics.genders = vec!["female".to_string()];

    let opportunities = vec![
        create_opportunity("empty", VisibilityLevel::Medium, EligibilityCriteria::default()),
        create_opportunity("mixed", VisibilityLevel::Medium, mixed),
    ];

    let report = matcher
        .find_matches(&profile, &opportunities, MatchOptions::default())
        .unwrap();

    for m in &report.matches {
        assert!(m.score.overall >= 0.0 && m.score.overall <= 100.0);
        assert!(m.score.confidence >= 0.0 && m.score.confidence <= 100.0);
    }

    let empty = report.matches.iter().find(|m| m.opportunity.id == "empty").unwrap();
    assert_eq!(empty.score.confidence, 0.0);
    assert_eq!(empty.score.location, 100.0);

    let mixed = report.matches.iter().find(|m| m.opportunity.id == "mixed").unwrap();
    // Gender is unset on the profile: 6 of 7 criteria evaluable
    assert!((mixed.score.confidence - 600.0 / 7.0).abs() < 1e-9);
    assert_eq!(mixed.score.skill, 50.0);
    assert_eq!(mixed.score.location, 0.0);
    assert_eq!(mixed.score.interest, 100.0);
    assert_eq!(mixed.explanation.not_evaluated, vec!["gender".to_string()]);
}

#[test]
fn test_malformed_opportunity_does_not_abort_run() {
    let matcher = Matcher::with_defaults();
    let opportunities = vec![
        create_opportunity(
            "inverted",
            VisibilityLevel::Low,
            EligibilityCriteria { min_gpa: Some(10.0), max_gpa: Some(5.0), ..Default::default() },
        ),
        create_opportunity("ok_1", VisibilityLevel::Low, EligibilityCriteria::default()),
        create_opportunity(
            "ok_2",
            VisibilityLevel::High,
            EligibilityCriteria { min_gpa: Some(5.0), ..Default::default() },
        ),
    ];

    let report = matcher
        .find_matches(&create_test_profile(), &opportunities, MatchOptions::default())
        .unwrap();

    assert_eq!(report.skipped, vec!["inverted".to_string()]);
    assert_eq!(report.matches.len(), 2);
    assert!(report.matches.iter().all(|m| m.opportunity.id != "inverted"));
}

#[test]
fn test_catalog_expiry_flows_into_matching() {
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let mut past = create_opportunity("past", VisibilityLevel::Low, EligibilityCriteria::default());
    past.deadline = now - Duration::days(1);
    let upcoming = create_opportunity("upcoming", VisibilityLevel::Low, EligibilityCriteria::default());

    let catalog = Catalog::from_opportunities(vec![past, upcoming], now);
    let report = Matcher::with_defaults()
        .find_matches_at(&create_test_profile(), &catalog.snapshot(), MatchOptions::default(), now)
        .unwrap();

    assert_eq!(report.expired, 1);
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].opportunity.id, "upcoming");
}

#[test]
fn test_deadline_urgency_next_step() {
    let now = Utc.with_ymd_and_hms(2030, 5, 25, 0, 0, 0).unwrap();
    let opportunity = create_opportunity(
        "soon",
        VisibilityLevel::Medium,
        EligibilityCriteria { required_skills: vec!["sql".to_string()], ..Default::default() },
    );

    let report = Matcher::with_defaults()
        .find_matches_at(&create_test_profile(), &[opportunity], MatchOptions::default(), now)
        .unwrap();

    let steps = &report.matches[0].explanation.next_steps;
    assert_eq!(steps.len(), 2);
    assert!(steps[0].contains("sql"));
    assert!(steps[1].contains("deadline is in 7 days"));
}
