use serde::Serialize;

use crate::models::{BlindspotRules, BlindspotTier, Opportunity, StudentProfile, VisibilityLevel};

/// A profile or catalog signal that makes an opportunity easy to miss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlindspotSignal {
    Visibility(VisibilityLevel),
    Background,
    PriorMiss,
    GovernmentInstitution,
}

impl BlindspotSignal {
    fn reason(&self) -> &'static str {
        match self {
            BlindspotSignal::Visibility(VisibilityLevel::Low) => {
                "it has very low visibility and is rarely promoted in colleges"
            }
            BlindspotSignal::Visibility(VisibilityLevel::Medium) => {
                "it is not widely advertised beyond official portals"
            }
            BlindspotSignal::Visibility(VisibilityLevel::High) => "it is only promoted through a few channels",
            BlindspotSignal::Background => "students from your background are less likely to hear about it",
            BlindspotSignal::PriorMiss => "you have missed similar opportunities before",
            BlindspotSignal::GovernmentInstitution => {
                "government colleges rarely run structured outreach for it"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalPoints {
    pub signal: BlindspotSignal,
    pub points: u32,
}

/// Tier together with the signals that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlindspotAssessment {
    pub tier: BlindspotTier,
    pub points: u32,
    pub signals: Vec<SignalPoints>,
}

impl BlindspotAssessment {
    /// Sentence explaining why students usually miss the opportunity
    pub fn miss_reason(&self) -> Option<String> {
        if self.signals.is_empty() {
            return None;
        }

        let reasons: Vec<&str> = self.signals.iter().map(|s| s.signal.reason()).collect();
        Some(format!("Students usually miss this because {}.", reasons.join(" and ")))
    }
}

/// Map accumulated points to a tier; thresholds are inclusive lower bounds
pub fn tier_for_points(points: u32, rules: &BlindspotRules) -> BlindspotTier {
    if points >= rules.high_threshold {
        BlindspotTier::High
    } else if points >= rules.medium_threshold {
        BlindspotTier::Medium
    } else if points >= rules.low_threshold {
        BlindspotTier::Low
    } else {
        BlindspotTier::None
    }
}

/// Score every blindspot signal for a (profile, opportunity) pair
pub fn assess(profile: &StudentProfile, opportunity: &Opportunity, rules: &BlindspotRules) -> BlindspotAssessment {
    let candidates = [
        (
            BlindspotSignal::Visibility(opportunity.visibility),
            rules.visibility_points(opportunity.visibility),
        ),
        (
            BlindspotSignal::Background,
            if profile.background.is_empty() { 0 } else { rules.background },
        ),
        (
            BlindspotSignal::PriorMiss,
            if profile.prior_miss { rules.prior_miss } else { 0 },
        ),
        (
            BlindspotSignal::GovernmentInstitution,
            if profile.attends_government_institution() { rules.government_institution } else { 0 },
        ),
    ];

    let signals: Vec<SignalPoints> = candidates
        .into_iter()
        .filter(|(_, points)| *points > 0)
        .map(|(signal, points)| SignalPoints { signal, points })
        .collect();

    let points = signals.iter().map(|s| s.points).sum();

    BlindspotAssessment {
        tier: tier_for_points(points, rules),
        points,
        signals,
    }
}

/// Probability tier that the student would miss this opportunity unassisted
pub fn classify(profile: &StudentProfile, opportunity: &Opportunity, rules: &BlindspotRules) -> BlindspotTier {
    assess(profile, opportunity, rules).tier
}
