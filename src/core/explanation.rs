use chrono::{DateTime, Duration, Utc};

use crate::core::blindspot::BlindspotAssessment;
use crate::core::criteria::{Criterion, Verdict, VerdictStatus};
use crate::core::scoring::contributing_factors;
use crate::models::{
    BlindspotTier, CriterionDetail, MatchExplanation, MatchResult, MatchScore, OpportunityGoal, OpportunityType,
    ScoringWeights, StudentProfile,
};

const STRONG_MATCH: f64 = 80.0;
const PARTIAL_MATCH: f64 = 50.0;

/// Renders verdicts and scores into a structured explanation
#[derive(Debug, Clone, Copy)]
pub struct ExplanationBuilder {
    pub weights: ScoringWeights,
    pub urgency_days: i64,
    pub max_next_steps: usize,
}

impl Default for ExplanationBuilder {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            urgency_days: 14,
            max_next_steps: 3,
        }
    }
}

pub fn headline(overall: f64) -> &'static str {
    if overall >= STRONG_MATCH {
        "Strong match"
    } else if overall >= PARTIAL_MATCH {
        "Partial match"
    } else {
        "Limited match"
    }
}

fn detail(verdict: &Verdict) -> CriterionDetail {
    CriterionDetail {
        criterion: verdict.criterion.name().to_string(),
        student_value: verdict.student_value.clone(),
        required_value: verdict.required_value.clone(),
        partial: verdict.status == VerdictStatus::Partial,
    }
}

fn suggestion(verdict: &Verdict) -> String {
    let required = &verdict.required_value;
    match verdict.criterion {
        Criterion::Gpa if verdict.above_range => {
            format!("Your GPA is above the accepted range ({}); look for merit-based programmes instead", required)
        }
        Criterion::Gpa => format!("Work towards a GPA {} or look for programmes with a lower cutoff", required),
        Criterion::AcademicLevel => {
            format!("This is open to {} students; keep it on your list for when you qualify", required)
        }
        Criterion::Major => format!("Check whether coursework in {} would satisfy the field requirement", required),
        Criterion::Skills if verdict.status == VerdictStatus::Partial => {
            format!("Close the gap on the remaining required skills ({})", required)
        }
        Criterion::Skills => format!("Build the required skills: {}", required),
        Criterion::FocusAreas => format!("Explore {} to strengthen your fit", required),
        Criterion::Location => format!("Check whether applicants outside {} are accepted", required),
        other => format!("Confirm the {} requirement ({}) with the provider", other.label(), required),
    }
}

fn deadline_step(deadline: DateTime<Utc>, now: DateTime<Utc>, urgency_days: i64) -> Option<String> {
    let remaining = deadline - now;
    // A window too large to represent covers every upcoming deadline
    let within_window = Duration::try_days(urgency_days).map_or(true, |window| remaining <= window);
    if remaining < Duration::zero() || !within_window {
        return None;
    }

    Some(match remaining.num_days() {
        0 => "Apply now: the deadline is today".to_string(),
        1 => "Apply now: the deadline is tomorrow".to_string(),
        days => format!("Apply soon: the deadline is in {} days", days),
    })
}

impl ExplanationBuilder {
    pub fn new(weights: ScoringWeights, urgency_days: i64, max_next_steps: usize) -> Self {
        Self { weights, urgency_days, max_next_steps }
    }

    /// Build the explanation for one scored opportunity
    pub fn explain(
        &self,
        verdicts: &[Verdict],
        score: &MatchScore,
        blindspot: &BlindspotAssessment,
        aligned_goal: Option<OpportunityGoal>,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> MatchExplanation {
        let matched: Vec<CriterionDetail> = verdicts
            .iter()
            .filter(|v| v.status == VerdictStatus::Matched)
            .map(detail)
            .collect();

        let failing: Vec<&Verdict> = verdicts
            .iter()
            .filter(|v| matches!(v.status, VerdictStatus::Unmatched | VerdictStatus::Partial))
            .collect();

        let not_evaluated: Vec<String> = verdicts
            .iter()
            .filter(|v| !v.status.is_evaluable())
            .map(|v| v.criterion.name().to_string())
            .collect();

        let factors = contributing_factors(verdicts, score, &self.weights);

        let mut summary = headline(score.overall).to_string();
        if blindspot.tier >= BlindspotTier::Medium {
            summary.push_str(", commonly overlooked by students with your background");
        }
        summary.push('.');
        if let Some(top) = factors.first() {
            summary.push_str(&format!(
                " Strongest factor: {} fit ({:.1} points).",
                top.dimension.as_str(),
                top.contribution
            ));
        }
        if let Some(goal) = aligned_goal {
            summary.push_str(&format!(" It fits your {} goal.", goal.label()));
        }

        let mut next_steps: Vec<String> = failing
            .iter()
            .take(self.max_next_steps)
            .map(|v| suggestion(v))
            .collect();
        next_steps.extend(deadline_step(deadline, now, self.urgency_days));

        MatchExplanation {
            summary,
            matched,
            unmatched: failing.into_iter().map(detail).collect(),
            not_evaluated,
            contributing_factors: factors,
            blindspot_tier: blindspot.tier,
            miss_reason: blindspot.miss_reason(),
            goal_aligned: aligned_goal.is_some(),
            next_steps,
        }
    }
}

/// Most frequent opportunity type, ties resolved in declaration order
fn dominant_type<'a>(matches: impl Iterator<Item = &'a MatchResult> + Clone) -> Option<OpportunityType> {
    OpportunityType::ALL
        .into_iter()
        .map(|kind| (kind, matches.clone().filter(|m| m.opportunity.opportunity_type == kind).count()))
        .filter(|(_, count)| *count > 0)
        .fold(None, |best: Option<(OpportunityType, usize)>, (kind, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((kind, count)),
        })
        .map(|(kind, _)| kind)
}

/// Run-level takeaway over the returned matches.
///
/// Names the kind of opportunity the student is most likely to be missing,
/// points at awareness rather than eligibility, and tailors the advice to
/// whether the student has missed opportunities before.
pub fn insight(profile: &StudentProfile, matches: &[MatchResult]) -> String {
    if matches.is_empty() {
        return "No open opportunities in the catalog match your profile yet. \
                Check back as new programmes are added."
            .to_string();
    }

    let overlooked = matches.iter().filter(|m| m.blindspot_tier >= BlindspotTier::Medium);
    let count = match overlooked.clone().count() {
        1 => "one opportunity".to_string(),
        n => format!("{} opportunities", n),
    };

    let mut text = match dominant_type(overlooked) {
        Some(kind) => format!(
            "Based on your profile, you are likely missing {} you qualify for, mostly {}. \
             Your eligibility is not the barrier; not knowing these exist is.",
            count,
            kind.plural()
        ),
        None => {
            let kind = dominant_type(matches.iter()).map_or("opportunities", |kind| kind.plural());
            format!(
                "Based on your profile, the {} that fit you are reasonably well known. \
                 Your main task is to apply, not to find them.",
                kind
            )
        }
    };

    if profile.prior_miss {
        text.push_str(
            " Work through the recommendations above and set up alerts for similar programmes \
             so the next one does not slip past.",
        );
    } else {
        text.push_str(" Now that you know about them, act on the ones you already qualify for.");
    }

    text
}
