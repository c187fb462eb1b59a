use crate::core::criteria::{Verdict, VerdictStatus};
use crate::models::{ContributingFactor, Dimension, MatchScore, ScoringWeights};

/// Subscore of a dimension with no evaluable criteria
const UNCONSTRAINED_SUBSCORE: f64 = 100.0;

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    matched: u32,
    partial: u32,
    unmatched: u32,
}

impl Tally {
    fn evaluable(&self) -> u32 {
        self.matched + self.partial + self.unmatched
    }

    /// None when nothing on this dimension could be evaluated
    fn subscore(&self) -> Option<f64> {
        let evaluable = self.evaluable();
        if evaluable == 0 {
            return None;
        }
        Some((self.matched as f64 + 0.5 * self.partial as f64) / evaluable as f64 * 100.0)
    }
}

fn tally(verdicts: &[Verdict], dimension: Dimension) -> Tally {
    verdicts
        .iter()
        .filter(|v| v.dimension() == dimension)
        .fold(Tally::default(), |mut tally, verdict| {
            match verdict.status {
                VerdictStatus::Matched => tally.matched += 1,
                VerdictStatus::Partial => tally.partial += 1,
                VerdictStatus::Unmatched => tally.unmatched += 1,
                VerdictStatus::NotApplicable => {}
            }
            tally
        })
}

/// Weight each dimension carries in the overall score.
///
/// Dimensions without an evaluable criterion get zero weight, so the
/// remaining weights are renormalized over what was actually evaluated.
/// When nothing at all was evaluable every dimension keeps its weight.
pub fn effective_weights(verdicts: &[Verdict], weights: &ScoringWeights) -> Vec<(Dimension, f64)> {
    let evaluated: Vec<Dimension> = Dimension::ALL
        .into_iter()
        .filter(|d| tally(verdicts, *d).evaluable() > 0)
        .collect();

    Dimension::ALL
        .into_iter()
        .map(|dimension| {
            let weight = if evaluated.is_empty() || evaluated.contains(&dimension) {
                weights.weight(dimension)
            } else {
                0.0
            };
            (dimension, weight)
        })
        .collect()
}

/// Aggregate per-criterion verdicts into subscores, an overall score and a
/// confidence value.
///
/// Blindspot tier is not an input: it never moves the score.
pub fn compose(verdicts: &[Verdict], weights: &ScoringWeights) -> MatchScore {
    let subscores: Vec<(Dimension, f64)> = Dimension::ALL
        .into_iter()
        .map(|d| (d, tally(verdicts, d).subscore().unwrap_or(UNCONSTRAINED_SUBSCORE)))
        .collect();
    let subscore = |dimension: Dimension| {
        subscores
            .iter()
            .find(|(d, _)| *d == dimension)
            .map_or(UNCONSTRAINED_SUBSCORE, |(_, s)| *s)
    };

    let effective = effective_weights(verdicts, weights);
    let total_weight: f64 = effective.iter().map(|(_, w)| w).sum();

    let overall = if total_weight > 0.0 {
        effective.iter().map(|(d, w)| subscore(*d) * w).sum::<f64>() / total_weight
    } else {
        // Every weight configured to zero: fall back to an unweighted mean
        subscores.iter().map(|(_, s)| s).sum::<f64>() / subscores.len() as f64
    };

    let evaluable = verdicts.iter().filter(|v| v.status.is_evaluable()).count();
    let confidence = if verdicts.is_empty() {
        0.0
    } else {
        evaluable as f64 / verdicts.len() as f64 * 100.0
    };

    MatchScore {
        overall: overall.clamp(0.0, 100.0),
        academic: subscore(Dimension::Academic),
        skill: subscore(Dimension::Skill),
        interest: subscore(Dimension::Interest),
        location: subscore(Dimension::Location),
        demographic: subscore(Dimension::Demographic),
        confidence: confidence.clamp(0.0, 100.0),
    }
}

/// Points each dimension adds to the overall score, largest first.
///
/// Ties keep dimension priority order (academic, skill, interest, location,
/// demographic).
pub fn contributing_factors(
    verdicts: &[Verdict],
    score: &MatchScore,
    weights: &ScoringWeights,
) -> Vec<ContributingFactor> {
    let mut effective = effective_weights(verdicts, weights);
    let mut total_weight: f64 = effective.iter().map(|(_, w)| w).sum();

    // Equal-weight fallback, matching `compose`
    if total_weight <= 0.0 {
        effective = Dimension::ALL.into_iter().map(|d| (d, 1.0)).collect();
        total_weight = effective.len() as f64;
    }

    let mut factors: Vec<ContributingFactor> = effective
        .into_iter()
        .map(|(dimension, weight)| ContributingFactor {
            dimension,
            contribution: score.subscore(dimension) * weight / total_weight,
        })
        .collect();

    factors.sort_by(|a, b| {
        b.contribution
            .total_cmp(&a.contribution)
            .then_with(|| a.dimension.cmp(&b.dimension))
    });

    factors
}
