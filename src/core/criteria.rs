use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Dimension, EligibilityCriteria, StudentProfile};

/// Internally inconsistent eligibility criteria on an opportunity
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    #[error("{field}: minimum {min} exceeds maximum {max}")]
    InvertedRange { field: Criterion, min: f64, max: f64 },

    #[error("{field}: bound is not a finite number")]
    NonFiniteBound { field: Criterion },
}

/// A single eligibility criterion field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Gpa,
    AcademicLevel,
    Major,
    InstitutionType,
    Skills,
    FocusAreas,
    Location,
    Age,
    Gender,
    Ethnicity,
    FirstGeneration,
    Background,
}

impl Criterion {
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Gpa => "gpa",
            Criterion::AcademicLevel => "academic_level",
            Criterion::Major => "major",
            Criterion::InstitutionType => "institution_type",
            Criterion::Skills => "skills",
            Criterion::FocusAreas => "focus_areas",
            Criterion::Location => "location",
            Criterion::Age => "age",
            Criterion::Gender => "gender",
            Criterion::Ethnicity => "ethnicity",
            Criterion::FirstGeneration => "first_generation",
            Criterion::Background => "background",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Criterion::Gpa => "GPA",
            Criterion::AcademicLevel => "academic level",
            Criterion::Major => "field of study",
            Criterion::InstitutionType => "institution type",
            Criterion::Skills => "skills",
            Criterion::FocusAreas => "focus areas",
            Criterion::Location => "location",
            Criterion::Age => "age",
            Criterion::Gender => "gender",
            Criterion::Ethnicity => "ethnicity",
            Criterion::FirstGeneration => "first-generation status",
            Criterion::Background => "background",
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Criterion::Gpa | Criterion::AcademicLevel | Criterion::Major | Criterion::InstitutionType => {
                Dimension::Academic
            }
            Criterion::Skills => Dimension::Skill,
            Criterion::FocusAreas => Dimension::Interest,
            Criterion::Location => Dimension::Location,
            Criterion::Age
            | Criterion::Gender
            | Criterion::Ethnicity
            | Criterion::FirstGeneration
            | Criterion::Background => Dimension::Demographic,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of comparing one profile value with one constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Matched,
    Partial,
    Unmatched,
    /// The student's value is absent, so the criterion could not be evaluated
    NotApplicable,
}

impl VerdictStatus {
    pub fn is_evaluable(&self) -> bool {
        !matches!(self, VerdictStatus::NotApplicable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub criterion: Criterion,
    pub status: VerdictStatus,
    pub student_value: String,
    pub required_value: String,
    /// Numeric value failed by exceeding the upper bound rather than falling short
    pub above_range: bool,
}

impl Verdict {
    pub fn dimension(&self) -> Dimension {
        self.criterion.dimension()
    }
}

/// The profile side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileValue {
    Number(Option<f64>),
    Set(Vec<String>),
    Attribute(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipRule {
    /// Any overlap with the accepted values is a full match
    AnyOf,
    /// Fraction of accepted values the student covers, bucketed into full/partial/none
    Coverage,
}

/// The opportunity side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    NumericRange { min: Option<f64>, max: Option<f64> },
    SetMembership { accepted: Vec<String>, rule: MembershipRule },
    DemographicMatch { accepted: Vec<String> },
}

impl Constraint {
    fn describe(&self) -> String {
        match self {
            Constraint::NumericRange { min: Some(min), max: Some(max) } => {
                format!("between {} and {}", min, max)
            }
            Constraint::NumericRange { min: Some(min), max: None } => format!("at least {}", min),
            Constraint::NumericRange { min: None, max: Some(max) } => format!("at most {}", max),
            Constraint::NumericRange { min: None, max: None } => "any".to_string(),
            Constraint::SetMembership { accepted, .. } | Constraint::DemographicMatch { accepted } => {
                accepted.join(", ")
            }
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn describe_value(value: &ProfileValue) -> String {
    match value {
        ProfileValue::Number(Some(number)) => number.to_string(),
        ProfileValue::Set(values) if !values.is_empty() => values.join(", "),
        ProfileValue::Attribute(Some(attribute)) => attribute.clone(),
        _ => "not provided".to_string(),
    }
}

/// Compare one profile value with one constraint.
///
/// Pure function of its inputs. An absent or empty profile value is never
/// treated as a match: it yields `NotApplicable`.
pub fn evaluate(criterion: Criterion, value: &ProfileValue, constraint: &Constraint) -> Verdict {
    let above_range = match (constraint, value) {
        (Constraint::NumericRange { max: Some(max), .. }, ProfileValue::Number(Some(number))) => *number > *max,
        _ => false,
    };

    let status = match (constraint, value) {
        (Constraint::NumericRange { min, max }, ProfileValue::Number(Some(number))) => {
            let above_min = min.map_or(true, |min| *number >= min);
            let below_max = max.map_or(true, |max| *number <= max);
            if above_min && below_max {
                VerdictStatus::Matched
            } else {
                VerdictStatus::Unmatched
            }
        }
        (Constraint::SetMembership { accepted, rule }, ProfileValue::Set(values))
            if !values.is_empty() && !accepted.is_empty() =>
        {
            let student: Vec<String> = values.iter().map(|v| normalize(v)).collect();
            let covered = accepted
                .iter()
                .filter(|required| student.contains(&normalize(required)))
                .count();

            match rule {
                MembershipRule::AnyOf if covered > 0 => VerdictStatus::Matched,
                MembershipRule::AnyOf => VerdictStatus::Unmatched,
                MembershipRule::Coverage if covered == accepted.len() => VerdictStatus::Matched,
                MembershipRule::Coverage if covered > 0 => VerdictStatus::Partial,
                MembershipRule::Coverage => VerdictStatus::Unmatched,
            }
        }
        (Constraint::DemographicMatch { accepted }, ProfileValue::Attribute(Some(attribute)))
            if !accepted.is_empty() =>
        {
            let attribute = normalize(attribute);
            if accepted.iter().any(|a| normalize(a) == attribute) {
                VerdictStatus::Matched
            } else {
                VerdictStatus::Unmatched
            }
        }
        _ => VerdictStatus::NotApplicable,
    };

    Verdict {
        criterion,
        status,
        student_value: describe_value(value),
        required_value: constraint.describe(),
        above_range,
    }
}

/// Reject criteria that contradict themselves, e.g. a minimum above its maximum
pub fn validate_criteria(criteria: &EligibilityCriteria) -> Result<(), CriteriaError> {
    let ranges = [
        (Criterion::Gpa, criteria.min_gpa, criteria.max_gpa),
        (
            Criterion::Age,
            criteria.min_age.map(f64::from),
            criteria.max_age.map(f64::from),
        ),
    ];

    for (field, min, max) in ranges {
        if min.iter().chain(max.iter()).any(|bound| !bound.is_finite()) {
            return Err(CriteriaError::NonFiniteBound { field });
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(CriteriaError::InvertedRange { field, min, max });
            }
        }
    }

    Ok(())
}

fn to_strings<T>(values: &[T], as_str: impl Fn(&T) -> &'static str) -> Vec<String> {
    values.iter().map(|v| as_str(v).to_string()).collect()
}

/// Evaluate every criterion field the opportunity defines against the profile.
///
/// Unset fields produce no verdict at all; they are unconstrained dimensions,
/// not failing ones.
pub fn evaluate_criteria(
    profile: &StudentProfile,
    criteria: &EligibilityCriteria,
) -> Result<Vec<Verdict>, CriteriaError> {
    validate_criteria(criteria)?;

    let mut checks: Vec<(Criterion, ProfileValue, Constraint)> = Vec::new();

    if criteria.min_gpa.is_some() || criteria.max_gpa.is_some() {
        checks.push((
            Criterion::Gpa,
            ProfileValue::Number(profile.gpa),
            Constraint::NumericRange { min: criteria.min_gpa, max: criteria.max_gpa },
        ));
    }

    if !criteria.academic_levels.is_empty() {
        checks.push((
            Criterion::AcademicLevel,
            ProfileValue::Set(profile.academic_level.iter().map(|l| l.as_str().to_string()).collect()),
            Constraint::SetMembership {
                accepted: to_strings(&criteria.academic_levels, |l| l.as_str()),
                rule: MembershipRule::AnyOf,
            },
        ));
    }

    if !criteria.majors.is_empty() {
        let major = profile.major.trim();
        checks.push((
            Criterion::Major,
            ProfileValue::Set(if major.is_empty() { vec![] } else { vec![major.to_string()] }),
            Constraint::SetMembership { accepted: criteria.majors.clone(), rule: MembershipRule::AnyOf },
        ));
    }

    if !criteria.institution_types.is_empty() {
        checks.push((
            Criterion::InstitutionType,
            ProfileValue::Set(profile.institution_type.iter().map(|t| t.as_str().to_string()).collect()),
            Constraint::SetMembership {
                accepted: to_strings(&criteria.institution_types, |t| t.as_str()),
                rule: MembershipRule::AnyOf,
            },
        ));
    }

    if !criteria.required_skills.is_empty() {
        checks.push((
            Criterion::Skills,
            ProfileValue::Set(profile.skills.clone()),
            Constraint::SetMembership {
                accepted: criteria.required_skills.clone(),
                rule: MembershipRule::Coverage,
            },
        ));
    }

    if !criteria.focus_areas.is_empty() {
        checks.push((
            Criterion::FocusAreas,
            ProfileValue::Set(profile.interests.clone()),
            Constraint::SetMembership { accepted: criteria.focus_areas.clone(), rule: MembershipRule::AnyOf },
        ));
    }

    if !criteria.locations.is_empty() {
        checks.push((
            Criterion::Location,
            ProfileValue::Set(profile.location.parts()),
            Constraint::SetMembership { accepted: criteria.locations.clone(), rule: MembershipRule::AnyOf },
        ));
    }

    if criteria.min_age.is_some() || criteria.max_age.is_some() {
        checks.push((
            Criterion::Age,
            ProfileValue::Number(profile.demographics.age.map(f64::from)),
            Constraint::NumericRange {
                min: criteria.min_age.map(f64::from),
                max: criteria.max_age.map(f64::from),
            },
        ));
    }

    let demographics = &criteria.demographics;

    if !demographics.genders.is_empty() {
        checks.push((
            Criterion::Gender,
            ProfileValue::Attribute(profile.demographics.gender.clone()),
            Constraint::DemographicMatch { accepted: demographics.genders.clone() },
        ));
    }

    if !demographics.ethnicities.is_empty() {
        checks.push((
            Criterion::Ethnicity,
            ProfileValue::Attribute(profile.demographics.ethnicity.clone()),
            Constraint::DemographicMatch { accepted: demographics.ethnicities.clone() },
        ));
    }

    if let Some(required) = demographics.first_generation {
        checks.push((
            Criterion::FirstGeneration,
            ProfileValue::Attribute(profile.first_generation().map(|flag| flag.to_string())),
            Constraint::DemographicMatch { accepted: vec![required.to_string()] },
        ));
    }

    if !demographics.background_requirements.is_empty() {
        checks.push((
            Criterion::Background,
            ProfileValue::Set(to_strings(&profile.background, |b| b.as_str())),
            Constraint::SetMembership {
                accepted: to_strings(&demographics.background_requirements, |b| b.as_str()),
                rule: MembershipRule::AnyOf,
            },
        ));
    }

    Ok(checks
        .into_iter()
        .map(|(criterion, value, constraint)| evaluate(criterion, &value, &constraint))
        .collect())
}
