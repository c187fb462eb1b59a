use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Academic level of a student, also used as an eligibility constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcademicLevel {
    HighSchool,
    Undergraduate,
    Graduate,
    Doctoral,
}

impl AcademicLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcademicLevel::HighSchool => "high_school",
            AcademicLevel::Undergraduate => "undergraduate",
            AcademicLevel::Graduate => "graduate",
            AcademicLevel::Doctoral => "doctoral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionType {
    Government,
    Private,
    Autonomous,
    Open,
}

impl InstitutionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstitutionType::Government => "government",
            InstitutionType::Private => "private",
            InstitutionType::Autonomous => "autonomous",
            InstitutionType::Open => "open",
        }
    }
}

/// Background tags supplied by profile intake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundIndicator {
    Rural,
    FirstGen,
    FinancialNeed,
    GovernmentCollege,
    Disabled,
    Minority,
}

impl BackgroundIndicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundIndicator::Rural => "rural",
            BackgroundIndicator::FirstGen => "first_gen",
            BackgroundIndicator::FinancialNeed => "financial_need",
            BackgroundIndicator::GovernmentCollege => "government_college",
            BackgroundIndicator::Disabled => "disabled",
            BackgroundIndicator::Minority => "minority",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityGoal {
    Scholarships,
    Internships,
    Research,
    Skills,
    GovtExams,
}

impl OpportunityGoal {
    pub fn label(&self) -> &'static str {
        match self {
            OpportunityGoal::Scholarships => "scholarships",
            OpportunityGoal::Internships => "internships",
            OpportunityGoal::Research => "research",
            OpportunityGoal::Skills => "skill building",
            OpportunityGoal::GovtExams => "government exams",
        }
    }
}

/// Student location; state and city are optional refinements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl Location {
    /// Every non-empty location component, coarsest first
    pub fn parts(&self) -> Vec<String> {
        std::iter::once(self.country.as_str())
            .chain(self.state.as_deref())
            .chain(self.city.as_deref())
            .filter(|part| !part.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    #[validate(range(min = 1, max = 120))]
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub first_generation: Option<bool>,
}

/// Student profile as handed over by the intake layer
///
/// Academic level and at least one goal are preconditions for matching;
/// everything else may be absent and is then simply not evaluated.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    #[serde(default)]
    pub student_id: Option<String>,
    #[validate(required(message = "academic level is required"))]
    #[serde(default)]
    pub academic_level: Option<AcademicLevel>,
    #[validate(range(min = 0.0, max = 10.0))]
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub location: Location,
    #[validate(nested)]
    #[serde(default)]
    pub demographics: Demographics,
    #[serde(default)]
    pub institution_type: Option<InstitutionType>,
    #[serde(default)]
    pub background: Vec<BackgroundIndicator>,
    #[validate(length(min = 1, message = "at least one goal is required"))]
    #[serde(default)]
    pub goals: Vec<OpportunityGoal>,
    #[serde(default)]
    pub prior_miss: bool,
    #[serde(default)]
    pub context: Option<String>,
}

impl StudentProfile {
    /// First-generation status from demographics, falling back to the background tag
    pub fn first_generation(&self) -> Option<bool> {
        self.demographics.first_generation.or_else(|| {
            self.background
                .contains(&BackgroundIndicator::FirstGen)
                .then_some(true)
        })
    }

    pub fn attends_government_institution(&self) -> bool {
        self.institution_type == Some(InstitutionType::Government)
            || self.background.contains(&BackgroundIndicator::GovernmentCollege)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityType {
    Scholarship,
    Internship,
    ResearchProgram,
    GovernmentInitiative,
}

impl OpportunityType {
    pub const ALL: [OpportunityType; 4] = [
        OpportunityType::Scholarship,
        OpportunityType::Internship,
        OpportunityType::ResearchProgram,
        OpportunityType::GovernmentInitiative,
    ];

    /// Student goal this kind of opportunity serves
    pub fn goal(&self) -> OpportunityGoal {
        match self {
            OpportunityType::Scholarship => OpportunityGoal::Scholarships,
            OpportunityType::Internship => OpportunityGoal::Internships,
            OpportunityType::ResearchProgram => OpportunityGoal::Research,
            OpportunityType::GovernmentInitiative => OpportunityGoal::Skills,
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            OpportunityType::Scholarship => "scholarships",
            OpportunityType::Internship => "internships",
            OpportunityType::ResearchProgram => "research programmes",
            OpportunityType::GovernmentInitiative => "government skill and innovation schemes",
        }
    }
}

/// How well an opportunity is promoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

impl ImpactLevel {
    pub fn rank(&self) -> u8 {
        match self {
            ImpactLevel::High => 3,
            ImpactLevel::Medium => 2,
            ImpactLevel::Low => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Benefits {
    Monetary { amount: f64, currency: String },
    Description(String),
}

/// Demographic sub-constraints; each one is compared independently
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicConstraints {
    #[serde(default)]
    pub genders: Vec<String>,
    #[serde(default)]
    pub ethnicities: Vec<String>,
    #[serde(default)]
    pub first_generation: Option<bool>,
    #[serde(default)]
    pub background_requirements: Vec<BackgroundIndicator>,
}

/// Eligibility criteria embedded in an opportunity.
///
/// An empty list or a `None` bound means the dimension is unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCriteria {
    #[serde(default)]
    pub min_gpa: Option<f64>,
    #[serde(default)]
    pub max_gpa: Option<f64>,
    #[serde(default)]
    pub academic_levels: Vec<AcademicLevel>,
    #[serde(default)]
    pub majors: Vec<String>,
    #[serde(default)]
    pub institution_types: Vec<InstitutionType>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub min_age: Option<u8>,
    #[serde(default)]
    pub max_age: Option<u8>,
    #[serde(default)]
    pub demographics: DemographicConstraints,
}

/// Catalog opportunity, read-only to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub opportunity_type: OpportunityType,
    #[serde(default)]
    pub eligibility: EligibilityCriteria,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub benefits: Option<Benefits>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub source: String,
    pub visibility: VisibilityLevel,
    #[serde(default)]
    pub impact: Option<ImpactLevel>,
    #[serde(default)]
    pub expired: bool,
}

impl Opportunity {
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.deadline < now
    }
}

/// Scoring dimensions, declared in tie-break priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Academic,
    Skill,
    Interest,
    Location,
    Demographic,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Academic,
        Dimension::Skill,
        Dimension::Interest,
        Dimension::Location,
        Dimension::Demographic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Academic => "academic",
            Dimension::Skill => "skill",
            Dimension::Interest => "interest",
            Dimension::Location => "location",
            Dimension::Demographic => "demographic",
        }
    }
}

/// Likelihood that a student would miss an opportunity unassisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlindspotTier {
    None,
    Low,
    Medium,
    High,
}

/// Scores are all on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    pub overall: f64,
    pub academic: f64,
    pub skill: f64,
    pub interest: f64,
    pub location: f64,
    pub demographic: f64,
    pub confidence: f64,
}

impl MatchScore {
    pub fn subscore(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Academic => self.academic,
            Dimension::Skill => self.skill,
            Dimension::Interest => self.interest,
            Dimension::Location => self.location,
            Dimension::Demographic => self.demographic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionDetail {
    pub criterion: String,
    pub student_value: String,
    pub required_value: String,
    #[serde(default)]
    pub partial: bool,
}

/// Points a dimension adds to the overall score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributingFactor {
    pub dimension: Dimension,
    pub contribution: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchExplanation {
    pub summary: String,
    pub matched: Vec<CriterionDetail>,
    pub unmatched: Vec<CriterionDetail>,
    pub not_evaluated: Vec<String>,
    pub contributing_factors: Vec<ContributingFactor>,
    pub blindspot_tier: BlindspotTier,
    pub miss_reason: Option<String>,
    /// The opportunity type serves one of the student's stated goals
    #[serde(default)]
    pub goal_aligned: bool,
    pub next_steps: Vec<String>,
}

/// Ranked, explained result for a single opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub opportunity: Opportunity,
    pub score: MatchScore,
    pub blindspot_tier: BlindspotTier,
    pub explanation: MatchExplanation,
}

/// Scoring weights per dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub academic: f64,
    pub skill: f64,
    pub interest: f64,
    pub location: f64,
    pub demographic: f64,
}

impl ScoringWeights {
    pub fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Academic => self.academic,
            Dimension::Skill => self.skill,
            Dimension::Interest => self.interest,
            Dimension::Location => self.location,
            Dimension::Demographic => self.demographic,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            academic: 0.30,
            skill: 0.25,
            interest: 0.15,
            location: 0.15,
            demographic: 0.15,
        }
    }
}

/// Point table and tier thresholds for blindspot classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlindspotRules {
    pub low_visibility: u32,
    pub medium_visibility: u32,
    pub high_visibility: u32,
    pub background: u32,
    pub prior_miss: u32,
    pub government_institution: u32,
    pub high_threshold: u32,
    pub medium_threshold: u32,
    pub low_threshold: u32,
}

impl BlindspotRules {
    pub fn visibility_points(&self, visibility: VisibilityLevel) -> u32 {
        match visibility {
            VisibilityLevel::Low => self.low_visibility,
            VisibilityLevel::Medium => self.medium_visibility,
            VisibilityLevel::High => self.high_visibility,
        }
    }
}

impl Default for BlindspotRules {
    fn default() -> Self {
        Self {
            low_visibility: 3,
            medium_visibility: 1,
            high_visibility: 0,
            background: 2,
            prior_miss: 2,
            government_institution: 1,
            high_threshold: 5,
            medium_threshold: 3,
            low_threshold: 1,
        }
    }
}
