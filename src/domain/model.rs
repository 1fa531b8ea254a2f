use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Top of the radial display scale; normalized scores are stretched onto `0..=4`.
pub const DISPLAY_SCALE_MAX: f64 = 4.0;

/// Normalized score under which an area misses the minimum standard (1.0 on the display scale).
pub const MINIMUM_STANDARD: f64 = 0.25;

/// Question identifier of the form `Q<n>`, `n >= 1`, no zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuestionId(u32);

impl QuestionId {
    pub fn new(number: u32) -> Option<Self> {
        (number > 0).then_some(Self(number))
    }

    pub fn number(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidQuestionId(pub String);

impl fmt::Display for InvalidQuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a question id: {}", self.0)
    }
}

impl std::error::Error for InvalidQuestionId {}

impl FromStr for QuestionId {
    type Err = InvalidQuestionId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidQuestionId(s.to_string());
        let digits = s.strip_prefix('Q').ok_or_else(invalid)?;
        if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        digits
            .parse::<u32>()
            .ok()
            .and_then(QuestionId::new)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for QuestionId {
    type Error = InvalidQuestionId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QuestionId> for String {
    fn from(id: QuestionId) -> Self {
        id.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
    Unknown,
}

impl Answer {
    pub fn is_yes(&self) -> bool {
        matches!(self, Answer::Yes)
    }
}

impl FromStr for Answer {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yes" => Ok(Answer::Yes),
            "no" => Ok(Answer::No),
            "unknown" => Ok(Answer::Unknown),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
            Answer::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// One validated `Question,Answer,Weight` entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub answer: Answer,
    pub weight: f64,
}

impl AnswerRecord {
    /// Unknown counts as No.
    pub fn score(&self) -> f64 {
        if self.answer.is_yes() {
            self.weight
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaturityBand {
    Nascent,
    Emerging,
    Established,
    Mature,
}

impl MaturityBand {
    pub const ALL: [MaturityBand; 4] = [
        MaturityBand::Nascent,
        MaturityBand::Emerging,
        MaturityBand::Established,
        MaturityBand::Mature,
    ];

    pub fn from_display_value(value: f64) -> Self {
        if value < 1.0 {
            MaturityBand::Nascent
        } else if value < 2.0 {
            MaturityBand::Emerging
        } else if value < 3.0 {
            MaturityBand::Established
        } else {
            MaturityBand::Mature
        }
    }

    pub fn from_score(score: f64) -> Self {
        Self::from_display_value(score * DISPLAY_SCALE_MAX)
    }

    /// Radius of this band's reference ring on the display scale.
    pub fn ring_value(&self) -> f64 {
        match self {
            MaturityBand::Nascent => 1.0,
            MaturityBand::Emerging => 2.0,
            MaturityBand::Established => 3.0,
            MaturityBand::Mature => 4.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaturityBand::Nascent => "Nascent",
            MaturityBand::Emerging => "Emerging",
            MaturityBand::Established => "Established",
            MaturityBand::Mature => "Mature",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThematicScore {
    pub pillar: String,
    pub thematic: String,
    /// Normalized to `0..=1`.
    pub score: f64,
}

impl ThematicScore {
    pub fn display_value(&self) -> f64 {
        self.score * DISPLAY_SCALE_MAX
    }

    pub fn maturity(&self) -> MaturityBand {
        MaturityBand::from_score(self.score)
    }

    pub fn below_minimum(&self) -> bool {
        self.score < MINIMUM_STANDARD
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    pub pillar: String,
    /// Mean of the pillar's thematic scores, `0..=1`.
    pub mean_score: f64,
    pub percent: f64,
}

impl PillarScore {
    pub fn maturity(&self) -> MaturityBand {
        MaturityBand::from_score(self.mean_score)
    }
}

/// Angular placement of one bar on the petal chart. Angles are radians,
/// measured clockwise from twelve o'clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub thematic_index: usize,
    pub angle_start: f64,
    pub width: f64,
    pub group_id: usize,
}

impl BarGeometry {
    pub fn angle_end(&self) -> f64 {
        self.angle_start + self.width
    }

    pub fn angle_center(&self) -> f64 {
        self.angle_start + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFormat {
    /// `Q1,Yes,1;Q2,No,0.5;...`
    Delimited,
    /// CSV with a `Question,Answer,Weight` header row.
    Csv,
}

#[derive(Debug, Clone)]
pub struct RawSubmission {
    pub text: String,
    pub format: InputFormat,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThematicSummary {
    pub pillar: String,
    pub thematic: String,
    pub display_name: String,
    pub indicator: String,
    pub summary: String,
    pub below_minimum: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MinimumStandardAnalysis {
    pub below_minimum: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ChartArtifacts {
    pub petal_svg: String,
    pub petal_png: Vec<u8>,
    pub progress_svg: String,
    pub progress_png: Vec<u8>,
    /// Backend-independent description of the petal chart.
    pub petal_figure: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct AssessmentOutcome {
    pub generated_at: DateTime<Utc>,
    pub country: Option<String>,
    pub scores: Vec<ThematicScore>,
    pub answers: BTreeMap<QuestionId, AnswerRecord>,
    pub pillar_scores: Vec<PillarScore>,
    pub analysis: MinimumStandardAnalysis,
    pub summaries: Vec<ThematicSummary>,
    pub charts: Option<ChartArtifacts>,
    pub render_error: Option<String>,
}
