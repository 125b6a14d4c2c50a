//! Rule-based productivity estimator.
//!
//! Maps four lifestyle inputs to a 0–100 score with a fixed linear formula:
//!
//! ```text
//! score = 50
//!       + (sleep_hours    - 6) * 6
//!       + (focus_hours    - 3) * 5
//!       - (workload_level - 3) * 7
//!       + (exercise_minutes / 10) * 1.5
//! ```
//!
//! The raw value is rounded half-to-even and only then clamped to `0..=100`.
//!
//! | Score   | Outlook      |
//! |---------|--------------|
//! | ≥ 80    | Excellent    |
//! | 60..80  | Improvable   |
//! | < 60    | AtRisk       |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;

/// Score with every input at its neutral point.
pub const BASELINE_SCORE: f64 = 50.0;

pub const SLEEP_HOURS_MAX: f64 = 10.0;
pub const FOCUS_HOURS_MAX: f64 = 10.0;
pub const WORKLOAD_MIN: u8 = 1;
pub const WORKLOAD_MAX: u8 = 5;
pub const EXERCISE_MINUTES_MAX: u32 = 120;

const SLEEP_TIP_BELOW: f64 = 6.5;
const FOCUS_TIP_BELOW: f64 = 3.0;
const WORKLOAD_TIP_ABOVE: u8 = 3;
const EXERCISE_TIP_BELOW: u32 = 15;

/// Lifestyle inputs for one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringInput {
    /// Hours slept, `0..=10`
    pub sleep_hours: f64,
    /// Hours of focused work, `0..=10`
    pub focus_hours: f64,
    /// Perceived workload, `1..=5`
    pub workload_level: u8,
    /// Minutes of exercise, `0..=120`
    pub exercise_minutes: u32,
}

impl ScoringInput {
    /// Build a validated input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] naming the first field that
    /// is outside its range (or NaN).
    pub fn new(
        sleep_hours: f64,
        focus_hours: f64,
        workload_level: u8,
        exercise_minutes: u32,
    ) -> Result<Self, ValidationError> {
        let input = Self {
            sleep_hours,
            focus_hours,
            workload_level,
            exercise_minutes,
        };
        input.validate()?;
        Ok(input)
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("sleep_hours", self.sleep_hours, 0.0, SLEEP_HOURS_MAX)?;
        check_range("focus_hours", self.focus_hours, 0.0, FOCUS_HOURS_MAX)?;
        check_range(
            "workload_level",
            f64::from(self.workload_level),
            f64::from(WORKLOAD_MIN),
            f64::from(WORKLOAD_MAX),
        )?;
        check_range(
            "exercise_minutes",
            f64::from(self.exercise_minutes),
            0.0,
            f64::from(EXERCISE_MINUTES_MAX),
        )
    }

    /// Per-input contributions to the raw score, in formula order.
    pub fn terms(&self) -> Vec<ScoreTerm> {
        vec![
            ScoreTerm::new("sleep", (self.sleep_hours - 6.0) * 6.0),
            ScoreTerm::new("focus", (self.focus_hours - 3.0) * 5.0),
            ScoreTerm::new("workload", -(f64::from(self.workload_level) - 3.0) * 7.0),
            ScoreTerm::new("exercise", f64::from(self.exercise_minutes) / 10.0 * 1.5),
        ]
    }

    /// Unrounded, unclamped score.
    pub fn raw_score(&self) -> f64 {
        self.terms()
            .iter()
            .fold(BASELINE_SCORE, |acc, term| acc + term.contribution)
    }

    /// Improvement tips, in fixed check order.
    pub fn tips(&self) -> Vec<Tip> {
        let mut tips = Vec::new();
        if self.sleep_hours < SLEEP_TIP_BELOW {
            tips.push(Tip::Sleep);
        }
        if self.focus_hours < FOCUS_TIP_BELOW {
            tips.push(Tip::DeepWork);
        }
        if self.workload_level > WORKLOAD_TIP_ABOVE {
            tips.push(Tip::ReduceWorkload);
        }
        if self.exercise_minutes < EXERCISE_TIP_BELOW {
            tips.push(Tip::Exercise);
        }
        if tips.is_empty() {
            tips.push(Tip::OnTrack);
        }
        tips
    }

    /// Score the input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] if a field is out of range.
    pub fn predict(&self) -> Result<Prediction, ValidationError> {
        self.validate()?;

        let raw_score = self.raw_score();
        let score = raw_score.round_ties_even().clamp(0.0, 100.0) as u8;
        let prediction = Prediction {
            score,
            outlook: Outlook::from_score(score),
            tips: self.tips(),
            raw_score,
            terms: self.terms(),
        };
        debug!(score, raw_score, outlook = ?prediction.outlook, "productivity predicted");
        Ok(prediction)
    }
}

/// Score a set of lifestyle inputs.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidValue`] if any input is out of range.
pub fn predict(
    sleep_hours: f64,
    focus_hours: f64,
    workload_level: u8,
    exercise_minutes: u32,
) -> Result<Prediction, ValidationError> {
    ScoringInput {
        sleep_hours,
        focus_hours,
        workload_level,
        exercise_minutes,
    }
    .predict()
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value.is_nan() || value < min || value > max {
        return Err(ValidationError::invalid(
            field,
            format!("{value} is outside {min}..={max}"),
        ));
    }
    Ok(())
}

/// One input's contribution to the raw score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreTerm {
    pub name: &'static str,
    pub contribution: f64,
}

impl ScoreTerm {
    fn new(name: &'static str, contribution: f64) -> Self {
        Self { name, contribution }
    }
}

/// Qualitative band of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    /// 80 and above
    Excellent,
    /// 60 to 79
    Improvable,
    /// Below 60
    AtRisk,
}

impl Outlook {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Outlook::Excellent,
            60..=79 => Outlook::Improvable,
            _ => Outlook::AtRisk,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Outlook::Excellent => "Excellent! Tomorrow looks highly productive.",
            Outlook::Improvable => "Good, but can be improved.",
            Outlook::AtRisk => {
                "High risk of low productivity. Try improving sleep/focus/exercise."
            }
        }
    }
}

/// Improvement suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tip {
    Sleep,
    DeepWork,
    ReduceWorkload,
    Exercise,
    /// Nothing to improve
    OnTrack,
}

impl Tip {
    pub fn text(self) -> &'static str {
        match self {
            Tip::Sleep => "Sleep at least 7 hours.",
            Tip::DeepWork => "Plan 1–2 deep work blocks (45–60 mins).",
            Tip::ReduceWorkload => "Reduce tasks: pick top 3 priorities only.",
            Tip::Exercise => "Add 15–20 mins walk or workout.",
            Tip::OnTrack => "Keep the same routine. You're on track!",
        }
    }
}

impl std::fmt::Display for Tip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Result of a prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Rounded and clamped score, `0..=100`
    pub score: u8,
    pub outlook: Outlook,
    pub tips: Vec<Tip>,
    /// Score before rounding and clamping
    pub raw_score: f64,
    pub terms: Vec<ScoreTerm>,
}

impl Prediction {
    pub fn tip_texts(&self) -> Vec<&'static str> {
        self.tips.iter().map(|t| t.text()).collect()
    }
}
