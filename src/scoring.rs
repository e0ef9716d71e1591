use serde::Serialize;

use crate::aggregate::round_to;
use crate::models::{InputRanges, PredictionInput, PredictionResult, Range, Tier};

const MIDTERM_WEIGHT: f64 = 0.65;
const ATTENDANCE_WEIGHT: f64 = 18.0;
const STUDY_HOURS_WEIGHT: f64 = 0.15;
const INTERCEPT: f64 = 2.5;

/// Predicted final score, rounded to 1 decimal and clamped to [0, 100].
///
/// Inputs are not validated here. A NaN result collapses to 0.
pub fn predict_score(midterm_score: f64, attendance_rate: f64, weekly_study_hours: f64) -> f64 {
    let raw = MIDTERM_WEIGHT * midterm_score
        + ATTENDANCE_WEIGHT * attendance_rate
        + STUDY_HOURS_WEIGHT * weekly_study_hours
        + INTERCEPT;
    let score = round_to(raw, 1).clamp(0.0, 100.0);
    if score.is_nan() {
        0.0
    } else {
        score
    }
}

impl Tier {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 85.0 => Tier::Excellent,
            s if s >= 70.0 => Tier::Good,
            s if s >= 60.0 => Tier::Pass,
            _ => Tier::Fail,
        }
    }
}

pub fn predict(input: &PredictionInput) -> PredictionResult {
    let predicted_score = predict_score(
        input.midterm_score,
        input.attendance_rate,
        input.weekly_study_hours,
    );
    PredictionResult {
        predicted_score,
        tier: Tier::from_score(predicted_score),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutOfRange {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl InputRanges {
    /// Fields of `input` that fall outside the bounds observed in the dataset.
    pub fn check(&self, input: &PredictionInput) -> Vec<OutOfRange> {
        let fields: [(&'static str, f64, Range); 3] = [
            ("midterm_score", input.midterm_score, self.midterm),
            ("attendance_rate", input.attendance_rate, self.attendance),
            ("weekly_study_hours", input.weekly_study_hours, self.study_hours),
        ];

        fields
            .into_iter()
            .filter(|(_, value, range)| !(range.min..=range.max).contains(value))
            .map(|(field, value, range)| OutOfRange {
                field,
                value,
                min: range.min,
                max: range.max,
            })
            .collect()
    }
}
