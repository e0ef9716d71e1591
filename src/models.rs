use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub student_id: String,
    pub major: String,
    pub gender: String,
    pub midterm_score: f64,
    pub final_score: f64,
    pub weekly_study_hours: f64,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MajorMetrics {
    pub major: String,
    pub count: usize,
    pub midterm_mean: f64,
    pub final_mean: f64,
    pub study_hours_mean: f64,
    pub attendance_mean: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenderRatioRow {
    pub major: String,
    pub total: usize,
    pub counts: BTreeMap<String, usize>,
    pub ratios: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSummary {
    pub major: String,
    pub attendance_mean: f64,
    pub count: usize,
}

/// Headline numbers for one selected major.
#[derive(Debug, Clone, Serialize)]
pub struct MajorProfile {
    pub major: String,
    pub count: usize,
    pub attendance_pct: f64,
    pub final_mean: f64,
    pub pass_rate: f64,
    pub study_hours_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetOverview {
    pub record_count: usize,
    pub major_count: usize,
    pub majors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputRanges {
    pub midterm: Range,
    pub attendance: Range,
    pub study_hours: Range,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionInput {
    pub student_id: String,
    pub major: String,
    pub gender: String,
    pub midterm_score: f64,
    pub attendance_rate: f64,
    pub weekly_study_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    Fail,
    Pass,
    Good,
    Excellent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predicted_score: f64,
    pub tier: Tier,
}

/// Same-major figures shown next to a prediction.
#[derive(Debug, Clone, Serialize)]
pub struct MajorReference {
    pub major: String,
    pub final_mean: f64,
    pub pass_rate: f64,
}
