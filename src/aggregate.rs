//! Group-by statistics over the student table.
//!
//! Grouped outputs are ordered by key (byte order of the category value).
//! Selection lists such as [`overview`] keep first-appearance order instead.

use std::collections::{BTreeMap, BTreeSet};

use crate::dataset::Dataset;
use crate::models::{
    AttendanceSummary, BoxSummary, DatasetOverview, GenderRatioRow, Histogram, HistogramBin,
    InputRanges, MajorMetrics, MajorProfile, MajorReference, Range, StudentRecord,
};

pub const PASS_MARK: f64 = 60.0;
pub const DEFAULT_HISTOGRAM_BINS: usize = 15;

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn group_by_major(records: &[StudentRecord]) -> BTreeMap<&str, Vec<&StudentRecord>> {
    let mut groups: BTreeMap<&str, Vec<&StudentRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.major.as_str()).or_default().push(record);
    }
    groups
}

/// Per-major means of the four core metrics, rounded to 2 decimals.
pub fn major_metrics(records: &[StudentRecord]) -> Vec<MajorMetrics> {
    group_by_major(records)
        .into_iter()
        .map(|(major, rows)| {
            let avg = |f: fn(&StudentRecord) -> f64| {
                round_to(mean(rows.iter().map(|r| f(r))).unwrap_or(0.0), 2)
            };
            MajorMetrics {
                major: major.to_string(),
                count: rows.len(),
                midterm_mean: avg(|r| r.midterm_score),
                final_mean: avg(|r| r.final_score),
                study_hours_mean: avg(|r| r.weekly_study_hours),
                attendance_mean: avg(|r| r.attendance_rate),
            }
        })
        .collect()
}

pub fn attendance_by_major(records: &[StudentRecord]) -> Vec<AttendanceSummary> {
    group_by_major(records)
        .into_iter()
        .map(|(major, rows)| AttendanceSummary {
            major: major.to_string(),
            attendance_mean: round_to(
                mean(rows.iter().map(|r| r.attendance_rate)).unwrap_or(0.0),
                4,
            ),
            count: rows.len(),
        })
        .collect()
}

/// Gender share within each major.
///
/// Every row carries every gender seen in `records`, with zero counts filled
/// in. A row whose total is zero gets a ratio of 0.0 for each gender.
pub fn gender_ratios(records: &[StudentRecord]) -> Vec<GenderRatioRow> {
    let genders: BTreeSet<&str> = records.iter().map(|r| r.gender.as_str()).collect();

    group_by_major(records)
        .into_iter()
        .map(|(major, rows)| {
            let mut counts: BTreeMap<String, usize> =
                genders.iter().map(|g| (g.to_string(), 0)).collect();
            for row in &rows {
                *counts.entry(row.gender.clone()).or_default() += 1;
            }
            let total: usize = counts.values().sum();
            let ratios = counts
                .iter()
                .map(|(gender, &count)| {
                    let ratio = if total == 0 {
                        0.0
                    } else {
                        round_to(count as f64 / total as f64, 4)
                    };
                    (gender.clone(), ratio)
                })
                .collect();

            GenderRatioRow {
                major: major.to_string(),
                total,
                counts,
                ratios,
            }
        })
        .collect()
}

pub fn filter_major<'a>(records: &'a [StudentRecord], major: &str) -> Vec<&'a StudentRecord> {
    records.iter().filter(|r| r.major == major).collect()
}

/// Share of rows with a passing final score, as a percentage to 1 decimal.
/// `None` for an empty group.
pub fn pass_rate<'a>(records: impl IntoIterator<Item = &'a StudentRecord>) -> Option<f64> {
    let (passed, total) = records.into_iter().fold((0usize, 0usize), |(p, t), r| {
        (p + usize::from(r.final_score >= PASS_MARK), t + 1)
    });
    if total == 0 {
        None
    } else {
        Some(round_to(passed as f64 / total as f64 * 100.0, 1))
    }
}

pub fn major_profile(records: &[StudentRecord], major: &str) -> Option<MajorProfile> {
    let rows = filter_major(records, major);
    let avg = |f: fn(&StudentRecord) -> f64| mean(rows.iter().map(|r| f(r)));

    Some(MajorProfile {
        major: major.to_string(),
        count: rows.len(),
        attendance_pct: round_to(avg(|r| r.attendance_rate)? * 100.0, 1),
        final_mean: round_to(avg(|r| r.final_score)?, 1),
        pass_rate: pass_rate(rows.iter().copied())?,
        study_hours_mean: round_to(avg(|r| r.weekly_study_hours)?, 1),
    })
}

/// Same-major mean final score and pass rate, shown beside a prediction.
pub fn major_reference(records: &[StudentRecord], major: &str) -> Option<MajorReference> {
    let rows = filter_major(records, major);
    Some(MajorReference {
        major: major.to_string(),
        final_mean: round_to(mean(rows.iter().map(|r| r.final_score))?, 1),
        pass_rate: pass_rate(rows.iter().copied())?,
    })
}

/// Equal-width bins spanning the observed final scores.
///
/// The maximum lands in the last bin. When every score is equal there is a
/// single zero-width bin.
pub fn final_score_histogram<'a>(
    records: impl IntoIterator<Item = &'a StudentRecord>,
    bins: usize,
) -> Histogram {
    let values: Vec<f64> = records.into_iter().map(|r| r.final_score).collect();
    histogram(&values, bins)
}

fn histogram(values: &[f64], bins: usize) -> Histogram {
    if values.is_empty() || bins == 0 {
        return Histogram::default();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return Histogram {
            bins: vec![HistogramBin {
                lower: min,
                upper: max,
                count: values.len(),
            }],
        };
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &value in values {
        let idx = ((value - min) / width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    Histogram {
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count,
            })
            .collect(),
    }
}

fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

/// Five-number summary with linear interpolation between order statistics.
pub fn box_summary(values: impl IntoIterator<Item = f64>) -> Option<BoxSummary> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    Some(BoxSummary {
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

pub fn overview(dataset: &Dataset) -> DatasetOverview {
    let majors = dataset.majors();
    DatasetOverview {
        record_count: dataset.len(),
        major_count: majors.len(),
        majors,
    }
}

fn range(values: impl Iterator<Item = f64> + Clone) -> Option<Range> {
    let mean = mean(values.clone())?;
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    Some(Range { min, max, mean })
}

/// Bounds and defaults for the prediction inputs. `None` for an empty dataset.
pub fn input_ranges(dataset: &Dataset) -> Option<InputRanges> {
    let records = dataset.records();
    Some(InputRanges {
        midterm: range(records.iter().map(|r| r.midterm_score))?,
        attendance: range(records.iter().map(|r| r.attendance_rate))?,
        study_hours: range(records.iter().map(|r| r.weekly_study_hours))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::record;

    fn sample() -> Vec<StudentRecord> {
        vec![
            record("软件工程", "男", 72.0),
            record("金融", "女", 55.0),
            record("软件工程", "女", 59.9),
            record("软件工程", "男", 88.0),
            record("金融", "女", 61.0),
        ]
    }

    #[test]
    fn round_to_is_half_away_from_zero() {
        assert_eq!(round_to(2.345, 2), 2.35);
        assert_eq!(round_to(-1.25, 1), -1.3);
        assert_eq!(round_to(73.7, 1), 73.7);
    }

    #[test]
    fn major_metrics_sorted_and_rounded() {
        let mut rows = sample();
        rows[0].midterm_score = 80.0;
        rows[2].midterm_score = 61.0;
        rows[3].midterm_score = 75.0;

        let metrics = major_metrics(&rows);
        let majors: Vec<_> = metrics.iter().map(|m| m.major.as_str()).collect();
        assert_eq!(majors, vec!["软件工程", "金融"]);

        let software = &metrics[0];
        assert_eq!(software.count, 3);
        assert_eq!(software.midterm_mean, 72.0);
        assert_eq!(software.final_mean, 73.3);
        assert_eq!(software.attendance_mean, 0.9);
    }

    #[test]
    fn gender_ratios_fill_missing_combinations() {
        let ratios = gender_ratios(&sample());
        let finance = ratios.iter().find(|row| row.major == "金融").unwrap();
        assert_eq!(finance.counts["男"], 0);
        assert_eq!(finance.counts["女"], 2);
        assert_eq!(finance.ratios["男"], 0.0);
        assert_eq!(finance.ratios["女"], 1.0);

        let software = ratios.iter().find(|row| row.major == "软件工程").unwrap();
        assert_eq!(software.total, 3);
        assert_eq!(software.ratios["男"], 0.6667);
        assert_eq!(software.ratios["女"], 0.3333);
    }

    #[test]
    fn gender_ratios_sum_to_one() {
        for row in gender_ratios(&sample()) {
            let sum: f64 = row.ratios.values().sum();
            assert!((sum - 1.0).abs() < 1e-3, "{} sums to {sum}", row.major);
        }
    }

    #[test]
    fn attendance_summary_counts_rows() {
        let summaries = attendance_by_major(&sample());
        assert_eq!(summaries[1].major, "金融");
        assert_eq!(summaries[1].count, 2);
        assert_eq!(summaries[1].attendance_mean, 0.9);
    }

    #[test]
    fn pass_rate_uses_inclusive_threshold() {
        let rows = vec![
            record("a", "男", 60.0),
            record("a", "男", 59.9),
            record("a", "女", 90.0),
        ];
        assert_eq!(pass_rate(&rows), Some(66.7));
        assert_eq!(pass_rate(&Vec::<StudentRecord>::new()), None);
    }

    #[test]
    fn profile_for_selected_major() {
        let profile = major_profile(&sample(), "软件工程").unwrap();
        assert_eq!(profile.count, 3);
        assert_eq!(profile.attendance_pct, 90.0);
        assert_eq!(profile.final_mean, 73.3);
        assert_eq!(profile.pass_rate, 66.7);
        assert_eq!(profile.study_hours_mean, 15.0);

        assert!(major_profile(&sample(), "物理").is_none());
    }

    #[test]
    fn reference_matches_profile() {
        let reference = major_reference(&sample(), "金融").unwrap();
        assert_eq!(reference.final_mean, 58.0);
        assert_eq!(reference.pass_rate, 50.0);
    }

    #[test]
    fn histogram_covers_every_value() {
        let rows: Vec<_> = (0..=10)
            .map(|i| record("a", "男", 50.0 + i as f64 * 5.0))
            .collect();
        let hist = final_score_histogram(&rows, 5);
        assert_eq!(hist.bins.len(), 5);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 11);
        assert_eq!(hist.bins[0].lower, 50.0);
        assert_eq!(hist.bins[4].upper, 100.0);
        assert_eq!(hist.bins[4].count, 3);
    }

    #[test]
    fn histogram_of_constant_scores() {
        let rows = vec![record("a", "男", 70.0), record("a", "女", 70.0)];
        let hist = final_score_histogram(&rows, DEFAULT_HISTOGRAM_BINS);
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].count, 2);
        assert!(final_score_histogram(&Vec::<StudentRecord>::new(), 15).bins.is_empty());
    }

    #[test]
    fn box_summary_interpolates() {
        let summary = box_summary([4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.max, 5.0);

        let even = box_summary([1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(even.median, 2.5);
        assert_eq!(even.q1, 1.75);
        assert!(box_summary(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn overview_and_ranges() {
        let dataset = Dataset::from_records(sample());
        let overview = overview(&dataset);
        assert_eq!(overview.record_count, 5);
        assert_eq!(overview.majors, vec!["软件工程", "金融"]);

        let ranges = input_ranges(&dataset).unwrap();
        assert_eq!(ranges.midterm.min, 70.0);
        assert_eq!(ranges.study_hours.mean, 15.0);
        assert!(input_ranges(&Dataset::default()).is_none());
    }
}
