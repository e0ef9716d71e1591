use std::fmt::Write;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::advice::{Advice, AssetCatalog, PREVIEW_ASSET};
use crate::aggregate::{self, DEFAULT_HISTOGRAM_BINS};
use crate::dataset::DataContext;
use crate::error::AssetWarning;
use crate::models::{
    AttendanceSummary, BoxSummary, DatasetOverview, GenderRatioRow, Histogram, MajorMetrics,
    MajorProfile, MajorReference, PredictionInput, PredictionResult,
};
use crate::sales::{SalesBucket, SalesFilter, SalesSummary};
use crate::scoring::OutOfRange;

#[derive(Debug, Clone, Serialize)]
pub struct OverviewReport {
    pub overview: DatasetOverview,
    pub preview: Result<PathBuf, AssetWarning>,
}

/// Everything the analytics page shows, computed in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Local>,
    pub overview: DatasetOverview,
    pub gender_ratios: Vec<GenderRatioRow>,
    pub major_metrics: Vec<MajorMetrics>,
    pub attendance: Vec<AttendanceSummary>,
    pub target: Option<TargetAnalysis>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetAnalysis {
    pub profile: MajorProfile,
    pub final_histogram: Histogram,
    pub study_hours_box: Option<BoxSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub input: PredictionInput,
    pub result: PredictionResult,
    pub advice: Advice,
    pub reference: Option<MajorReference>,
    pub out_of_range: Vec<OutOfRange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub filter: SalesFilter,
    pub summary: SalesSummary,
    pub by_hour: Vec<SalesBucket>,
    pub by_product: Vec<SalesBucket>,
}

pub fn analyze(context: &DataContext, target_major: Option<&str>) -> AnalyticsReport {
    let dataset = context.dataset();
    let records = dataset.records();

    let target = target_major.and_then(|major| {
        let profile = aggregate::major_profile(records, major)?;
        let rows = aggregate::filter_major(records, major);
        Some(TargetAnalysis {
            profile,
            final_histogram: aggregate::final_score_histogram(
                rows.iter().copied(),
                DEFAULT_HISTOGRAM_BINS,
            ),
            study_hours_box: aggregate::box_summary(rows.iter().map(|r| r.weekly_study_hours)),
        })
    });

    AnalyticsReport {
        generated_at: Local::now(),
        overview: aggregate::overview(dataset),
        gender_ratios: aggregate::gender_ratios(records),
        major_metrics: aggregate::major_metrics(records),
        attendance: aggregate::attendance_by_major(records),
        target,
    }
}

fn pct(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

pub fn overview(context: &DataContext, catalog: &AssetCatalog) -> OverviewReport {
    OverviewReport {
        overview: aggregate::overview(context.dataset()),
        preview: catalog.resolve(PREVIEW_ASSET),
    }
}

pub fn render_overview(report: &OverviewReport) -> String {
    let mut output = String::new();
    let overview = &report.overview;
    let _ = writeln!(output, "# Student Performance Overview");
    let _ = writeln!(
        output,
        "{} records across {} majors.",
        overview.record_count, overview.major_count
    );
    match &report.preview {
        Ok(path) => {
            let _ = writeln!(output, "Preview: {}", path.display());
        }
        Err(warning) => {
            let _ = writeln!(output, "Warning: {warning}");
        }
    }
    let _ = writeln!(output);
    for major in &overview.majors {
        let _ = writeln!(output, "- {major}");
    }
    output
}

pub fn render_analytics(report: &AnalyticsReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Major Analytics");
    let _ = writeln!(
        output,
        "Computed from {} records (generated {})",
        report.overview.record_count,
        report.generated_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Gender Distribution");
    if report.gender_ratios.is_empty() {
        let _ = writeln!(output, "No records.");
    }
    for row in &report.gender_ratios {
        let shares: Vec<String> = row
            .ratios
            .iter()
            .map(|(gender, ratio)| format!("{gender} {}", pct(*ratio)))
            .collect();
        let _ = writeln!(output, "- {} ({}): {}", row.major, row.total, shares.join(", "));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Core Metrics");
    let _ = writeln!(
        output,
        "| Major | Midterm | Final | Study hours/week | Attendance |"
    );
    let _ = writeln!(output, "|---|---|---|---|---|");
    for m in &report.major_metrics {
        let _ = writeln!(
            output,
            "| {} | {:.2} | {:.2} | {:.2} | {:.2} |",
            m.major, m.midterm_mean, m.final_mean, m.study_hours_mean, m.attendance_mean
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Attendance");
    for a in &report.attendance {
        let _ = writeln!(
            output,
            "- {}: {} across {} students",
            a.major,
            pct(a.attendance_mean),
            a.count
        );
    }

    let _ = writeln!(output);
    match &report.target {
        None => {
            let _ = writeln!(output, "## Target Major");
            let _ = writeln!(output, "No records for the selected major.");
        }
        Some(target) => {
            let p = &target.profile;
            let _ = writeln!(output, "## Target Major: {}", p.major);
            let _ = writeln!(output, "- Students: {}", p.count);
            let _ = writeln!(output, "- Mean attendance: {:.1}%", p.attendance_pct);
            let _ = writeln!(output, "- Mean final score: {:.1}", p.final_mean);
            let _ = writeln!(output, "- Pass rate: {:.1}%", p.pass_rate);
            let _ = writeln!(output, "- Mean study hours: {:.1} h/week", p.study_hours_mean);

            let _ = writeln!(output);
            let _ = writeln!(output, "### Final Score Distribution");
            for bin in &target.final_histogram.bins {
                let _ = writeln!(
                    output,
                    "- {:.1}-{:.1}: {}",
                    bin.lower, bin.upper, bin.count
                );
            }

            if let Some(b) = &target.study_hours_box {
                let _ = writeln!(output);
                let _ = writeln!(output, "### Study Hours Spread");
                let _ = writeln!(
                    output,
                    "min {:.1} / q1 {:.1} / median {:.1} / q3 {:.1} / max {:.1}",
                    b.min, b.q1, b.median, b.q3, b.max
                );
            }
        }
    }

    output
}

pub fn render_prediction(report: &PredictionReport) -> String {
    let mut output = String::new();
    let entry = &report.advice.entry;

    let _ = writeln!(output, "predicted score: {:.1}", report.result.predicted_score);
    let _ = writeln!(output);
    let _ = writeln!(output, "Tier: {}", entry.label);
    let _ = writeln!(output, "Advice: {}", entry.guidance);
    let _ = writeln!(output, "{}", entry.encouragement);

    match &report.advice.asset {
        Ok(path) => {
            let _ = writeln!(output, "Image: {}", path.display());
        }
        Err(warning) => {
            let _ = writeln!(output, "Warning: {warning}");
        }
    }

    for issue in &report.out_of_range {
        let _ = writeln!(
            output,
            "Note: {} = {} is outside the observed range {}-{}",
            issue.field, issue.value, issue.min, issue.max
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Reference ({})", report.input.major);
    match &report.reference {
        Some(reference) => {
            let _ = writeln!(
                output,
                "- Same-major mean final score: {:.1}",
                reference.final_mean
            );
            let _ = writeln!(
                output,
                "- Same-major pass rate: {:.1}%",
                reference.pass_rate
            );
        }
        None => {
            let _ = writeln!(output, "No records for this major.");
        }
    }

    output
}

pub fn render_sales(report: &SalesReport) -> String {
    let mut output = String::new();
    let summary = &report.summary;

    let _ = writeln!(output, "# Sales Dashboard");
    let _ = writeln!(
        output,
        "Cities: {} | Customer types: {} | Genders: {}",
        report.filter.cities.join(", "),
        report.filter.customer_types.join(", "),
        report.filter.genders.join(", ")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "- Orders: {}", summary.order_count);
    let _ = writeln!(output, "- Total sales: RMB¥{}", summary.total_sales);
    match summary.avg_rating {
        Some(rating) => {
            let _ = writeln!(output, "- Mean rating: {rating:.1}");
        }
        None => {
            let _ = writeln!(output, "- Mean rating: n/a");
        }
    }
    match summary.avg_per_order {
        Some(avg) => {
            let _ = writeln!(output, "- Mean sale per order: RMB¥{avg:.2}");
        }
        None => {
            let _ = writeln!(output, "- Mean sale per order: n/a");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sales by Hour");
    if report.by_hour.is_empty() {
        let _ = writeln!(output, "No sales for this selection.");
    }
    for bucket in &report.by_hour {
        let _ = writeln!(output, "- {:>2}:00  {}", bucket.key, bucket.sales);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sales by Product Type");
    if report.by_product.is_empty() {
        let _ = writeln!(output, "No sales for this selection.");
    }
    for bucket in &report.by_product {
        let _ = writeln!(output, "- {}: {}", bucket.key, bucket.sales);
    }

    output
}
