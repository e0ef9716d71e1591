use std::io::Write;

use insight_dashboards::advice::{advise, AssetCatalog};
use insight_dashboards::aggregate;
use insight_dashboards::config::{AssetConfig, ColumnMap};
use insight_dashboards::dataset::DataContext;
use insight_dashboards::error::DatasetError;
use insight_dashboards::models::{PredictionInput, Tier};
use insight_dashboards::report::{self, PredictionReport};
use insight_dashboards::scoring;
use tempfile::NamedTempFile;

const STUDENTS: &str = "\
学号,专业,性别,期中考试分数,期末考试分数,每周学习时长（小时）,上课出勤率
20230001,大数据管理,男,82,88,22,0.95
20230002,大数据管理,女,61,57,8,0.72
20230003,大数据管理,女,74,71,15,0.88
20230004,软件工程,男,90,93,25,0.97
20230005,软件工程,女,55,49,6,0.61
";

fn students_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(STUDENTS.as_bytes()).unwrap();
    file
}

#[test]
fn analytics_report_from_csv() {
    let file = students_file();
    let context = DataContext::load(file.path(), ColumnMap::default()).unwrap();

    let analytics = report::analyze(&context, Some("大数据管理"));
    assert_eq!(analytics.overview.majors, vec!["大数据管理", "软件工程"]);

    let big_data = &analytics.gender_ratios[0];
    assert_eq!(big_data.major, "大数据管理");
    assert_eq!(big_data.ratios["女"], 0.6667);
    assert_eq!(big_data.ratios["男"], 0.3333);

    let target = analytics.target.unwrap();
    assert_eq!(target.profile.count, 3);
    assert_eq!(target.profile.pass_rate, 66.7);
    assert_eq!(target.profile.final_mean, 72.0);
    assert_eq!(target.profile.attendance_pct, 85.0);
}

#[test]
fn prediction_with_missing_assets_still_renders() {
    let file = students_file();
    let context = DataContext::load(file.path(), ColumnMap::default()).unwrap();
    let assets = tempfile::tempdir().unwrap();
    let catalog = AssetCatalog::from_config(&AssetConfig {
        dir: assets.path().to_path_buf(),
        ..AssetConfig::default()
    });

    let input = PredictionInput {
        student_id: "20230009".to_string(),
        major: "软件工程".to_string(),
        gender: "女".to_string(),
        midterm_score: 100.0,
        attendance_rate: 1.0,
        weekly_study_hours: 40.0,
    };
    let result = scoring::predict(&input);
    assert_eq!(result.tier, Tier::Excellent);

    let prediction = PredictionReport {
        reference: aggregate::major_reference(context.dataset().records(), &input.major),
        advice: advise(result.tier, &catalog),
        input,
        result,
        out_of_range: Vec::new(),
    };
    let text = report::render_prediction(&prediction);
    assert!(text.starts_with("predicted score: 91.5"));
    assert!(text.contains("Warning: asset 'excellent' missing"));
    assert!(text.contains("- Same-major pass rate: 50.0%"));
}

#[test]
fn missing_columns_abort_loading() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all("学号,专业,期末考试分数\n1,金融,80\n".as_bytes())
        .unwrap();

    match DataContext::load(file.path(), ColumnMap::default()) {
        Err(DatasetError::Schema { missing }) => assert_eq!(
            missing,
            vec!["性别", "期中考试分数", "每周学习时长（小时）", "上课出勤率"]
        ),
        other => panic!("expected schema error, got {other:?}"),
    }
}
