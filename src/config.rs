//! TOML configuration with defaults that match the shipped dataset.
//!
//! Every field is optional in the file; absent sections fall back to
//! [`Default`]. CLI flags override whatever the file sets.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "insight-dashboards.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub columns: ColumnMap,
    pub assets: AssetConfig,
    pub sales: SalesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
    /// Major preselected by `analyze` when present in the data.
    pub default_major: String,
}

/// Header names of the required student columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub major: String,
    pub gender: String,
    pub midterm: String,
    #[serde(rename = "final")]
    pub final_score: String,
    pub study_hours: String,
    pub attendance: String,
    pub student_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub dir: PathBuf,
    /// Asset key to file name, relative to `dir`.
    pub files: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesConfig {
    pub seed: u64,
    pub rows: usize,
    pub default_cities: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("student_data_adjusted_rounded.csv"),
            default_major: "大数据管理".to_string(),
        }
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            major: "专业".to_string(),
            gender: "性别".to_string(),
            midterm: "期中考试分数".to_string(),
            final_score: "期末考试分数".to_string(),
            study_hours: "每周学习时长（小时）".to_string(),
            attendance: "上课出勤率".to_string(),
            student_id: "学号".to_string(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        let files = [
            ("preview", "功能预览图.png"),
            ("excellent", "很棒哦.jpg"),
            ("good", "继续努力.jpg"),
            ("poor", "要加强学习.jpg"),
        ]
        .into_iter()
        .map(|(key, file)| (key.to_string(), file.to_string()))
        .collect();

        Self {
            dir: PathBuf::from("photo"),
            files,
        }
    }
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            rows: 1000,
            default_cities: vec!["太原".to_string(), "临汾".to_string(), "大同".to_string()],
        }
    }
}

impl ColumnMap {
    /// All required headers, in a fixed order used for schema errors.
    pub fn required(&self) -> [&str; 7] {
        [
            self.major.as_str(),
            self.gender.as_str(),
            self.midterm.as_str(),
            self.final_score.as_str(),
            self.study_hours.as_str(),
            self.attendance.as_str(),
            self.student_id.as_str(),
        ]
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` when it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            debug!(path = %path.display(), "Loading config");
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_dataset_headers() {
        let columns = ColumnMap::default();
        assert_eq!(columns.required()[0], "专业");
        assert_eq!(columns.required()[6], "学号");
        assert_eq!(Config::default().assets.files.len(), 4);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[dataset]\npath = \"data/students.csv\"\n\n[columns]\nmajor = \"major\"\nfinal = \"final\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.dataset.path, PathBuf::from("data/students.csv"));
        assert_eq!(config.dataset.default_major, "大数据管理");
        assert_eq!(config.columns.major, "major");
        assert_eq!(config.columns.final_score, "final");
        assert_eq!(config.columns.gender, "性别");
        assert_eq!(config.sales.seed, 42);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.assets.dir, PathBuf::from("photo"));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dataset\npath = 3").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
