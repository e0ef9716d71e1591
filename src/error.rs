use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading the student dataset. Any of these aborts the render.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("dataset file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("dataset is missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("dataset was built in memory and has no file to reload")]
    NoSource,

    #[error("failed to load dataset {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadCause,
    },
}

/// Underlying cause of a [`DatasetError::Load`].
#[derive(Error, Debug)]
pub enum LoadCause {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("line {line}: column {column} has non-numeric value {value:?}")]
    Parse {
        line: u64,
        column: String,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Error, Debug)]
pub enum SalesError {
    #[error("sales file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("failed to load sales data {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Non-fatal: an illustrative image could not be found. Rendering continues.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AssetWarning {
    pub key: String,
    pub path: Option<PathBuf>,
}

impl fmt::Display for AssetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "asset '{}' missing at {}", self.key, path.display()),
            None => write!(f, "no asset configured for '{}'", self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_lists_columns() {
        let err = DatasetError::Schema {
            missing: vec!["专业".to_string(), "学号".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "dataset is missing required columns: 专业, 学号"
        );
    }

    #[test]
    fn load_error_exposes_parse_cause() {
        use std::error::Error;

        let err = DatasetError::Load {
            path: PathBuf::from("students.csv"),
            source: LoadCause::Parse {
                line: 3,
                column: "上课出勤率".to_string(),
                value: "high".to_string(),
            },
        };
        assert!(err.to_string().contains("students.csv"));
        let cause = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(cause.contains("line 3"));
    }

    #[test]
    fn asset_warning_display() {
        let warning = AssetWarning {
            key: "good".to_string(),
            path: Some(PathBuf::from("photo/good.jpg")),
        };
        assert_eq!(warning.to_string(), "asset 'good' missing at photo/good.jpg");

        let unknown = AssetWarning {
            key: "bogus".to_string(),
            path: None,
        };
        assert_eq!(unknown.to_string(), "no asset configured for 'bogus'");
    }
}
