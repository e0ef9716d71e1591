use std::collections::HashSet;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info};

use crate::config::ColumnMap;
use crate::error::{DatasetError, LoadCause};
use crate::models::StudentRecord;

/// The loaded student table. Rows keep file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<StudentRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<StudentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct majors in first-appearance order.
    pub fn majors(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|record| seen.insert(record.major.as_str()))
            .map(|record| record.major.clone())
            .collect()
    }
}

struct ColumnIndex {
    major: usize,
    gender: usize,
    midterm: usize,
    final_score: usize,
    study_hours: usize,
    attendance: usize,
    student_id: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &ColumnMap) -> Result<Self, DatasetError> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim_start_matches('\u{feff}').trim() == name)
        };

        let missing: Vec<String> = columns
            .required()
            .iter()
            .filter(|name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::Schema { missing });
        }

        // Every lookup below succeeded in the scan above.
        let index = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            major: index(&columns.major),
            gender: index(&columns.gender),
            midterm: index(&columns.midterm),
            final_score: index(&columns.final_score),
            study_hours: index(&columns.study_hours),
            attendance: index(&columns.attendance),
            student_id: index(&columns.student_id),
        })
    }
}

pub(crate) fn is_not_found(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound)
}

/// Reads and validates the student CSV at `path`.
///
/// Either the whole table parses or an error is returned; there is no
/// partial result.
pub fn load_dataset(path: &Path, columns: &ColumnMap) -> Result<Dataset, DatasetError> {
    let load_err = |source: LoadCause| DatasetError::Load {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(|err| {
        if is_not_found(&err) {
            DatasetError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            load_err(err.into())
        }
    })?;
    let headers = reader
        .headers()
        .map_err(|err| load_err(err.into()))?
        .clone();
    let index = ColumnIndex::resolve(&headers, columns)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| load_err(err.into()))?;
        let line = row.position().map(|pos| pos.line()).unwrap_or_default();

        let text = |idx: usize| row.get(idx).unwrap_or_default().trim().to_string();
        let number = |idx: usize, column: &str| -> Result<f64, DatasetError> {
            let raw = row.get(idx).unwrap_or_default().trim();
            match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(load_err(LoadCause::Parse {
                    line,
                    column: column.to_string(),
                    value: raw.to_string(),
                })),
            }
        };

        records.push(StudentRecord {
            student_id: text(index.student_id),
            major: text(index.major),
            gender: text(index.gender),
            midterm_score: number(index.midterm, &columns.midterm)?,
            final_score: number(index.final_score, &columns.final_score)?,
            weekly_study_hours: number(index.study_hours, &columns.study_hours)?,
            attendance_rate: number(index.attendance, &columns.attendance)?,
        });
    }

    info!(path = %path.display(), rows = records.len(), "Loaded student dataset");
    Ok(Dataset { records })
}

/// Read-only view of the student dataset, passed to every computation.
///
/// Loaded once at construction. [`DataContext::reload`] re-reads the file;
/// nothing else picks up changes on disk. A context built from in-memory
/// records has no source and cannot reload.
#[derive(Debug)]
pub struct DataContext {
    source: Option<PathBuf>,
    columns: ColumnMap,
    dataset: Dataset,
}

impl DataContext {
    pub fn load(source: impl Into<PathBuf>, columns: ColumnMap) -> Result<Self, DatasetError> {
        let source = source.into();
        let dataset = load_dataset(&source, &columns)?;
        Ok(Self {
            source: Some(source),
            columns,
            dataset,
        })
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            source: None,
            columns: ColumnMap::default(),
            dataset,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Re-reads the source file. On failure the previous dataset is kept.
    pub fn reload(&mut self) -> Result<(), DatasetError> {
        let source = self.source.as_deref().ok_or(DatasetError::NoSource)?;
        let dataset = load_dataset(source, &self.columns)?;
        debug!(
            previous = self.dataset.len(),
            current = dataset.len(),
            "Reloaded student dataset"
        );
        self.dataset = dataset;
        Ok(())
    }
}
