//! Supermarket sales dashboard: sample data, multi-select filter and totals.

use std::collections::BTreeMap;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::round_to;
use crate::dataset::is_not_found;
use crate::error::SalesError;

pub const CITIES: [&str; 4] = ["太原", "临汾", "大同", "长治"];
pub const CUSTOMER_TYPES: [&str; 2] = ["会员用户", "普通用户"];
pub const GENDERS: [&str; 2] = ["男性", "女性"];
pub const PRODUCT_TYPES: [&str; 6] = [
    "食品饮料",
    "运动旅行",
    "电子配件",
    "时尚配饰",
    "家居生活",
    "健康美容",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub city: String,
    pub customer_type: String,
    pub gender: String,
    pub hour: u8,
    pub product_type: String,
    pub sales: u64,
    pub rating: f64,
}

/// Deterministic sample: hours 0-23, sales 100-999, ratings 5-9.
pub fn generate_sample(seed: u64, rows: usize) -> Vec<SaleRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let pick = |options: &[&str], rng: &mut StdRng| {
        options.choose(rng).copied().unwrap_or_default().to_string()
    };

    (0..rows)
        .map(|_| SaleRecord {
            city: pick(&CITIES, &mut rng),
            customer_type: pick(&CUSTOMER_TYPES, &mut rng),
            gender: pick(&GENDERS, &mut rng),
            hour: rng.gen_range(0..24),
            product_type: pick(&PRODUCT_TYPES, &mut rng),
            sales: rng.gen_range(100..1000),
            rating: f64::from(rng.gen_range(5u8..10)),
        })
        .collect()
}

pub fn load_sales(path: &Path) -> Result<Vec<SaleRecord>, SalesError> {
    let load_err = |source| SalesError::Load {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(|err| {
        if is_not_found(&err) {
            SalesError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            load_err(err)
        }
    })?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<SaleRecord>() {
        rows.push(result.map_err(load_err)?);
    }

    info!(path = %path.display(), rows = rows.len(), "Loaded sales data");
    Ok(rows)
}

/// Multi-select filter. A row passes only if each of its fields is selected,
/// so an empty selection on any dimension matches nothing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SalesFilter {
    pub cities: Vec<String>,
    pub customer_types: Vec<String>,
    pub genders: Vec<String>,
}

impl SalesFilter {
    /// The dashboard's initial selection: `cities`, plus every customer type
    /// and gender present in `rows`.
    pub fn with_defaults(rows: &[SaleRecord], cities: &[String]) -> Self {
        Self {
            cities: cities.to_vec(),
            customer_types: distinct(rows.iter().map(|r| r.customer_type.as_str())),
            genders: distinct(rows.iter().map(|r| r.gender.as_str())),
        }
    }

    pub fn matches(&self, row: &SaleRecord) -> bool {
        self.cities.contains(&row.city)
            && self.customer_types.contains(&row.customer_type)
            && self.genders.contains(&row.gender)
    }

    pub fn apply<'a>(&self, rows: &'a [SaleRecord]) -> Vec<&'a SaleRecord> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|v| v == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub order_count: usize,
    pub total_sales: u64,
    /// Mean rating to 1 decimal; `None` when no rows match.
    pub avg_rating: Option<f64>,
    /// Mean sale per order to 2 decimals; `None` when no rows match.
    pub avg_per_order: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesBucket {
    pub key: String,
    pub sales: u64,
}

pub fn summarize(rows: &[&SaleRecord]) -> SalesSummary {
    let order_count = rows.len();
    let total_sales: u64 = rows.iter().map(|r| r.sales).sum();
    let (avg_rating, avg_per_order) = if order_count == 0 {
        (None, None)
    } else {
        let rating_sum: f64 = rows.iter().map(|r| r.rating).sum();
        (
            Some(round_to(rating_sum / order_count as f64, 1)),
            Some(round_to(total_sales as f64 / order_count as f64, 2)),
        )
    };

    SalesSummary {
        order_count,
        total_sales,
        avg_rating,
        avg_per_order,
    }
}

/// Total sales per hour of day, in hour order. Hours without sales are omitted.
pub fn sales_by_hour(rows: &[&SaleRecord]) -> Vec<SalesBucket> {
    let mut totals: BTreeMap<u8, u64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.hour).or_default() += row.sales;
    }
    totals
        .into_iter()
        .map(|(hour, sales)| SalesBucket {
            key: hour.to_string(),
            sales,
        })
        .collect()
}

/// Total sales per product type, largest first; ties break by name.
pub fn sales_by_product(rows: &[&SaleRecord]) -> Vec<SalesBucket> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.product_type.as_str()).or_default() += row.sales;
    }
    let mut buckets: Vec<SalesBucket> = totals
        .into_iter()
        .map(|(product, sales)| SalesBucket {
            key: product.to_string(),
            sales,
        })
        .collect();
    buckets.sort_by(|a, b| b.sales.cmp(&a.sales));
    buckets
}
