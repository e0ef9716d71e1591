use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use crate::config::AssetConfig;
use crate::error::AssetWarning;
use crate::models::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdviceEntry {
    pub tier: Tier,
    pub label: &'static str,
    pub guidance: &'static str,
    pub encouragement: &'static str,
    pub asset_key: &'static str,
}

/// One entry per tier, best first.
pub static ADVICE: [AdviceEntry; 4] = [
    AdviceEntry {
        tier: Tier::Excellent,
        label: "Excellent",
        guidance: "Keep the current pace. Take on competitions or research projects to \
                   stretch further, and focus on the advanced topics.",
        encouragement: "Great work, keep it up!",
        asset_key: "excellent",
    },
    AdviceEntry {
        tier: Tier::Good,
        label: "Good",
        guidance: "Review the questions missed at midterm and drill the weak topics. \
                   Adding 2-3 study hours a week puts Excellent within reach.",
        encouragement: "Keep going, Excellent is just ahead!",
        asset_key: "good",
    },
    AdviceEntry {
        tier: Tier::Pass,
        label: "Pass",
        guidance: "Raise attendance above 90% and weekly study time above 20 hours. \
                   Revisit the low-scoring midterm chapters and ask teachers or \
                   classmates about anything unclear.",
        encouragement: "Time to study harder, it's not too late!",
        asset_key: "poor",
    },
    AdviceEntry {
        tier: Tier::Fail,
        label: "At risk of failing",
        guidance: "1. Raise attendance above 95% with no absences or late arrivals. \
                   2. Add two hours of focused study every day. \
                   3. Keep a mistake log and work through each weak point. \
                   4. Ask a teacher for one-to-one tutoring.",
        encouragement: "Time to study harder, it's not too late!",
        asset_key: "poor",
    },
];

pub fn advice_for(tier: Tier) -> &'static AdviceEntry {
    let idx = match tier {
        Tier::Excellent => 0,
        Tier::Good => 1,
        Tier::Pass => 2,
        Tier::Fail => 3,
    };
    &ADVICE[idx]
}

/// Maps asset keys to image files under one directory.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    dir: PathBuf,
    files: BTreeMap<String, String>,
}

impl AssetCatalog {
    pub fn new(dir: impl Into<PathBuf>, files: BTreeMap<String, String>) -> Self {
        Self {
            dir: dir.into(),
            files,
        }
    }

    pub fn from_config(config: &AssetConfig) -> Self {
        Self::new(config.dir.clone(), config.files.clone())
    }

    /// Path of the asset for `key`, or a warning when it cannot be shown.
    pub fn resolve(&self, key: &str) -> Result<PathBuf, AssetWarning> {
        let Some(file) = self.files.get(key) else {
            warn!(key, "No asset configured");
            return Err(AssetWarning {
                key: key.to_string(),
                path: None,
            });
        };

        let path = self.dir.join(file);
        if path.is_file() {
            Ok(path)
        } else {
            warn!(key, path = %path.display(), "Asset missing");
            Err(AssetWarning {
                key: key.to_string(),
                path: Some(path),
            })
        }
    }
}

/// Asset key of the overview page's preview image.
pub const PREVIEW_ASSET: &str = "preview";

/// Advice for one prediction, with the asset lookup already done.
#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    pub entry: AdviceEntry,
    pub asset: Result<PathBuf, AssetWarning>,
}

pub fn advise(tier: Tier, catalog: &AssetCatalog) -> Advice {
    let entry = *advice_for(tier);
    Advice {
        entry,
        asset: catalog.resolve(entry.asset_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssetConfig;

    #[test]
    fn every_tier_has_one_entry() {
        for tier in [Tier::Excellent, Tier::Good, Tier::Pass, Tier::Fail] {
            assert_eq!(ADVICE.iter().filter(|e| e.tier == tier).count(), 1);
            assert_eq!(advice_for(tier).tier, tier);
        }
    }

    #[test]
    fn pass_and_fail_share_the_poor_asset() {
        assert_eq!(advice_for(Tier::Excellent).asset_key, "excellent");
        assert_eq!(advice_for(Tier::Good).asset_key, "good");
        assert_eq!(advice_for(Tier::Pass).asset_key, "poor");
        assert_eq!(advice_for(Tier::Fail).asset_key, "poor");
        assert_ne!(advice_for(Tier::Pass).guidance, advice_for(Tier::Fail).guidance);
    }

    #[test]
    fn resolves_existing_asset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.jpg"), b"jpg").unwrap();
        let files = [("good".to_string(), "good.jpg".to_string())].into();
        let catalog = AssetCatalog::new(dir.path(), files);

        let advice = advise(Tier::Good, &catalog);
        assert_eq!(advice.asset, Ok(dir.path().join("good.jpg")));
    }

    #[test]
    fn missing_asset_degrades_to_warning() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = AssetCatalog::from_config(&AssetConfig {
            dir: dir.path().to_path_buf(),
            ..AssetConfig::default()
        });

        let advice = advise(Tier::Fail, &catalog);
        assert_eq!(advice.entry.tier, Tier::Fail);
        let warning = advice.asset.unwrap_err();
        assert_eq!(warning.key, "poor");
        assert_eq!(warning.path, Some(dir.path().join("要加强学习.jpg")));
    }

    #[test]
    fn unknown_key_is_a_warning() {
        let catalog = AssetCatalog::new("photo", BTreeMap::new());
        let warning = catalog.resolve("excellent").unwrap_err();
        assert!(warning.path.is_none());
    }
}
