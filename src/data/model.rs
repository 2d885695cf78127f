use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::data::loader::COL_PAYLOAD_MASS;
use crate::error::DataLoadError;

/// The payload slider always reaches at least this far, even for datasets
/// whose heaviest payload is lighter.
pub const SLIDER_MIN_CEILING_KG: f64 = 10_000.0;

/// Payload slider granularity.
pub const SLIDER_STEP_KG: f64 = 100.0;

// ---------------------------------------------------------------------------
// Outcome – the binary `class` column
// ---------------------------------------------------------------------------

/// Mission result as encoded in the `class` column (1 = success, 0 = failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Outcome {
    Failure,
    Success,
}

impl Outcome {
    /// Parse a `class` cell. Accepts integer, float and boolean spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1" | "1.0" | "true" => Some(Outcome::Success),
            "0" | "0.0" | "false" => Some(Outcome::Failure),
            _ => None,
        }
    }

    /// Numeric class value, used as the scatter y coordinate.
    pub fn class_value(self) -> f64 {
        match self {
            Outcome::Failure => 0.0,
            Outcome::Success => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Failure => "Failure",
            Outcome::Success => "Success",
        }
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// LaunchRecord – one row of the launch table
// ---------------------------------------------------------------------------

/// A single launch (one row of the source table).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchRecord {
    pub launch_site: String,
    /// Always finite and non-negative.
    pub payload_mass_kg: f64,
    pub outcome: Outcome,
    /// Only used to colour scatter markers.
    pub booster_version_category: String,
}

impl LaunchRecord {
    pub fn new(
        launch_site: impl Into<String>,
        payload_mass_kg: f64,
        outcome: Outcome,
        booster_version_category: impl Into<String>,
    ) -> Self {
        Self {
            launch_site: launch_site.into(),
            payload_mass_kg,
            outcome,
            booster_version_category: booster_version_category.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PayloadBounds
// ---------------------------------------------------------------------------

/// Min / max payload over the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayloadBounds {
    pub min: f64,
    pub max: f64,
}

impl PayloadBounds {
    /// Upper end of the payload slider: the dataset maximum, with headroom.
    pub fn slider_max(&self) -> f64 {
        self.max.max(SLIDER_MIN_CEILING_KG)
    }
}

// ---------------------------------------------------------------------------
// LaunchDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Immutable once built; every view is derived
/// from it by the pure functions in [`crate::data::filter`].
#[derive(Debug, Clone)]
pub struct LaunchDataset {
    records: Vec<LaunchRecord>,
    /// Distinct launch sites in first-seen order.
    sites: Vec<String>,
    booster_categories: BTreeSet<String>,
    bounds: PayloadBounds,
}

impl LaunchDataset {
    /// Build the dataset and its indices. Fails when `records` is empty,
    /// since payload bounds are undefined then, or when a payload is
    /// negative or not finite. Record numbers in errors are 1-based.
    pub fn from_records(records: Vec<LaunchRecord>) -> Result<Self, DataLoadError> {
        let first = records.first().ok_or(DataLoadError::EmptyDataset)?;
        let mut bounds = PayloadBounds {
            min: first.payload_mass_kg,
            max: first.payload_mass_kg,
        };
        let mut sites: Vec<String> = Vec::new();
        let mut booster_categories = BTreeSet::new();

        for (idx, rec) in records.iter().enumerate() {
            let payload = rec.payload_mass_kg;
            if !payload.is_finite() || payload < 0.0 {
                return Err(DataLoadError::InvalidValue {
                    record: idx + 1,
                    column: COL_PAYLOAD_MASS,
                    value: payload.to_string(),
                });
            }
            bounds.min = bounds.min.min(payload);
            bounds.max = bounds.max.max(payload);
            if !sites.contains(&rec.launch_site) {
                sites.push(rec.launch_site.clone());
            }
            booster_categories.insert(rec.booster_version_category.clone());
        }

        Ok(LaunchDataset {
            records,
            sites,
            booster_categories,
            bounds,
        })
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn sites(&self) -> &[String] {
        &self.sites
    }

    pub fn has_site(&self, site: &str) -> bool {
        self.sites.iter().any(|s| s == site)
    }

    pub fn booster_categories(&self) -> &BTreeSet<String> {
        &self.booster_categories
    }

    pub fn bounds(&self) -> PayloadBounds {
        self.bounds
    }

    /// Number of launches.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a successfully built dataset.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::from_dataset(self)
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteSummary {
    pub site: String,
    pub launches: usize,
    pub successes: usize,
}

impl SiteSummary {
    pub fn success_rate(&self) -> f64 {
        ratio(self.successes, self.launches)
    }
}

/// Headline numbers shown next to the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub launches: usize,
    pub successes: usize,
    pub failures: usize,
    pub bounds: PayloadBounds,
    /// Same order as [`LaunchDataset::sites`].
    pub per_site: Vec<SiteSummary>,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &LaunchDataset) -> Self {
        let mut per_site: Vec<SiteSummary> = dataset
            .sites()
            .iter()
            .map(|site| SiteSummary {
                site: site.clone(),
                launches: 0,
                successes: 0,
            })
            .collect();

        for rec in dataset.records() {
            if let Some(entry) = per_site.iter_mut().find(|s| s.site == rec.launch_site) {
                entry.launches += 1;
                if rec.outcome.is_success() {
                    entry.successes += 1;
                }
            }
        }

        let successes = per_site.iter().map(|s| s.successes).sum();
        DatasetSummary {
            launches: dataset.len(),
            successes,
            failures: dataset.len() - successes,
            bounds: dataset.bounds(),
            per_site,
        }
    }

    pub fn success_rate(&self) -> f64 {
        ratio(self.successes, self.launches)
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LaunchDataset {
        LaunchDataset::from_records(vec![
            LaunchRecord::new("SiteA", 500.0, Outcome::Success, "v1.0"),
            LaunchRecord::new("SiteA", 900.0, Outcome::Failure, "v1.0"),
            LaunchRecord::new("SiteB", 500.0, Outcome::Success, "v1.1"),
            LaunchRecord::new("SiteC", 12_500.0, Outcome::Failure, "FT"),
        ])
        .unwrap()
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let err = LaunchDataset::from_records(Vec::new()).unwrap_err();
        assert!(matches!(err, DataLoadError::EmptyDataset));
    }

    #[test]
    fn bad_payloads_are_rejected() {
        let err = LaunchDataset::from_records(vec![
            LaunchRecord::new("SiteA", 500.0, Outcome::Success, "v1.0"),
            LaunchRecord::new("SiteA", -5.0, Outcome::Failure, "v1.0"),
        ])
        .unwrap_err();
        match err {
            DataLoadError::InvalidValue { record, column, value } => {
                assert_eq!(record, 2);
                assert_eq!(column, "Payload Mass (kg)");
                assert_eq!(value, "-5");
            }
            other => panic!("unexpected error: {other}"),
        }

        // NaN would otherwise vanish from the min/max bounds.
        let err = LaunchDataset::from_records(vec![
            LaunchRecord::new("SiteA", f64::NAN, Outcome::Success, "v1.0"),
            LaunchRecord::new("SiteB", 500.0, Outcome::Success, "v1.1"),
        ])
        .unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { record: 1, ref value, .. } if value == "NaN"));

        let err = LaunchDataset::from_records(vec![LaunchRecord::new(
            "SiteA",
            f64::INFINITY,
            Outcome::Success,
            "v1.0",
        )])
        .unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { record: 1, .. }));
    }

    #[test]
    fn zero_payload_is_valid() {
        let ds = LaunchDataset::from_records(vec![LaunchRecord::new(
            "SiteA",
            0.0,
            Outcome::Failure,
            "v1.0",
        )])
        .unwrap();
        assert_eq!(ds.bounds(), PayloadBounds { min: 0.0, max: 0.0 });
    }

    #[test]
    fn bounds_and_sites_follow_records() {
        let ds = sample();
        assert_eq!(ds.bounds(), PayloadBounds { min: 500.0, max: 12_500.0 });
        assert_eq!(ds.sites(), ["SiteA", "SiteB", "SiteC"]);
        assert!(ds.has_site("SiteB"));
        assert!(!ds.has_site("SiteD"));
        assert_eq!(ds.booster_categories().len(), 3);
    }

    #[test]
    fn slider_max_keeps_headroom() {
        let light = PayloadBounds { min: 0.0, max: 9_600.0 };
        assert_eq!(light.slider_max(), SLIDER_MIN_CEILING_KG);
        let heavy = PayloadBounds { min: 0.0, max: 15_600.0 };
        assert_eq!(heavy.slider_max(), 15_600.0);
    }

    #[test]
    fn summary_counts() {
        let summary = sample().summary();
        assert_eq!(summary.launches, 4);
        assert_eq!(summary.successes, 2);
        assert_eq!(summary.failures, 2);
        assert!((summary.success_rate() - 0.5).abs() < 1e-12);

        let site_a = &summary.per_site[0];
        assert_eq!(site_a.site, "SiteA");
        assert_eq!((site_a.launches, site_a.successes), (2, 1));
        assert_eq!(summary.per_site[2].success_rate(), 0.0);
    }

    #[test]
    fn outcome_parsing() {
        assert_eq!(Outcome::parse("1"), Some(Outcome::Success));
        assert_eq!(Outcome::parse(" 0.0 "), Some(Outcome::Failure));
        assert_eq!(Outcome::parse("true"), Some(Outcome::Success));
        assert_eq!(Outcome::parse("2"), None);
        assert_eq!(Outcome::parse(""), None);
    }
}
