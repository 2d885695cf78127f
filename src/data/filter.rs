use serde::Serialize;

use super::model::{LaunchDataset, Outcome, PayloadBounds};
use crate::error::SelectionError;

// ---------------------------------------------------------------------------
// Filter selection: what the user picked in the controls
// ---------------------------------------------------------------------------

/// Site dropdown value: every site, or exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SiteSelection {
    #[default]
    All,
    Site(String),
}

impl SiteSelection {
    /// Token used on the command line for "all sites".
    pub const ALL_TOKEN: &'static str = "ALL";

    pub fn parse(s: &str) -> Self {
        match s.trim() {
            Self::ALL_TOKEN => SiteSelection::All,
            site => SiteSelection::Site(site.to_string()),
        }
    }

    pub fn matches(&self, site: &str) -> bool {
        match self {
            SiteSelection::All => true,
            SiteSelection::Site(s) => s == site,
        }
    }

    /// Human-readable label for dropdowns and titles.
    pub fn label(&self) -> &str {
        match self {
            SiteSelection::All => "All Sites",
            SiteSelection::Site(s) => s,
        }
    }
}

/// Closed payload interval `[low, high]` in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayloadRange {
    pub low: f64,
    pub high: f64,
}

impl PayloadRange {
    pub fn new(low: f64, high: f64) -> Result<Self, SelectionError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(SelectionError::NonFiniteBound);
        }
        if low > high {
            return Err(SelectionError::InvertedRange { low, high });
        }
        Ok(PayloadRange { low, high })
    }

    /// The range covering every payload in the dataset.
    pub fn full(bounds: PayloadBounds) -> Self {
        PayloadRange {
            low: bounds.min,
            high: bounds.max,
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, kg: f64) -> bool {
        self.low <= kg && kg <= self.high
    }
}

/// The complete set of user choices driving both charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSelection {
    pub site: SiteSelection,
    pub payload_range: PayloadRange,
}

impl FilterSelection {
    /// All sites, whole payload span.
    pub fn initial(dataset: &LaunchDataset) -> Self {
        FilterSelection {
            site: SiteSelection::All,
            payload_range: PayloadRange::full(dataset.bounds()),
        }
    }

    /// Check the selection against the dataset.
    ///
    /// Inverted or non-finite ranges and unknown sites are rejected. Bounds
    /// outside `[0, slider_max]` are clamped into it.
    pub fn validate(&self, dataset: &LaunchDataset) -> Result<FilterSelection, SelectionError> {
        let range = PayloadRange::new(self.payload_range.low, self.payload_range.high)?;

        if let SiteSelection::Site(site) = &self.site {
            if !dataset.has_site(site) {
                return Err(SelectionError::UnknownSite(site.clone()));
            }
        }

        let ceiling = dataset.bounds().slider_max();
        Ok(FilterSelection {
            site: self.site.clone(),
            payload_range: PayloadRange {
                low: range.low.clamp(0.0, ceiling),
                high: range.high.clamp(0.0, ceiling),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Pie aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
}

/// Counts feeding the pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PieViewModel {
    /// Successful launches per site. Sites without a success are absent.
    Sites(Vec<PieSlice>),
    /// Success / failure split for one site.
    Outcomes { site: String, slices: Vec<PieSlice> },
}

impl PieViewModel {
    pub fn slices(&self) -> &[PieSlice] {
        match self {
            PieViewModel::Sites(slices) | PieViewModel::Outcomes { slices, .. } => slices,
        }
    }

    pub fn total(&self) -> usize {
        self.slices().iter().map(|s| s.count).sum()
    }
}

/// Count occurrences of each key, keeping first-seen key order.
fn count_first_seen<K: PartialEq>(keys: impl Iterator<Item = K>) -> Vec<(K, usize)> {
    let mut groups: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => groups.push((key, 1)),
        }
    }
    groups
}

/// Group the dataset for the pie chart.
///
/// * `All` – successes only, grouped by site.
/// * `Site(s)` – every launch from `s`, grouped by outcome.
pub fn aggregate_for_pie(dataset: &LaunchDataset, site: &SiteSelection) -> PieViewModel {
    match site {
        SiteSelection::All => {
            let groups = count_first_seen(
                dataset
                    .records()
                    .iter()
                    .filter(|r| r.outcome.is_success())
                    .map(|r| r.launch_site.as_str()),
            );
            PieViewModel::Sites(
                groups
                    .into_iter()
                    .map(|(site, count)| PieSlice {
                        label: site.to_string(),
                        count,
                    })
                    .collect(),
            )
        }
        SiteSelection::Site(name) => {
            let groups = count_first_seen(
                dataset
                    .records()
                    .iter()
                    .filter(|r| r.launch_site == *name)
                    .map(|r| r.outcome),
            );
            PieViewModel::Outcomes {
                site: name.clone(),
                slices: groups
                    .into_iter()
                    .map(|(outcome, count)| PieSlice {
                        label: outcome.label().to_string(),
                        count,
                    })
                    .collect(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scatter filtering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub payload_mass_kg: f64,
    pub outcome: Outcome,
    pub booster_version_category: String,
}

/// Points for the payload / outcome scatter, in dataset order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScatterViewModel {
    pub points: Vec<ScatterPoint>,
}

impl ScatterViewModel {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Keep launches whose payload lies in `range` and whose site matches.
pub fn filter_for_scatter(
    dataset: &LaunchDataset,
    site: &SiteSelection,
    range: PayloadRange,
) -> ScatterViewModel {
    let points = dataset
        .records()
        .iter()
        .filter(|r| range.contains(r.payload_mass_kg) && site.matches(&r.launch_site))
        .map(|r| ScatterPoint {
            payload_mass_kg: r.payload_mass_kg,
            outcome: r.outcome,
            booster_version_category: r.booster_version_category.clone(),
        })
        .collect();
    ScatterViewModel { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::LaunchRecord;

    fn three_launches() -> LaunchDataset {
        LaunchDataset::from_records(vec![
            LaunchRecord::new("SiteA", 500.0, Outcome::Success, "v1.0"),
            LaunchRecord::new("SiteA", 900.0, Outcome::Failure, "v1.0"),
            LaunchRecord::new("SiteB", 500.0, Outcome::Success, "v1.1"),
        ])
        .unwrap()
    }

    /// Four sites, one of which never succeeds.
    fn mixed_launches() -> LaunchDataset {
        LaunchDataset::from_records(vec![
            LaunchRecord::new("CCAFS LC-40", 0.0, Outcome::Failure, "v1.0"),
            LaunchRecord::new("VAFB SLC-4E", 500.0, Outcome::Failure, "v1.1"),
            LaunchRecord::new("KSC LC-39A", 2490.0, Outcome::Success, "FT"),
            LaunchRecord::new("CCAFS LC-40", 5300.0, Outcome::Success, "FT"),
            LaunchRecord::new("KSC LC-39A", 9600.0, Outcome::Success, "B4"),
            LaunchRecord::new("CCAFS SLC-40", 3600.0, Outcome::Failure, "B4"),
            LaunchRecord::new("CCAFS LC-40", 3170.0, Outcome::Failure, "v1.1"),
            LaunchRecord::new("KSC LC-39A", 3600.0, Outcome::Failure, "B5"),
        ])
        .unwrap()
    }

    fn slice(label: &str, count: usize) -> PieSlice {
        PieSlice {
            label: label.into(),
            count,
        }
    }

    fn range(low: f64, high: f64) -> PayloadRange {
        PayloadRange::new(low, high).unwrap()
    }

    #[test]
    fn all_sites_pie_counts_successes_per_site() {
        let pie = aggregate_for_pie(&three_launches(), &SiteSelection::All);
        assert_eq!(
            pie,
            PieViewModel::Sites(vec![slice("SiteA", 1), slice("SiteB", 1)])
        );
    }

    #[test]
    fn single_site_pie_splits_outcomes() {
        let pie = aggregate_for_pie(&three_launches(), &SiteSelection::Site("SiteA".into()));
        assert_eq!(
            pie,
            PieViewModel::Outcomes {
                site: "SiteA".into(),
                slices: vec![slice("Success", 1), slice("Failure", 1)],
            }
        );
    }

    #[test]
    fn single_outcome_site_has_one_slice() {
        let pie = aggregate_for_pie(&three_launches(), &SiteSelection::Site("SiteB".into()));
        assert_eq!(pie.slices(), [slice("Success", 1)]);
    }

    #[test]
    fn sites_without_successes_are_omitted() {
        let ds = mixed_launches();
        let pie = aggregate_for_pie(&ds, &SiteSelection::All);
        let labels: Vec<&str> = pie.slices().iter().map(|s| s.label.as_str()).collect();
        // First success seen is KSC, then CCAFS LC-40; no zero slices.
        assert_eq!(labels, ["KSC LC-39A", "CCAFS LC-40"]);
        assert!(pie.slices().iter().all(|s| s.count > 0));
    }

    #[test]
    fn outcome_groups_follow_first_seen_order() {
        let ds = mixed_launches();
        let pie = aggregate_for_pie(&ds, &SiteSelection::Site("CCAFS LC-40".into()));
        assert_eq!(pie.slices(), [slice("Failure", 2), slice("Success", 1)]);
    }

    #[test]
    fn pie_totals_match_record_counts() {
        let ds = mixed_launches();
        let successes = ds.records().iter().filter(|r| r.outcome.is_success()).count();
        assert_eq!(aggregate_for_pie(&ds, &SiteSelection::All).total(), successes);

        for site in ds.sites() {
            let expected = ds.records().iter().filter(|r| &r.launch_site == site).count();
            let pie = aggregate_for_pie(&ds, &SiteSelection::Site(site.clone()));
            assert_eq!(pie.total(), expected, "site {site}");
        }
    }

    #[test]
    fn scatter_filters_inclusive_range() {
        let ds = three_launches();
        let scatter = filter_for_scatter(&ds, &SiteSelection::All, range(0.0, 600.0));
        let got: Vec<(f64, Outcome, &str)> = scatter
            .points
            .iter()
            .map(|p| (p.payload_mass_kg, p.outcome, p.booster_version_category.as_str()))
            .collect();
        assert_eq!(
            got,
            [(500.0, Outcome::Success, "v1.0"), (500.0, Outcome::Success, "v1.1")]
        );
    }

    #[test]
    fn scatter_filters_by_site() {
        let ds = three_launches();
        let scatter = filter_for_scatter(&ds, &SiteSelection::Site("SiteB".into()), range(0.0, 1000.0));
        assert_eq!(
            scatter.points,
            [ScatterPoint {
                payload_mass_kg: 500.0,
                outcome: Outcome::Success,
                booster_version_category: "v1.1".into(),
            }]
        );
    }

    #[test]
    fn scatter_degenerate_range() {
        let ds = mixed_launches();
        let exact = filter_for_scatter(&ds, &SiteSelection::All, range(3600.0, 3600.0));
        assert_eq!(exact.len(), 2);
        let none = filter_for_scatter(&ds, &SiteSelection::All, range(3601.0, 3601.0));
        assert!(none.is_empty());
    }

    #[test]
    fn scatter_points_satisfy_filters() {
        let ds = mixed_launches();
        let site = SiteSelection::Site("KSC LC-39A".into());
        let r = range(1000.0, 5000.0);
        let scatter = filter_for_scatter(&ds, &site, r);
        assert_eq!(scatter.len(), 2);
        for p in &scatter.points {
            assert!(r.contains(p.payload_mass_kg));
        }
    }

    #[test]
    fn full_range_keeps_everything() {
        let ds = mixed_launches();
        let all = filter_for_scatter(&ds, &SiteSelection::All, PayloadRange::full(ds.bounds()));
        assert_eq!(all.len(), ds.len());
        let payloads: Vec<f64> = all.points.iter().map(|p| p.payload_mass_kg).collect();
        let expected: Vec<f64> = ds.records().iter().map(|r| r.payload_mass_kg).collect();
        assert_eq!(payloads, expected);
    }

    #[test]
    fn aggregation_is_repeatable() {
        let ds = mixed_launches();
        let site = SiteSelection::Site("CCAFS LC-40".into());
        assert_eq!(aggregate_for_pie(&ds, &site), aggregate_for_pie(&ds, &site));
        let r = range(100.0, 4000.0);
        assert_eq!(filter_for_scatter(&ds, &site, r), filter_for_scatter(&ds, &site, r));
    }

    #[test]
    fn selection_validation() {
        let ds = mixed_launches();

        let inverted = FilterSelection {
            site: SiteSelection::All,
            payload_range: PayloadRange { low: 900.0, high: 100.0 },
        };
        assert_eq!(
            inverted.validate(&ds),
            Err(SelectionError::InvertedRange { low: 900.0, high: 100.0 })
        );

        let unknown = FilterSelection {
            site: SiteSelection::Site("LC-99".into()),
            payload_range: PayloadRange::full(ds.bounds()),
        };
        assert_eq!(
            unknown.validate(&ds),
            Err(SelectionError::UnknownSite("LC-99".into()))
        );

        let nan = FilterSelection {
            site: SiteSelection::All,
            payload_range: PayloadRange { low: f64::NAN, high: 10.0 },
        };
        assert_eq!(nan.validate(&ds), Err(SelectionError::NonFiniteBound));

        let wide = FilterSelection {
            site: SiteSelection::All,
            payload_range: PayloadRange { low: -50.0, high: 50_000.0 },
        };
        let clamped = wide.validate(&ds).unwrap();
        assert_eq!(clamped.payload_range, PayloadRange { low: 0.0, high: 10_000.0 });
    }

    #[test]
    fn site_selection_parsing() {
        assert_eq!(SiteSelection::parse("ALL"), SiteSelection::All);
        assert_eq!(
            SiteSelection::parse(" KSC LC-39A "),
            SiteSelection::Site("KSC LC-39A".into())
        );
        assert_eq!(SiteSelection::All.label(), "All Sites");
        assert!(SiteSelection::All.matches("anything"));
        assert!(!SiteSelection::Site("A".into()).matches("B"));
    }
}
