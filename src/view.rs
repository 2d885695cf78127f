use serde::Serialize;

use crate::data::filter::{
    aggregate_for_pie, filter_for_scatter, FilterSelection, PieViewModel, ScatterViewModel,
    SiteSelection,
};
use crate::data::loader::COL_BOOSTER_CATEGORY;
use crate::data::model::{DatasetSummary, LaunchDataset, Outcome};
use crate::error::SelectionError;

pub const SCATTER_X_LABEL: &str = "Payload Mass (kg)";
pub const SCATTER_Y_LABEL: &str = "Mission Outcome (0 = Failure, 1 = Success)";

// ---------------------------------------------------------------------------
// Chart specifications: data plus presentation intent, no styling
// ---------------------------------------------------------------------------

/// Which slice colours the renderer should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlicePalette {
    /// One shade per site from a sequential blue ramp.
    SequentialBlues,
    /// Fixed success / failure colours.
    Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChartSpec {
    pub title: String,
    /// Donut hole as a fraction of the radius.
    pub hole: f32,
    pub palette: SlicePalette,
    pub model: PieViewModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisTick {
    pub value: f64,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChartSpec {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// The y axis only ever shows the two outcome values.
    pub y_ticks: [AxisTick; 2],
    /// Dashed separator between failures and successes.
    pub reference_line_y: f64,
    /// Column bound to marker colour.
    pub color_by: &'static str,
    pub model: ScatterViewModel,
}

/// Everything the presentation layer needs for one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: FilterSelection,
    pub pie: PieChartSpec,
    pub scatter: ScatterChartSpec,
}

pub fn pie_chart(dataset: &LaunchDataset, site: &SiteSelection) -> PieChartSpec {
    let model = aggregate_for_pie(dataset, site);
    match site {
        SiteSelection::All => PieChartSpec {
            title: "Successful Launches by Site (All Sites)".to_string(),
            hole: 0.35,
            palette: SlicePalette::SequentialBlues,
            model,
        },
        SiteSelection::Site(name) => PieChartSpec {
            title: format!("Success vs Failure - {name}"),
            hole: 0.4,
            palette: SlicePalette::Outcome,
            model,
        },
    }
}

pub fn scatter_chart(dataset: &LaunchDataset, selection: &FilterSelection) -> ScatterChartSpec {
    let title = match &selection.site {
        SiteSelection::All => "Payload vs Mission Outcome".to_string(),
        SiteSelection::Site(name) => format!("Payload vs Mission Outcome - {name}"),
    };
    let midpoint = (Outcome::Failure.class_value() + Outcome::Success.class_value()) / 2.0;

    ScatterChartSpec {
        title,
        x_label: SCATTER_X_LABEL,
        y_label: SCATTER_Y_LABEL,
        y_ticks: [Outcome::Failure, Outcome::Success].map(|o| AxisTick {
            value: o.class_value(),
            label: o.label(),
        }),
        reference_line_y: midpoint,
        color_by: COL_BOOSTER_CATEGORY,
        model: filter_for_scatter(dataset, &selection.site, selection.payload_range),
    }
}

/// Build both charts from scratch. Pure: same inputs, same output.
pub fn build_view(dataset: &LaunchDataset, selection: &FilterSelection) -> DashboardView {
    DashboardView {
        selection: selection.clone(),
        pie: pie_chart(dataset, &selection.site),
        scatter: scatter_chart(dataset, selection),
    }
}

// ---------------------------------------------------------------------------
// Dashboard: the explicit entry point a UI host calls on every change
// ---------------------------------------------------------------------------

/// An immutable dataset plus the last valid view derived from it.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: LaunchDataset,
    summary: DatasetSummary,
    view: DashboardView,
}

impl Dashboard {
    /// Start with all sites and the full payload span.
    pub fn new(dataset: LaunchDataset) -> Self {
        let selection = FilterSelection::initial(&dataset);
        let view = build_view(&dataset, &selection);
        Dashboard {
            summary: dataset.summary(),
            dataset,
            view,
        }
    }

    pub fn dataset(&self) -> &LaunchDataset {
        &self.dataset
    }

    pub fn summary(&self) -> &DatasetSummary {
        &self.summary
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.view.selection
    }

    /// Recompute the charts for a new selection.
    ///
    /// The pie only depends on the site, so it is rebuilt only when the site
    /// changes; the scatter is rebuilt every time. On error the previous
    /// view is kept untouched.
    pub fn on_selection_changed(
        &mut self,
        selection: FilterSelection,
    ) -> Result<&DashboardView, SelectionError> {
        let selection = match selection.validate(&self.dataset) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Rejected selection {selection:?}: {e}");
                return Err(e);
            }
        };

        if selection.site != self.view.selection.site {
            self.view.pie = pie_chart(&self.dataset, &selection.site);
        }
        self.view.scatter = scatter_chart(&self.dataset, &selection);
        self.view.selection = selection;

        log::debug!(
            "Recomputed view for {} [{}, {}] kg: {} pie slices, {} scatter points",
            self.view.selection.site.label(),
            self.view.selection.payload_range.low,
            self.view.selection.payload_range.high,
            self.view.pie.model.slices().len(),
            self.view.scatter.model.len()
        );
        Ok(&self.view)
    }
}
