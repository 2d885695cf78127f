use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::data::filter::{FilterSelection, PayloadRange, SiteSelection};
use crate::data::loader::load_file;
use crate::data::model::LaunchDataset;
use crate::view::{Dashboard, DashboardView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Dataset plus the last valid view (None only if nothing loaded yet).
    pub dashboard: Option<Dashboard>,

    /// Booster category colours for the current dataset.
    pub color_map: Option<ColorMap>,

    /// Where the current dataset came from.
    pub data_path: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dashboard: Dashboard, data_path: PathBuf) -> Self {
        let mut state = AppState::default();
        state.install(dashboard, data_path);
        state
    }

    /// Start on the selection given at launch. A selection the dataset
    /// cannot satisfy falls back to all sites and the status line says why.
    pub fn with_initial_selection(
        dataset: LaunchDataset,
        selection: FilterSelection,
        data_path: PathBuf,
    ) -> Self {
        let mut state = AppState::new(Dashboard::new(dataset), data_path);
        state.apply_selection(selection);
        state
    }

    fn install(&mut self, dashboard: Dashboard, data_path: PathBuf) {
        self.color_map = Some(ColorMap::new(dashboard.dataset().booster_categories()));
        self.dashboard = Some(dashboard);
        self.data_path = Some(data_path);
        self.status_message = None;
    }

    /// Ingest a newly loaded dataset with a fresh, unfiltered view.
    pub fn set_dataset(&mut self, dataset: LaunchDataset, data_path: PathBuf) {
        self.install(Dashboard::new(dataset), data_path);
    }

    /// Load another table at runtime. Failure keeps the current dashboard.
    pub fn open_file(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => self.set_dataset(dataset, path.to_path_buf()),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn view(&self) -> Option<&DashboardView> {
        self.dashboard.as_ref().map(Dashboard::view)
    }

    /// Push a new selection through the dashboard. A rejected selection
    /// leaves the previous charts in place and reports why.
    pub fn apply_selection(&mut self, selection: FilterSelection) {
        let Some(dashboard) = self.dashboard.as_mut() else {
            return;
        };
        match dashboard.on_selection_changed(selection) {
            Ok(_) => self.status_message = None,
            Err(e) => self.status_message = Some(format!("Selection ignored: {e}")),
        }
    }

    pub fn select_site(&mut self, site: SiteSelection) {
        if let Some(current) = self.dashboard.as_ref().map(|d| d.selection().clone()) {
            self.apply_selection(FilterSelection { site, ..current });
        }
    }

    pub fn set_payload_range(&mut self, low: f64, high: f64) {
        if let Some(current) = self.dashboard.as_ref().map(|d| d.selection().clone()) {
            self.apply_selection(FilterSelection {
                payload_range: PayloadRange { low, high },
                ..current
            });
        }
    }

    /// Reset both controls to their initial values.
    pub fn reset_selection(&mut self) {
        if let Some(initial) = self
            .dashboard
            .as_ref()
            .map(|d| FilterSelection::initial(d.dataset()))
        {
            self.apply_selection(initial);
        }
    }

    /// Write the current view models as pretty-printed JSON.
    pub fn export_view(&self, path: &Path) -> Result<()> {
        let view = self.view().context("no dataset loaded")?;
        let file = File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, view).context("writing view JSON")?;
        writer.flush().context("flushing view JSON")?;
        log::info!("Exported current view to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{LaunchRecord, Outcome};

    fn dataset() -> LaunchDataset {
        LaunchDataset::from_records(vec![
            LaunchRecord::new("SiteA", 500.0, Outcome::Success, "v1.0"),
            LaunchRecord::new("SiteA", 900.0, Outcome::Failure, "v1.0"),
            LaunchRecord::new("SiteB", 500.0, Outcome::Success, "v1.1"),
        ])
        .unwrap()
    }

    fn state() -> AppState {
        AppState::new(Dashboard::new(dataset()), PathBuf::from("launches.csv"))
    }

    fn startup(site: &str) -> AppState {
        let ds = dataset();
        let selection = FilterSelection {
            site: SiteSelection::parse(site),
            payload_range: PayloadRange::full(ds.bounds()),
        };
        AppState::with_initial_selection(ds, selection, PathBuf::from("launches.csv"))
    }

    #[test]
    fn startup_site_is_applied() {
        let st = startup("SiteB");
        let view = st.view().unwrap();
        assert_eq!(view.pie.title, "Success vs Failure - SiteB");
        assert_eq!(view.scatter.model.len(), 1);
        assert!(st.status_message.is_none());
    }

    #[test]
    fn unknown_startup_site_falls_back_to_all_sites() {
        let st = startup("SiteZ");
        let view = st.view().unwrap();
        assert_eq!(view.selection.site, SiteSelection::All);
        assert_eq!(view.scatter.model.len(), 3);
        assert_eq!(view.pie.title, "Successful Launches by Site (All Sites)");
        let msg = st.status_message.as_deref().unwrap();
        assert!(msg.starts_with("Selection ignored"));
        assert!(msg.contains("SiteZ"));
    }

    #[test]
    fn site_change_keeps_payload_range() {
        let mut st = state();
        st.set_payload_range(0.0, 600.0);
        st.select_site(SiteSelection::Site("SiteB".into()));

        let view = st.view().unwrap();
        assert_eq!(view.selection.payload_range, PayloadRange { low: 0.0, high: 600.0 });
        assert_eq!(view.scatter.model.len(), 1);
        assert!(st.status_message.is_none());
    }

    #[test]
    fn bad_range_reports_and_keeps_view() {
        let mut st = state();
        let before = st.view().unwrap().clone();
        st.set_payload_range(700.0, 100.0);
        assert_eq!(st.view().unwrap(), &before);
        assert!(st
            .status_message
            .as_deref()
            .unwrap()
            .starts_with("Selection ignored"));
    }

    #[test]
    fn reset_restores_initial_selection() {
        let mut st = state();
        st.select_site(SiteSelection::Site("SiteA".into()));
        st.reset_selection();
        let view = st.view().unwrap();
        assert_eq!(view.selection.site, SiteSelection::All);
        assert_eq!(view.scatter.model.len(), 3);
    }

    #[test]
    fn failed_open_keeps_dashboard() {
        let mut st = state();
        st.open_file(Path::new("/no/such/dir/launches.csv"));
        assert!(st.dashboard.is_some());
        assert_eq!(st.data_path.as_deref(), Some(Path::new("launches.csv")));
        assert!(st.status_message.as_deref().unwrap().starts_with("Error"));
    }

    #[test]
    fn export_writes_json() {
        let st = state();
        let path = std::env::temp_dir().join(format!(
            "launch-dash-export-{}.json",
            std::process::id()
        ));
        st.export_view(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["pie"]["title"], "Successful Launches by Site (All Sites)");
    }
}
