//! Launch settings.
//!
//! Everything is taken from the command line, with the data path also
//! readable from `LAUNCH_DASH_DATA`. Nothing in the data layer reads these
//! directly; `main` hands the parsed values down.

use std::path::PathBuf;

use clap::Parser;

use crate::data::filter::SiteSelection;

/// Default launch table, looked up relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "spacex_launch_dash.csv";

/// launch-dash - launch records dashboard
///
/// Shows successful launches per site (or success vs failure for one site)
/// and payload mass against mission outcome.
#[derive(Debug, Clone, Parser)]
#[command(name = "launch-dash")]
#[command(author, version, about, long_about = None)]
pub struct Settings {
    /// Launch table to load (.csv, .tsv or .parquet)
    #[arg(short, long, value_name = "FILE", env = "LAUNCH_DASH_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// Initially selected launch site, or ALL
    #[arg(short, long, default_value = SiteSelection::ALL_TOKEN)]
    pub site: String,

    /// Initial window width in points
    #[arg(long, default_value_t = 1200.0)]
    pub width: f32,

    /// Initial window height in points
    #[arg(long, default_value_t = 900.0)]
    pub height: f32,
}

impl Settings {
    pub fn initial_site(&self) -> SiteSelection {
        SiteSelection::parse(&self.site)
    }
}
