use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::platform;
use crate::timeline::cluster;

pub struct Config {
    pub index_path: PathBuf,
    pub cluster_threshold_percent: f64,
    pub max_markers: usize,
    pub click_tolerance_percent: f64,
    pub default_job: Option<String>,
    pub verbose: bool,
}

/// Optional overrides from ~/.config/snaptrail/config.toml. Every field
/// falls back to a built-in default when absent.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    index_path: Option<PathBuf>,
    cluster_threshold_percent: Option<f64>,
    max_markers: Option<usize>,
    click_tolerance_percent: Option<f64>,
    default_job: Option<String>,
}

impl FileConfig {
    fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = path else {
            return Ok(FileConfig::default());
        };

        if !path.exists() {
            return Ok(FileConfig::default());
        }

        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

impl Config {
    /// Merge CLI flags over the config file over built-in defaults.
    pub fn load(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let file = FileConfig::load(platform::config_path().as_deref())?;

        let index_path = match cli.index.clone().or(file.index_path) {
            Some(path) => path,
            None => platform::default_index_path()?,
        };

        Ok(Config {
            index_path,
            cluster_threshold_percent: file
                .cluster_threshold_percent
                .unwrap_or(cluster::CLUSTER_THRESHOLD_PERCENT),
            max_markers: file.max_markers.unwrap_or(cluster::MAX_MARKERS),
            click_tolerance_percent: file
                .click_tolerance_percent
                .unwrap_or(cluster::CLICK_TOLERANCE_PERCENT),
            default_job: file.default_job,
            verbose: cli.verbose,
        })
    }
}
