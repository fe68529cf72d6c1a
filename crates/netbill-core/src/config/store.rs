use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::scenarios::{LoanTerms, ScenarioTrack, ScenarioTracks, ScenarioValue};
use super::schema::{Defaults, TariffTable};
use crate::error::NetbillError;
use crate::time_value::nominal_rate_from_real;
use crate::types::Rate;
use crate::NetbillResult;

pub const DEFAULTS_FILE_NAME: &str = "defaults.yaml";
pub const TARIFFS_FILE_NAME: &str = "tariffs.yaml";
pub const SCENARIOS_FILE_NAME: &str = "scenarios.yaml";

const BUNDLED_DEFAULTS: &str = include_str!("../../data/defaults.yaml");
const BUNDLED_TARIFFS: &str = include_str!("../../data/tariffs.yaml");
const BUNDLED_SCENARIOS: &str = include_str!("../../data/scenarios.yaml");

/// Where a store's data came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Bundled,
    Directory(PathBuf),
}

/// Variant names of one scenario track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSummary {
    pub track: ScenarioTrack,
    pub variants: Vec<String>,
}

/// Immutable configuration snapshot: defaults, tariff tables and scenario
/// tracks. All three datasets are parsed and validated on construction; the
/// store never changes afterwards and can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    defaults: Defaults,
    tariffs: TariffTable,
    scenarios: ScenarioTracks,
    source: ConfigSource,
}

impl ConfigStore {
    /// Store built from the data files compiled into the crate.
    pub fn bundled() -> NetbillResult<Self> {
        Self::build(
            parse_yaml(BUNDLED_DEFAULTS, DEFAULTS_FILE_NAME)?,
            parse_yaml(BUNDLED_TARIFFS, TARIFFS_FILE_NAME)?,
            parse_yaml(BUNDLED_SCENARIOS, SCENARIOS_FILE_NAME)?,
            ConfigSource::Bundled,
        )
    }

    /// Read `defaults.yaml`, `tariffs.yaml` and `scenarios.yaml` from `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> NetbillResult<Self> {
        let dir = dir.as_ref();
        Self::build(
            read_yaml(&dir.join(DEFAULTS_FILE_NAME))?,
            read_yaml(&dir.join(TARIFFS_FILE_NAME))?,
            read_yaml(&dir.join(SCENARIOS_FILE_NAME))?,
            ConfigSource::Directory(dir.to_path_buf()),
        )
    }

    /// Build from in-memory YAML documents.
    pub fn from_yaml(defaults: &str, tariffs: &str, scenarios: &str) -> NetbillResult<Self> {
        Self::build(
            parse_yaml(defaults, DEFAULTS_FILE_NAME)?,
            parse_yaml(tariffs, TARIFFS_FILE_NAME)?,
            parse_yaml(scenarios, SCENARIOS_FILE_NAME)?,
            ConfigSource::Bundled,
        )
    }

    fn build(
        defaults: Defaults,
        tariffs: TariffTable,
        scenarios: ScenarioTracks,
        source: ConfigSource,
    ) -> NetbillResult<Self> {
        defaults.validate().map_err(|r| config_err(DEFAULTS_FILE_NAME, r))?;
        tariffs.validate().map_err(|r| config_err(TARIFFS_FILE_NAME, r))?;
        scenarios
            .validate()
            .map_err(|r| config_err(SCENARIOS_FILE_NAME, r))?;

        info!(
            source = ?source,
            lifetime_years = defaults.lifetime_years,
            loan_scenarios = scenarios.loan.len(),
            "configuration loaded"
        );

        Ok(ConfigStore {
            defaults,
            tariffs,
            scenarios,
            source,
        })
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn tariff_table(&self) -> &TariffTable {
        &self.tariffs
    }

    pub fn scenarios(&self) -> &ScenarioTracks {
        &self.scenarios
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Resolve a track key and variant name, e.g. `("cpi_track", "base")`.
    pub fn resolve_scenario(&self, track_key: &str, name: &str) -> NetbillResult<ScenarioValue> {
        let track: ScenarioTrack = track_key
            .parse()
            .map_err(|_| NetbillError::lookup(track_key, name))?;
        self.scenarios.resolve(track, name)
    }

    pub fn cpi(&self, name: &str) -> NetbillResult<Rate> {
        self.scenarios.cpi(name)
    }

    pub fn retail_growth(&self, name: &str) -> NetbillResult<Rate> {
        self.scenarios.retail_growth(name)
    }

    pub fn loan(&self, name: &str) -> NetbillResult<LoanTerms> {
        self.scenarios.loan_terms(name)
    }

    /// Nominal discount rate from the configured real rate and `cpi`.
    pub fn nominal_discount_rate(&self, cpi: Rate) -> Rate {
        nominal_rate_from_real(self.defaults.discount_rate_real, cpi)
    }

    /// Every track with its variant names.
    pub fn tracks(&self) -> Vec<TrackSummary> {
        ScenarioTrack::ALL
            .into_iter()
            .map(|track| TrackSummary {
                track,
                variants: self.scenarios.variants(track),
            })
            .collect()
    }
}

fn config_err(path: &str, reason: impl Into<String>) -> NetbillError {
    NetbillError::Config {
        path: path.into(),
        reason: reason.into(),
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> NetbillResult<T> {
    debug!(path = %path.display(), "reading configuration file");
    let contents = fs::read_to_string(path)
        .map_err(|e| config_err(&path.display().to_string(), e.to_string()))?;
    parse_yaml(&contents, &path.display().to_string())
}

fn parse_yaml<T: DeserializeOwned>(contents: &str, origin: &str) -> NetbillResult<T> {
    serde_yaml::from_str(contents).map_err(|e| config_err(origin, e.to_string()))
}
