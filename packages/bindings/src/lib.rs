use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use napi::Result as NapiResult;
use napi_derive::napi;
use once_cell::sync::Lazy;

use netbill_core::config::{ConfigStore, StoreCache};
use netbill_core::types::with_metadata;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Stores loaded so far; the Node process keeps them for its lifetime.
static STORES: Lazy<StoreCache> = Lazy::new(StoreCache::new);

/// Bundled configuration, or the YAML files under `config_dir` when given.
fn load_store(config_dir: Option<String>) -> NapiResult<Arc<ConfigStore>> {
    STORES
        .get(config_dir.as_deref().map(Path::new))
        .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate(input_json: String, config_dir: Option<String>) -> NapiResult<String> {
    let store = load_store(config_dir)?;
    let request: netbill_core::simulate::SimulationRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let start = Instant::now();
    let result = netbill_core::simulate::simulate(&store, &request).map_err(to_napi_error)?;
    let warnings = result.metrics.warnings.clone();
    let output = with_metadata(
        "Net-billing PV lifetime cash flow: NPV, IRR, payback",
        &request,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn size_from_area(area_m2: String, config_dir: Option<String>) -> NapiResult<String> {
    let store = load_store(config_dir)?;
    let area: rust_decimal::Decimal = area_m2.parse().map_err(to_napi_error)?;
    let kwp = netbill_core::projection::energy::size_kwp_from_area(
        area,
        store.defaults().power_density_kw_per_m2,
    )
    .map_err(to_napi_error)?;
    Ok(kwp.to_string())
}

// ---------------------------------------------------------------------------
// Tariffs
// ---------------------------------------------------------------------------

#[napi]
pub fn tariff_series(input_json: String, config_dir: Option<String>) -> NapiResult<String> {
    let store = load_store(config_dir)?;
    let input: netbill_core::projection::tariff::TariffInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let start = Instant::now();
    let series = netbill_core::projection::tariff::tariff_series(store.tariff_table(), &input)
        .map_err(to_napi_error)?;
    let output = with_metadata(
        "Export tariff schedule by regulatory route",
        &input,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        series,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn list_scenarios(config_dir: Option<String>) -> NapiResult<String> {
    let store = load_store(config_dir)?;
    serde_json::to_string(&store.tracks()).map_err(to_napi_error)
}

#[napi]
pub fn resolve_scenario(
    track: String,
    name: String,
    config_dir: Option<String>,
) -> NapiResult<String> {
    let store = load_store(config_dir)?;
    let value = store.resolve_scenario(&track, &name).map_err(to_napi_error)?;
    serde_json::to_string(&value).map_err(to_napi_error)
}
