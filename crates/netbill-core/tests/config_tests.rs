use std::fs;

use netbill_core::config::{ConfigSource, ConfigStore, ScenarioValue};
use netbill_core::error::NetbillError;
use netbill_core::simulate::{simulate, SimulationRequest};
use rust_decimal_macros::dec;
use tempfile::TempDir;

const DEFAULTS: &str = include_str!("../data/defaults.yaml");
const TARIFFS: &str = include_str!("../data/tariffs.yaml");
const SCENARIOS: &str = include_str!("../data/scenarios.yaml");

fn write_config(defaults: &str, tariffs: &str, scenarios: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("defaults.yaml"), defaults).unwrap();
    fs::write(dir.path().join("tariffs.yaml"), tariffs).unwrap();
    fs::write(dir.path().join("scenarios.yaml"), scenarios).unwrap();
    dir
}

#[test]
fn test_from_dir_matches_bundled() {
    let dir = write_config(DEFAULTS, TARIFFS, SCENARIOS);
    let store = ConfigStore::from_dir(dir.path()).unwrap();
    let bundled = ConfigStore::bundled().unwrap();

    assert_eq!(store.source(), &ConfigSource::Directory(dir.path().to_path_buf()));
    assert_eq!(store.defaults(), bundled.defaults());
    assert_eq!(store.tariff_table(), bundled.tariff_table());

    let req = SimulationRequest::default();
    assert_eq!(
        simulate(&store, &req).unwrap(),
        simulate(&bundled, &req).unwrap()
    );
}

#[test]
fn test_missing_file_fails_fast() {
    let dir = write_config(DEFAULTS, TARIFFS, SCENARIOS);
    fs::remove_file(dir.path().join("tariffs.yaml")).unwrap();
    let err = ConfigStore::from_dir(dir.path()).unwrap_err();
    assert!(
        matches!(err, NetbillError::Config { ref path, .. } if path.ends_with("tariffs.yaml")),
        "unexpected error: {err}"
    );
}

#[test]
fn test_flat_yield_and_custom_scenarios() {
    let defaults = DEFAULTS.replace(
        "yield_kwh_per_kwp_year:\n  base: 1650\n  north: 1580\n  south: 1740",
        "yield_kwh_per_kwp_year: 1500",
    );
    let scenarios = SCENARIOS.replace("  high: 0.04", "  high: 0.04\n  stagflation: 0.09");
    let dir = write_config(&defaults, TARIFFS, &scenarios);
    let store = ConfigStore::from_dir(dir.path()).unwrap();

    assert_eq!(
        store.resolve_scenario("cpi_track", "stagflation").unwrap(),
        ScenarioValue::Rate(dec!(0.09))
    );

    let req = SimulationRequest {
        kwp: dec!(10),
        region: "anywhere".into(),
        ..Default::default()
    };
    let result = simulate(&store, &req).unwrap();
    assert_eq!(result.series.energy_kwh[0], dec!(15000));
}

#[test]
fn test_dangling_loan_tier_rejected() {
    let scenarios = SCENARIOS.replace("tenor_tier: long", "tenor_tier: eternal");
    let dir = write_config(DEFAULTS, TARIFFS, &scenarios);
    assert!(matches!(
        ConfigStore::from_dir(dir.path()),
        Err(NetbillError::Config { .. })
    ));
}
