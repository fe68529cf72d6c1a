//! Configuration snapshot: default assumptions, tariff tables and named
//! scenario tracks, loaded once from YAML and read-only afterwards.

pub mod cache;
pub mod scenarios;
pub mod schema;
pub mod store;

pub use cache::StoreCache;
pub use scenarios::{LoanScenario, LoanTerms, ScenarioTrack, ScenarioTracks, ScenarioValue};
pub use schema::{
    AcceleratedTariff, CpiTariff, Defaults, LeasingTerms, NominalTariff, PhaseRates,
    RegionalYield, TariffTable,
};
pub use store::{ConfigSource, ConfigStore, TrackSummary};
