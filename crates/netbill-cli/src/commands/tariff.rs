use std::time::Instant;

use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use netbill_core::config::ConfigStore;
use netbill_core::projection::tariff::{self, Route, TariffInput};
use netbill_core::simulate::DEFAULT_SCENARIO;
use netbill_core::types::{with_metadata, AnnualSeries};

/// Arguments for printing an export tariff schedule
#[derive(Args)]
pub struct TariffArgs {
    /// Tariff route: nominal, accelerated, cpi
    #[arg(long)]
    pub route: Route,

    /// Installed capacity in kWp (selects the tier)
    #[arg(long)]
    pub kwp: Decimal,

    /// CPI scenario used by the cpi route
    #[arg(long, default_value = DEFAULT_SCENARIO)]
    pub cpi_track: String,

    /// Horizon in years (defaults to the configured lifetime)
    #[arg(long)]
    pub years: Option<u32>,

    /// Do not add the urban premium
    #[arg(long)]
    pub no_urban_premium: bool,
}

#[derive(Debug, Serialize)]
struct TariffRow {
    year: u32,
    rate: Decimal,
}

#[derive(Debug, Serialize)]
struct TariffOutput {
    route: Route,
    kwp: Decimal,
    cpi_rate: Decimal,
    schedule: Vec<TariffRow>,
}

pub fn run_tariff(args: TariffArgs, store: &ConfigStore) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let defaults = store.defaults();
    let cpi = store.cpi(&args.cpi_track)?;

    let input = TariffInput {
        route: args.route,
        capacity_kwp: args.kwp,
        lifetime_years: args.years.unwrap_or(defaults.lifetime_years),
        cpi_rate: cpi,
        urban_premium_amount: if args.no_urban_premium {
            Decimal::ZERO
        } else {
            defaults.urban_premium_addition
        },
        premium_duration_years: defaults.urban_premium_years,
    };
    let series: AnnualSeries = tariff::tariff_series(store.tariff_table(), &input)?;

    let output = TariffOutput {
        route: args.route,
        kwp: args.kwp,
        cpi_rate: cpi,
        schedule: series
            .into_iter()
            .enumerate()
            .map(|(t, rate)| TariffRow {
                year: t as u32 + 1,
                rate,
            })
            .collect(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(serde_json::to_value(with_metadata(
        "Export tariff schedule by regulatory route",
        &input,
        Vec::new(),
        elapsed,
        output,
    ))?)
}
