use std::time::Instant;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use netbill_core::config::ConfigStore;
use netbill_core::finance::financing::FinanceMode;
use netbill_core::projection::energy::size_kwp_from_area;
use netbill_core::projection::netbilling::{AccountingMode, CustomerClass};
use netbill_core::projection::tariff::Route;
use netbill_core::simulate::{self, SimulationRequest};
use netbill_core::types::with_metadata;

use crate::input;

/// Arguments for a lifetime cash-flow simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Installed capacity in kWp
    #[arg(long, conflicts_with = "area_m2")]
    pub kwp: Option<Decimal>,

    /// Usable roof area in m²; capacity is derived from the configured power density
    #[arg(long)]
    pub area_m2: Option<Decimal>,

    /// Tariff route: nominal, accelerated, cpi
    #[arg(long, default_value = "accelerated")]
    pub route: Route,

    /// Accounting mode (only net_billing is supported)
    #[arg(long, default_value = "net_billing")]
    pub accounting: AccountingMode,

    /// Yield region
    #[arg(long, default_value = simulate::DEFAULT_REGION)]
    pub region: String,

    /// Fraction of generation consumed on site, 0..1
    #[arg(long, default_value = "0.5")]
    pub self_consumption: Decimal,

    /// Retail growth scenario
    #[arg(long, default_value = simulate::DEFAULT_SCENARIO)]
    pub retail_growth: String,

    /// CPI scenario
    #[arg(long, default_value = simulate::DEFAULT_SCENARIO)]
    pub cpi_track: String,

    /// Customer class: smb, residential
    #[arg(long, default_value = "smb")]
    pub customer_class: CustomerClass,

    /// CAPEX per kWp (defaults to the customer-class figure)
    #[arg(long)]
    pub capex_per_kwp: Option<Decimal>,

    /// Financing: equity, loan, leasing
    #[arg(long, default_value = "equity")]
    pub finance_mode: FinanceMode,

    /// Loan scenario (loan financing only)
    #[arg(long)]
    pub loan_scenario: Option<String>,

    /// Do not add the urban premium to the export tariff
    #[arg(long)]
    pub no_urban_premium: bool,
}

pub fn run_simulate(
    args: SimulateArgs,
    store: &ConfigStore,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SimulationRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let kwp = match (args.kwp, args.area_m2) {
            (Some(kwp), _) => kwp,
            (None, Some(area)) => {
                size_kwp_from_area(area, store.defaults().power_density_kw_per_m2)?
            }
            (None, None) => return Err("--kwp or --area-m2 is required (or provide --input)".into()),
        };

        SimulationRequest {
            kwp,
            route: args.route,
            accounting: args.accounting,
            region: args.region,
            self_consumption: args.self_consumption,
            retail_growth: args.retail_growth,
            cpi_track: args.cpi_track,
            customer_class: args.customer_class,
            capex_per_kwp: args.capex_per_kwp,
            finance_mode: args.finance_mode,
            loan_scenario: args.loan_scenario,
            apply_urban_premium: !args.no_urban_premium,
        }
    };

    let start = Instant::now();
    let result = simulate::simulate(store, &request)?;
    let elapsed = start.elapsed().as_micros() as u64;

    let warnings = result.metrics.warnings.clone();
    let output = with_metadata(
        "Net-billing PV lifetime cash flow: NPV, IRR, payback",
        &request,
        warnings,
        elapsed,
        result,
    );
    Ok(serde_json::to_value(output)?)
}
