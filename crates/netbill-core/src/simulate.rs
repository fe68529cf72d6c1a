use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::config::{ConfigStore, Defaults};
use crate::error::NetbillError;
use crate::finance::financing::{apply_financing, FinanceMode, FinancingPlan, LoanPeriod};
use crate::finance::metrics::{format_metrics, MetricsResult};
use crate::projection::energy::generation_series;
use crate::projection::netbilling::{
    cashflow_net_billing, ensure_net_billing, opex_series, retail_series, AccountingMode,
    CustomerClass,
};
use crate::projection::tariff::{tariff_series, Route, TariffInput};
use crate::types::{AnnualSeries, Kwp, Money, Rate};
use crate::NetbillResult;

pub const DEFAULT_SCENARIO: &str = "base";
pub const DEFAULT_REGION: &str = "base";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Caller-supplied parameters for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationRequest {
    /// Installed capacity, kW-peak
    pub kwp: Kwp,
    #[serde(default = "default_route")]
    pub route: Route,
    #[serde(default)]
    pub accounting: AccountingMode,
    /// Yield region key from the defaults
    #[serde(default = "default_region")]
    pub region: String,
    /// Fraction of generation consumed on site
    #[serde(default = "default_self_consumption")]
    pub self_consumption: Rate,
    #[serde(default = "default_scenario")]
    pub retail_growth: String,
    #[serde(default = "default_scenario")]
    pub cpi_track: String,
    #[serde(default)]
    pub customer_class: CustomerClass,
    /// Overrides the customer-class CAPEX per kWp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capex_per_kwp: Option<Money>,
    #[serde(default)]
    pub finance_mode: FinanceMode,
    /// Only consulted for loan financing; defaults to "base"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_scenario: Option<String>,
    #[serde(default = "default_true")]
    pub apply_urban_premium: bool,
}

fn default_route() -> Route {
    Route::Accelerated
}

fn default_region() -> String {
    DEFAULT_REGION.into()
}

fn default_self_consumption() -> Rate {
    dec!(0.5)
}

fn default_scenario() -> String {
    DEFAULT_SCENARIO.into()
}

fn default_true() -> bool {
    true
}

impl Default for SimulationRequest {
    fn default() -> Self {
        SimulationRequest {
            kwp: dec!(20),
            route: default_route(),
            accounting: AccountingMode::NetBilling,
            region: default_region(),
            self_consumption: default_self_consumption(),
            retail_growth: default_scenario(),
            cpi_track: default_scenario(),
            customer_class: CustomerClass::Smb,
            capex_per_kwp: None,
            finance_mode: FinanceMode::Equity,
            loan_scenario: None,
            apply_urban_premium: true,
        }
    }
}

impl SimulationRequest {
    /// Range checks that need no scenario lookups.
    pub fn validate(&self, defaults: &Defaults) -> NetbillResult<()> {
        if self.kwp <= Decimal::ZERO || self.kwp > defaults.max_capacity_kwp {
            return Err(NetbillError::invalid(
                "kwp",
                format!(
                    "Capacity must be in (0, {}] kWp, got {}",
                    defaults.max_capacity_kwp, self.kwp
                ),
            ));
        }
        if self.self_consumption < Decimal::ZERO || self.self_consumption > Decimal::ONE {
            return Err(NetbillError::invalid(
                "self_consumption",
                "Self-consumption share must be in [0, 1]",
            ));
        }
        if let Some(capex) = self.capex_per_kwp {
            if capex < Decimal::ZERO {
                return Err(NetbillError::invalid(
                    "capex_per_kwp",
                    "CAPEX per kWp cannot be negative",
                ));
            }
        }
        ensure_net_billing(self.accounting)
    }

    /// Financing plan with its terms resolved from configuration.
    pub fn financing_plan(&self, store: &ConfigStore) -> NetbillResult<FinancingPlan> {
        Ok(match self.finance_mode {
            FinanceMode::Equity => FinancingPlan::Equity,
            FinanceMode::Loan => {
                let name = self.loan_scenario.as_deref().unwrap_or(DEFAULT_SCENARIO);
                FinancingPlan::Loan(store.loan(name)?)
            }
            FinanceMode::Leasing => FinancingPlan::Leasing(store.defaults().leasing.clone()),
        })
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Intermediate annual series, one entry per operating year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationSeries {
    pub energy_kwh: AnnualSeries,
    pub export_tariff: AnnualSeries,
    pub retail_tariff: AnnualSeries,
    pub operating_revenue: AnnualSeries,
    pub opex: AnnualSeries,
    pub debt_service: AnnualSeries,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    pub metrics: MetricsResult,
    /// Period labels matching `cashflow`; 0 is the investment period
    pub years: Vec<u32>,
    pub cashflow: Vec<Money>,
    pub total_capex: Money,
    pub finance_mode: FinanceMode,
    pub series: SimulationSeries,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub loan_schedule: Vec<LoanPeriod>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full projection: energy, tariffs, net-billing revenue, financing
/// and metrics. Pure with respect to `store` and `request`.
pub fn simulate(store: &ConfigStore, request: &SimulationRequest) -> NetbillResult<SimulationResult> {
    let _span = debug_span!(
        "simulate",
        kwp = %request.kwp,
        route = %request.route,
        finance_mode = %request.finance_mode
    )
    .entered();

    let cfg = store.defaults();
    request.validate(cfg)?;

    let years = cfg.lifetime_years;
    let cpi = store.cpi(&request.cpi_track)?;
    let growth = store.retail_growth(&request.retail_growth)?;
    let plan = request.financing_plan(store)?;

    let yield_per_kwp = cfg.yield_kwh_per_kwp_year.for_region(&request.region)?;
    let energy = generation_series(request.kwp, years, yield_per_kwp, cfg.degradation_annual)?;

    let urban_premium = if request.apply_urban_premium {
        cfg.urban_premium_addition
    } else {
        Decimal::ZERO
    };
    let export_tariff = tariff_series(
        store.tariff_table(),
        &TariffInput {
            route: request.route,
            capacity_kwp: request.kwp,
            lifetime_years: years,
            cpi_rate: cpi,
            urban_premium_amount: urban_premium,
            premium_duration_years: cfg.urban_premium_years,
        },
    )?;

    let class = request.customer_class.key();
    let retail = retail_series(cfg.retail_tariff(class)?, years, growth);
    let operating = cashflow_net_billing(&energy, request.self_consumption, &retail, &export_tariff)?;
    debug!(year_one_revenue = %operating.first().copied().unwrap_or_default(), "operating revenue projected");

    let capex_per_kwp = match request.capex_per_kwp {
        Some(c) => c,
        None => cfg.capex_per_kwp(class)?,
    };
    let total_capex = capex_per_kwp * request.kwp;
    let opex = opex_series(total_capex, cfg.opex_pct_of_capex, years, cpi);

    let financed = apply_financing(&plan, total_capex, &operating, &opex)?;
    let discount_rate = store.nominal_discount_rate(cpi);
    let metrics = format_metrics(&financed.cashflow, discount_rate, plan.mode())?;
    debug!(npv = %metrics.npv, irr = ?metrics.irr, payback = ?metrics.payback_year, "metrics computed");

    Ok(SimulationResult {
        metrics,
        years: (0..=years).collect(),
        cashflow: financed.cashflow,
        total_capex,
        finance_mode: plan.mode(),
        series: SimulationSeries {
            energy_kwh: energy,
            export_tariff,
            retail_tariff: retail,
            operating_revenue: operating,
            opex,
            debt_service: financed.debt_service,
        },
        loan_schedule: financed.loan_schedule,
    })
}
