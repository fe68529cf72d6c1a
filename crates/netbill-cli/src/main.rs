mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::scenarios::ScenariosArgs;
use commands::simulate::SimulateArgs;
use commands::tariff::TariffArgs;
use netbill_core::config::ConfigStore;

/// Rooftop PV financial simulation under net-billing tariffs
#[derive(Parser)]
#[command(
    name = "netbill",
    version,
    about = "Rooftop PV cash-flow and return simulation under net-billing tariffs",
    long_about = "Projects generation, export tariffs and retail savings over the system \
                  lifetime and reports NPV, IRR and payback for equity, loan and leasing \
                  financing across the nominal, accelerated and CPI-linked tariff routes."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Directory with defaults.yaml, tariffs.yaml and scenarios.yaml
    /// (bundled data is used when omitted)
    #[arg(long, env = "NETBILL_CONFIG_DIR", global = true)]
    config_dir: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a lifetime cash-flow simulation
    Simulate(SimulateArgs),
    /// Print the export tariff schedule for a route
    Tariff(TariffArgs),
    /// List scenario tracks or resolve one variant
    Scenarios(ScenariosArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn load_store(config_dir: Option<&str>) -> Result<ConfigStore, Box<dyn std::error::Error>> {
    Ok(match config_dir {
        Some(dir) => ConfigStore::from_dir(dir)?,
        None => ConfigStore::bundled()?,
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => load_store(cli.config_dir.as_deref())
            .and_then(|store| commands::simulate::run_simulate(args, &store)),
        Commands::Tariff(args) => load_store(cli.config_dir.as_deref())
            .and_then(|store| commands::tariff::run_tariff(args, &store)),
        Commands::Scenarios(args) => load_store(cli.config_dir.as_deref())
            .and_then(|store| commands::scenarios::run_scenarios(args, &store)),
        Commands::Version => {
            println!("netbill {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_is_dispatched_like_other_commands() {
        let cli = Cli::try_parse_from(["netbill", "version", "--output", "minimal"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
        assert!(matches!(cli.output, OutputFormat::Minimal));
    }

    #[test]
    fn test_kwp_and_area_conflict() {
        assert!(Cli::try_parse_from(["netbill", "simulate", "--kwp", "10", "--area-m2", "50"]).is_err());
    }
}
