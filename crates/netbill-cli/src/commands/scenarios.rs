use clap::Args;
use serde_json::Value;

use netbill_core::config::ConfigStore;

/// Arguments for inspecting scenario tracks
#[derive(Args)]
pub struct ScenariosArgs {
    /// Track key to resolve (e.g. cpi_track, loan)
    #[arg(long, requires = "name")]
    pub track: Option<String>,

    /// Variant name within the track (e.g. base)
    #[arg(long, requires = "track")]
    pub name: Option<String>,
}

pub fn run_scenarios(
    args: ScenariosArgs,
    store: &ConfigStore,
) -> Result<Value, Box<dyn std::error::Error>> {
    match (args.track, args.name) {
        (Some(track), Some(name)) => {
            let value = store.resolve_scenario(&track, &name)?;
            Ok(serde_json::json!({
                "track": track,
                "name": name,
                "result": value,
            }))
        }
        _ => Ok(serde_json::json!({ "results": store.tracks() })),
    }
}
