use serde_json::Value;
use std::io::{self, Read};

/// Read a piped simulation request, e.g. `cat request.json | netbill simulate`.
/// The payload is a `SimulationRequest` in JSON; omitted fields take their
/// defaults when it is deserialised. Returns None for an interactive terminal
/// or empty input so the caller can fall back to command-line flags.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}
