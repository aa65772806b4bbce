use anyhow::{Context, Result};
use edgeline_core::LineConfig;

/// Print the effective line configuration as JSON
pub fn execute(config: &LineConfig) -> Result<()> {
    let json = render(config)?;
    println!("{}", json);
    Ok(())
}

/// Pretty JSON form of `config`
pub fn render(config: &LineConfig) -> Result<String> {
    serde_json::to_string_pretty(config).with_context(|| "Failed to serialize configuration")
}
