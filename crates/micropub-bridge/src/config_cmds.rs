use anyhow::Result;
use mpb_config::BridgeConfig;

use crate::cli::OutputFormat;

pub(crate) fn handle_config_show(config: &BridgeConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Text => {
            print!("{}", toml::to_string_pretty(config)?);
        }
    }
    Ok(())
}

pub(crate) fn handle_config_template() -> Result<()> {
    print!("{}", BridgeConfig::default_template());
    Ok(())
}
