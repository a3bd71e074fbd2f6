//! Layered configuration loading
//!
//! Built-in defaults, then an optional TOML file, then `LIPSYNC_*`
//! environment variables (`LIPSYNC_SERVER__PORT=9000`,
//! `LIPSYNC_INFERENCE__FACE_SOURCE=upload`, ...).

use config::{Config, Environment, File};
use lipsync_core::LipsyncConfig;
use std::path::Path;

pub const CONFIG_PATH_VAR: &str = "LIPSYNC_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "lipsync.toml";
const ENV_PREFIX: &str = "LIPSYNC";

/// Load configuration from the path named by `LIPSYNC_CONFIG`, falling back to
/// `lipsync.toml` in the working directory. A missing file is not an error.
pub fn load() -> anyhow::Result<LipsyncConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_from(Path::new(&path), Environment::with_prefix(ENV_PREFIX))
}

fn load_from(path: &Path, env: Environment) -> anyhow::Result<LipsyncConfig> {
    let settings = Config::builder()
        .add_source(Config::try_from(&LipsyncConfig::default())?)
        .add_source(File::from(path).required(false))
        .add_source(
            env.prefix_separator("_")
                .separator("__")
                .list_separator(" ")
                .with_list_parse_key("inference.args")
                .try_parsing(true),
        )
        .build()?;

    let config: LipsyncConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
