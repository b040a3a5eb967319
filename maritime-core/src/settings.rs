use config::{Config, ConfigError, File};
use serde::{Deserialize, de::DeserializeOwned};

/// Environment variable selecting which layered config file is read.
pub const ENVIRONMENT_VARIABLE: &str = "APP_ENVIRONMENT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    Local,
    Test,
    Development,
    Production,
}

/// Reads `config/<environment>.yml` (relative to the working directory) and
/// then environment variables prefixed with `prefix`, nested keys separated
/// by `__`. The file is optional and environment variables win.
pub fn load_settings<T: DeserializeOwned>(prefix: &str) -> Result<T, ConfigError> {
    let environment = std::env::var(ENVIRONMENT_VARIABLE).unwrap_or_else(|_| "local".into());

    Config::builder()
        .set_default("environment", environment.as_str())?
        .add_source(File::with_name(&format!("config/{environment}")).required(false))
        .add_source(
            config::Environment::with_prefix(prefix)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
