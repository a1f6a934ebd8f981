//! CLI configuration loading

use anyhow::Result;
use digs_http::ClientConfig;
use std::path::Path;

/// Prefix of environment overrides, e.g. `DIGS_BASE_URL`
pub const ENV_PREFIX: &str = "DIGS";

/// Load the client configuration.
///
/// Sources in increasing precedence: built-in defaults, the config file, then
/// `DIGS_*` environment variables. An explicitly given file must exist; the
/// default one is optional.
pub fn load_client_config(path: &Path, required: bool) -> Result<ClientConfig> {
    load_with_env(path, required, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn load_with_env(path: &Path, required: bool, env: config::Environment) -> Result<ClientConfig> {
    let defaults = ClientConfig::default();

    let settings = config::Config::builder()
        .set_default("base_url", defaults.base_url)?
        .set_default("api_key", defaults.api_key)?
        .set_default("timeout_secs", defaults.timeout_secs)?
        .set_default("platform", defaults.platform)?
        .add_source(config::File::from(path).required(required))
        .add_source(env)
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = load_with_env(&dir.path().join("digs.toml"), false, env(&[])).unwrap();

        assert_eq!(config.base_url, digs_http::config::DEFAULT_BASE_URL);
        assert_eq!(config.api_key, "");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.platform, "web");
        assert_eq!(config.user_agent, None);
    }

    #[test]
    fn test_missing_required_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(load_with_env(&dir.path().join("nope.toml"), true, env(&[])).is_err());
    }

    #[test]
    fn test_file_then_env_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("digs.toml");
        std::fs::write(
            &path,
            "base_url = \"https://api.digs.africa\"\napi_key = \"from-file\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = load_with_env(
            &path,
            true,
            env(&[("DIGS_API_KEY", "from-env"), ("DIGS_TIMEOUT_SECS", "12")]),
        )
        .unwrap();

        assert_eq!(config.base_url, "https://api.digs.africa");
        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.platform, "web");
    }
}
