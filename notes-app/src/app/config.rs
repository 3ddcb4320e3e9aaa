use std::sync::OnceLock;

use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Simulated round-trip for login and registration.
    #[serde(default = "default_auth_latency_ms")]
    pub auth_latency_ms: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default)]
    pub log_json: bool,
}

fn default_port() -> u16 {
    4000
}

fn default_database_url() -> String {
    "notes.db".into()
}

fn default_auth_latency_ms() -> u64 {
    500
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        match envy::from_env::<Self>() {
            Ok(config) => config,
            Err(err) => {
                eprintln!("invalid configuration, falling back to defaults: {err}");
                Self::default()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            database_url: default_database_url(),
            auth_latency_ms: default_auth_latency_ms(),
            max_upload_bytes: default_max_upload_bytes(),
            log_json: false,
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

#[cfg(test)]
pub fn config_override<F>(override_config: F) -> &'static Config
where
    F: FnOnce(Config) -> Config,
{
    CONFIG.get_or_init(|| override_config(Config::from_env()))
}
