//! Configuration loading and management.

use std::path::{Path, PathBuf};

use fd_client::DEFAULT_BATCH_SIZE;
use fd_core::DayProfile;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host name used in bucket ids and bucket metadata.
    pub hostname: String,
    /// Client name reported when creating buckets.
    pub client_name: String,
    /// Target a testing server instead of production.
    pub testing: bool,
    /// Server URL, overriding the testing/production default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// Events per insert request.
    pub batch_size: usize,
    /// TOML file replacing some or all built-in template catalogs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    /// Shape of each generated day.
    pub profile: DayProfile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: "fakedata".to_string(),
            client_name: "aw-fakedata".to_string(),
            testing: true,
            server_url: None,
            batch_size: DEFAULT_BATCH_SIZE,
            catalog_path: None,
            profile: DayProfile::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let aw_testing = std::env::var("AW_TESTING").ok();
        Self::figment(config_path, aw_testing.as_deref()).extract()
    }

    /// Builds the provider stack: defaults, default config file, `config_path`,
    /// `AW_TESTING`, then `FAKEDATA_*` variables.
    fn figment(config_path: Option<&Path>, aw_testing: Option<&str>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(value) = aw_testing {
            figment = figment.merge(Serialized::default("testing", testing_from_env(value)));
        }

        // Load from environment variables (FAKEDATA_*)
        figment.merge(Env::prefixed("FAKEDATA_").split("__"))
    }

    /// The server to talk to.
    pub fn server_url(&self) -> String {
        self.server_url
            .clone()
            .unwrap_or_else(|| fd_client::default_server_url(self.testing).to_string())
    }
}

/// `AW_TESTING` keeps testing mode on unless it is exactly `false`.
fn testing_from_env(value: &str) -> bool {
    !value.eq_ignore_ascii_case("false")
}

/// Returns the platform-specific config directory for aw-fakedata.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("aw-fakedata"))
}
