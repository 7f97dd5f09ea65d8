use config::{Case, Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// AccuWeather API key (ACCUWEATHER_KEY_SECRET)
    #[serde(default, alias = "key_secret")]
    pub api_key: Option<String>,

    /// AccuWeather location key (ACCUWEATHER_LOCATION_KEY)
    #[serde(default = "default_location_key")]
    pub location_key: String,

    /// AccuWeather data service host
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Immutable view of the settings the AccuWeather fetch needs
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub location_key: String,
    pub base_url: String,
}

impl ProviderConfig {
    /// The API key, treating an empty value as unset
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_location_key() -> String {
    "202440".to_string()
}

fn default_base_url() -> String {
    "https://dataservice.accuweather.com".to_string()
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("host", default_host())?
            .set_default("port", default_port())?
            .set_default("location_key", default_location_key())?
            .set_default("base_url", default_base_url())?
            // Load from config file if present
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config.local").required(false))
            // Provider settings keep the ACCUWEATHER_ names used by the deployment.
            // No type parsing here: location keys are opaque strings.
            .add_source(
                Environment::with_prefix("ACCUWEATHER")
                    .prefix_separator("_")
                    .convert_case(Case::Snake),
            )
            // Server settings (SKYLINE_HOST, SKYLINE_PORT)
            .add_source(
                Environment::with_prefix("SKYLINE")
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(Case::Snake)
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.api_key.clone(),
            location_key: self.location_key.clone(),
            base_url: self.base_url.clone(),
        }
    }
}
