use std::sync::Arc;

use reqwest::Url;
use thiserror::Error;

use super::client::UpstreamClient;
use super::models::*;
use super::normalize::assemble_payload;
use crate::config::ProviderConfig;
use crate::error::HttpError;
use crate::impl_into_response;

const CURRENT_CONDITIONS_PATH: &str = "/currentconditions/v1/";
const DAILY_FORECAST_PATH: &str = "/forecasts/v1/daily/1day/";
const LOCATION_PATH: &str = "/locations/v1/";

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("API key not configured.")]
    MissingApiKey,

    #[error("AccuWeather request failed ({current}/{forecast}/{location})")]
    UpstreamStatus {
        current: u16,
        forecast: u16,
        location: u16,
    },

    #[error("Incomplete AccuWeather payload")]
    IncompletePayload,

    #[error("Failed to fetch weather data: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid AccuWeather response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid AccuWeather URL: {0}")]
    InvalidUrl(String),
}

impl HttpError for WeatherError {}

impl_into_response!(WeatherError);

pub struct WeatherService {
    client: Arc<dyn UpstreamClient>,
    config: ProviderConfig,
}

impl WeatherService {
    pub fn new(client: Arc<dyn UpstreamClient>, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    /// Provider URL for `path` carrying the API key; parameters set to None are left out
    fn build_url(
        &self,
        api_key: &str,
        path: &str,
        params: &[(&str, Option<&str>)],
    ) -> Result<Url, WeatherError> {
        let mut url = Url::parse(&self.config.base_url)
            .and_then(|base| base.join(path))
            .map_err(|e| WeatherError::InvalidUrl(e.to_string()))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("apikey", api_key);
            for (key, value) in params {
                if let Some(value) = value {
                    query.append_pair(key, value);
                }
            }
        }

        Ok(url)
    }

    /// Fetch conditions, forecast and location concurrently and merge them
    pub async fn get_weather(&self) -> Result<WeatherPayload, WeatherError> {
        let api_key = self.config.api_key().ok_or(WeatherError::MissingApiKey)?;
        let location_key = &self.config.location_key;

        tracing::debug!(location_key = %location_key, "Fetching AccuWeather data");

        let current_url = self.build_url(
            api_key,
            &format!("{CURRENT_CONDITIONS_PATH}{location_key}"),
            &[("details", Some("true"))],
        )?;
        let forecast_url = self.build_url(
            api_key,
            &format!("{DAILY_FORECAST_PATH}{location_key}"),
            &[("details", Some("true")), ("metric", Some("true"))],
        )?;
        let location_url =
            self.build_url(api_key, &format!("{LOCATION_PATH}{location_key}"), &[])?;

        let (current, forecast, location) = tokio::try_join!(
            self.client.fetch(current_url),
            self.client.fetch(forecast_url),
            self.client.fetch(location_url),
        )?;

        if !(current.status.is_success()
            && forecast.status.is_success()
            && location.status.is_success())
        {
            return Err(WeatherError::UpstreamStatus {
                current: current.status.as_u16(),
                forecast: forecast.status.as_u16(),
                location: location.status.as_u16(),
            });
        }

        let current_body: Option<CurrentConditionsBody> = serde_json::from_str(&current.body)?;
        let forecast: Option<RawForecast> = decode_lenient(&forecast.body)?;
        let location: Option<RawLocation> = decode_lenient(&location.body)?;

        let current = current_body
            .and_then(CurrentConditionsBody::into_current)
            .ok_or(WeatherError::IncompletePayload)?;

        let payload = assemble_payload(Some(&current), forecast.as_ref(), location.as_ref());

        tracing::info!(
            city = %payload.city,
            temp = ?payload.temperature.current,
            "Weather data fetched successfully"
        );

        Ok(payload)
    }
}
