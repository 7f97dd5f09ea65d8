use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// ============================================================================
// AccuWeather Responses (Internal)
// Every field is optional and decoded leniently: a value of the wrong JSON
// type becomes None instead of failing the whole document.
// ============================================================================

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like `lenient`, but keeps the well-formed elements of a list
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// Keeps a present field even when it is JSON null; only a missing key stays None
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JavaScript-style truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Decode a JSON document into `T`, or None when its shape does not fit
pub fn decode_lenient<T: DeserializeOwned>(body: &str) -> Result<Option<T>, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    Ok(serde_json::from_value(value).ok())
}

/// A `{Value, Unit}` pair. `Value` is kept raw so numeric coercion can be lenient;
/// an explicit `null` is `Some(Value::Null)`, a missing key is `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Measurement {
    #[serde(default, deserialize_with = "present")]
    pub value: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub unit: Option<String>,
}

/// A reading reported in both unit systems; only the metric side is read
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnitReading {
    #[serde(default, deserialize_with = "lenient")]
    pub metric: Option<Measurement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WindDirection {
    #[serde(default, deserialize_with = "lenient")]
    pub localized: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Wind {
    #[serde(default, deserialize_with = "lenient")]
    pub speed: Option<UnitReading>,
    #[serde(default, deserialize_with = "lenient")]
    pub direction: Option<WindDirection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AirAndPollen {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl AirAndPollen {
    pub fn is_air_quality(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| name.to_lowercase() == "airquality")
    }
}

/// Current conditions for one location
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCurrentConditions {
    #[serde(default, deserialize_with = "lenient")]
    pub local_observation_date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub weather_text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub weather_icon: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub has_precipitation: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub precipitation_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_day_time: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature: Option<UnitReading>,
    #[serde(default, deserialize_with = "lenient")]
    pub real_feel_temperature: Option<UnitReading>,
    #[serde(default, deserialize_with = "lenient")]
    pub pressure: Option<UnitReading>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind: Option<Wind>,
    #[serde(default, deserialize_with = "lenient")]
    pub visibility: Option<UnitReading>,
    #[serde(rename = "UVIndex", default)]
    pub uv_index: Option<Value>,
    #[serde(rename = "UVIndexText", default, deserialize_with = "lenient")]
    pub uv_index_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub air_and_pollen: Option<Vec<AirAndPollen>>,
}

fn metric_of(reading: &Option<UnitReading>) -> Option<&Measurement> {
    reading.as_ref()?.metric.as_ref()
}

impl RawCurrentConditions {
    pub fn temperature_metric(&self) -> Option<&Measurement> {
        metric_of(&self.temperature)
    }

    pub fn real_feel_metric(&self) -> Option<&Measurement> {
        metric_of(&self.real_feel_temperature)
    }

    pub fn pressure_metric(&self) -> Option<&Measurement> {
        metric_of(&self.pressure)
    }

    pub fn visibility_metric(&self) -> Option<&Measurement> {
        metric_of(&self.visibility)
    }

    pub fn wind_speed_metric(&self) -> Option<&Measurement> {
        metric_of(&self.wind.as_ref()?.speed)
    }

    pub fn wind_direction(&self) -> Option<&str> {
        self.wind
            .as_ref()?
            .direction
            .as_ref()?
            .localized
            .as_deref()
            .filter(|direction| !direction.is_empty())
    }

    /// First air-and-pollen entry named "AirQuality", in any letter case
    pub fn air_quality(&self) -> Option<&AirAndPollen> {
        self.air_and_pollen
            .as_deref()?
            .iter()
            .find(|entry| entry.is_air_quality())
    }
}

/// The current-conditions endpoint answers with either a one-element list or a bare object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CurrentConditionsBody {
    List(Vec<Value>),
    Single(Value),
}

impl CurrentConditionsBody {
    /// The conditions record, or None when the resolved value is empty or falsy.
    /// A truthy value that is not an object yields an all-absent record.
    pub fn into_current(self) -> Option<RawCurrentConditions> {
        let value = match self {
            Self::List(items) => items.into_iter().next()?,
            Self::Single(value) => value,
        };
        if !is_truthy(&value) {
            return None;
        }
        Some(serde_json::from_value(value).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Headline {
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemperatureRange {
    #[serde(default, deserialize_with = "lenient")]
    pub minimum: Option<Measurement>,
    #[serde(default, deserialize_with = "lenient")]
    pub maximum: Option<Measurement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DayPart {
    #[serde(default, deserialize_with = "lenient")]
    pub long_phrase: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DailyForecast {
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature: Option<TemperatureRange>,
    #[serde(default, deserialize_with = "lenient")]
    pub day: Option<DayPart>,
    #[serde(default, deserialize_with = "lenient")]
    pub night: Option<DayPart>,
}

fn long_phrase(part: &Option<DayPart>) -> Option<&str> {
    part.as_ref()?
        .long_phrase
        .as_deref()
        .filter(|phrase| !phrase.is_empty())
}

impl DailyForecast {
    pub fn maximum(&self) -> Option<&Measurement> {
        self.temperature.as_ref()?.maximum.as_ref()
    }

    pub fn minimum(&self) -> Option<&Measurement> {
        self.temperature.as_ref()?.minimum.as_ref()
    }

    pub fn day_phrase(&self) -> Option<&str> {
        long_phrase(&self.day)
    }

    pub fn night_phrase(&self) -> Option<&str> {
        long_phrase(&self.night)
    }
}

/// 1-day forecast response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawForecast {
    #[serde(default, deserialize_with = "lenient")]
    pub headline: Option<Headline>,
    /// Kept raw so that only the first entry is ever decoded
    #[serde(default, deserialize_with = "lenient")]
    pub daily_forecasts: Option<Vec<Value>>,
}

impl RawForecast {
    /// The soonest day; None when it is missing or not an object
    pub fn first_day(&self) -> Option<DailyForecast> {
        let first = self.daily_forecasts.as_deref()?.first()?;
        serde_json::from_value(first.clone()).ok()
    }

    pub fn headline_text(&self) -> Option<&str> {
        self.headline
            .as_ref()?
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamedArea {
    #[serde(default, deserialize_with = "lenient")]
    pub localized_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeZone {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

/// Location lookup response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawLocation {
    #[serde(default, deserialize_with = "lenient")]
    pub localized_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub administrative_area: Option<NamedArea>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<NamedArea>,
    #[serde(default, deserialize_with = "lenient")]
    pub time_zone: Option<TimeZone>,
}

fn area_name(area: &Option<NamedArea>) -> Option<&str> {
    area.as_ref()?
        .localized_name
        .as_deref()
        .filter(|name| !name.is_empty())
}

impl RawLocation {
    pub fn name(&self) -> Option<&str> {
        self.localized_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn administrative_area_name(&self) -> Option<&str> {
        area_name(&self.administrative_area)
    }

    pub fn country_name(&self) -> Option<&str> {
        area_name(&self.country)
    }

    pub fn time_zone_name(&self) -> Option<&str> {
        self.time_zone
            .as_ref()?
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}

// ============================================================================
// API Response Types (Public)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    Pressure,
    UvIndex,
    Wind,
    Visibility,
    Aqi,
}

impl MetricKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pressure => "Pressure",
            Self::UvIndex => "UV Index",
            Self::Wind => "Wind",
            Self::Visibility => "Visibility",
            Self::Aqi => "AQI",
        }
    }
}

/// One formatted line per weather metric
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetricDisplay {
    pub key: MetricKey,
    pub label: String,
    /// Never empty; "—" when the value is unavailable
    pub display: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureBlock {
    pub current: Option<f64>,
    pub feels_like: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionsBlock {
    pub description: String,
    pub narrative: String,
    pub is_day_time: Option<bool>,
    pub has_precipitation: Option<bool>,
    pub precipitation_type: String,
    pub icon: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastBlock {
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub narrative: String,
}

/// Normalized payload served to the frontend
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPayload {
    pub city: String,
    pub region: String,
    pub timezone: String,
    pub local_time: String,
    pub temperature: TemperatureBlock,
    pub conditions: ConditionsBlock,
    pub forecast: ForecastBlock,
    pub metrics: Vec<MetricDisplay>,
    pub fetched_at: String,
    pub refresh_interval_minutes: u32,
}
