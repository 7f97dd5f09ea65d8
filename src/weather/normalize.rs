//! Reshapes raw AccuWeather documents into the frontend payload.
//!
//! Nothing in here fails: missing or malformed fields degrade to `None`,
//! an empty string, or the [`UNAVAILABLE`] sentinel.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use super::models::*;

/// Displayed when a metric value cannot be determined
pub const UNAVAILABLE: &str = "—";

/// City shown when the location lookup has no name
pub const DEFAULT_LOCATION_NAME: &str = "Configured Skyline";

/// How often the frontend should poll, in minutes
pub const REFRESH_INTERVAL_MINUTES: u32 = 15;

/// Numeric coercion for loosely typed provider values.
///
/// Numbers pass through, numeric strings are parsed after trimming (an empty
/// string is zero, `0x`/`0o`/`0b` prefixes are honoured), booleans are 1/0 and
/// null is 0. Arrays, objects and any non-finite result are `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn parse_numeric_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&trimmed[2..], radix)
            .ok()
            .map(|n| n as f64);
    }

    trimmed.parse::<f64>().ok()
}

/// String form of a provider value as a browser would print it; `None` for JSON null
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(js_string(other)),
    }
}

fn js_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string()),
        },
        Value::Array(items) => items.iter().map(js_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// One decimal place, exact binary ties rounded away from zero
fn one_decimal(value: f64) -> String {
    // Adding zero folds -0.0 into 0.0
    let value = value + 0.0;
    match Decimal::from_f64_retain(value) {
        Some(exact) => format!(
            "{:.1}",
            exact.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        ),
        None => format!("{value:.1}"),
    }
}

/// Space-join the non-empty parts
fn join_present<I>(parts: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    parts
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn or_unavailable(display: Option<String>) -> String {
    display
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

/// `"<value to one decimal> <unit>"`, or `None` when the value is not a finite number
pub fn format_metric(metric: Option<&Measurement>) -> Option<String> {
    let metric = metric?;
    let value = coerce_number(metric.value.as_ref()?)?;
    let unit = metric.unit.as_deref().unwrap_or("");
    Some(format!("{} {}", one_decimal(value), unit).trim().to_string())
}

fn metric(key: MetricKey, display: String) -> MetricDisplay {
    MetricDisplay {
        key,
        label: key.label().to_string(),
        display,
    }
}

/// The five metric lines, always in the order pressure, uvIndex, wind, visibility, aqi
pub fn map_metrics(current: Option<&RawCurrentConditions>) -> Vec<MetricDisplay> {
    let pressure = format_metric(current.and_then(RawCurrentConditions::pressure_metric));

    let uv_value = current
        .and_then(|c| c.uv_index.as_ref())
        .and_then(display_value)
        .unwrap_or_else(|| UNAVAILABLE.to_string());
    let uv_text = current
        .and_then(|c| c.uv_index_text.as_deref())
        .filter(|text| !text.is_empty())
        .map(|text| format!("({text})"));
    let uv_index = join_present([Some(uv_value), uv_text]);

    let wind = format_metric(current.and_then(RawCurrentConditions::wind_speed_metric)).map(
        |speed| {
            join_present([
                Some(speed),
                current
                    .and_then(RawCurrentConditions::wind_direction)
                    .map(str::to_string),
            ])
        },
    );

    let visibility = format_metric(current.and_then(RawCurrentConditions::visibility_metric));

    let aqi = current
        .and_then(RawCurrentConditions::air_quality)
        .and_then(|entry| entry.value.as_ref())
        .and_then(display_value);

    vec![
        metric(MetricKey::Pressure, or_unavailable(pressure)),
        metric(MetricKey::UvIndex, or_unavailable(Some(uv_index))),
        metric(MetricKey::Wind, or_unavailable(wind)),
        metric(MetricKey::Visibility, or_unavailable(visibility)),
        metric(MetricKey::Aqi, or_unavailable(aqi)),
    ]
}

fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn measurement_number(measurement: Option<&Measurement>) -> Option<f64> {
    measurement?.value.as_ref()?.as_f64()
}

/// Merge the three provider documents into one payload, stamped with the current time
pub fn assemble_payload(
    current: Option<&RawCurrentConditions>,
    forecast: Option<&RawForecast>,
    location: Option<&RawLocation>,
) -> WeatherPayload {
    assemble_payload_at(current, forecast, location, Utc::now())
}

/// [`assemble_payload`] with an explicit clock reading
pub fn assemble_payload_at(
    current: Option<&RawCurrentConditions>,
    forecast: Option<&RawForecast>,
    location: Option<&RawLocation>,
    now: DateTime<Utc>,
) -> WeatherPayload {
    let first_day = forecast.and_then(RawForecast::first_day);
    let day = first_day.as_ref();
    let headline = forecast
        .and_then(RawForecast::headline_text)
        .unwrap_or_default()
        .to_string();

    let city = location
        .and_then(RawLocation::name)
        .unwrap_or(DEFAULT_LOCATION_NAME)
        .to_string();

    let region = [
        location.and_then(RawLocation::administrative_area_name),
        location.and_then(RawLocation::country_name),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");

    let timezone = location
        .and_then(RawLocation::time_zone_name)
        .unwrap_or_default()
        .to_string();

    let local_time = current
        .and_then(|c| c.local_observation_date_time.clone())
        .filter(|t| !t.is_empty())
        .or_else(|| day.and_then(|d| d.date.clone()).filter(|d| !d.is_empty()))
        .unwrap_or_else(|| iso_timestamp(now));

    let forecast_narrative = day
        .and_then(|d| d.day_phrase().or_else(|| d.night_phrase()))
        .map(str::to_string)
        .unwrap_or_else(|| headline.clone());

    WeatherPayload {
        city,
        region,
        timezone,
        local_time,
        temperature: TemperatureBlock {
            current: measurement_number(current.and_then(RawCurrentConditions::temperature_metric)),
            feels_like: measurement_number(current.and_then(RawCurrentConditions::real_feel_metric)),
        },
        conditions: ConditionsBlock {
            description: current
                .and_then(|c| c.weather_text.clone())
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
            narrative: headline,
            is_day_time: current.and_then(|c| c.is_day_time),
            has_precipitation: current.and_then(|c| c.has_precipitation),
            precipitation_type: current
                .and_then(|c| c.precipitation_type.clone())
                .unwrap_or_default(),
            icon: current.and_then(|c| c.weather_icon),
        },
        forecast: ForecastBlock {
            high: measurement_number(day.and_then(DailyForecast::maximum)),
            low: measurement_number(day.and_then(DailyForecast::minimum)),
            narrative: forecast_narrative,
        },
        metrics: map_metrics(current),
        fetched_at: iso_timestamp(now),
        refresh_interval_minutes: REFRESH_INTERVAL_MINUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn current_from(value: Value) -> RawCurrentConditions {
        serde_json::from_value(value).expect("current conditions")
    }

    fn measurement(value: Value, unit: &str) -> Measurement {
        Measurement {
            value: Some(value),
            unit: Some(unit.to_string()),
        }
    }

    fn displays(metrics: &[MetricDisplay]) -> Vec<&str> {
        metrics.iter().map(|m| m.display.as_str()).collect()
    }

    fn sample_current() -> RawCurrentConditions {
        current_from(json!({
            "LocalObservationDateTime": "2026-10-16T09:25:00+10:00",
            "WeatherText": "Mostly sunny",
            "WeatherIcon": 2,
            "HasPrecipitation": false,
            "PrecipitationType": null,
            "IsDayTime": true,
            "Temperature": {
                "Metric": { "Value": 18.3, "Unit": "C", "UnitType": 17 },
                "Imperial": { "Value": 65.0, "Unit": "F", "UnitType": 18 }
            },
            "RealFeelTemperature": {
                "Metric": { "Value": 19.1, "Unit": "C", "Phrase": "Pleasant" }
            },
            "Wind": {
                "Direction": { "Degrees": 315, "Localized": "NW", "English": "NW" },
                "Speed": { "Metric": { "Value": 14.8, "Unit": "km/h" } }
            },
            "UVIndex": 5,
            "UVIndexText": "Moderate",
            "Visibility": { "Metric": { "Value": 16.1, "Unit": "km" } },
            "Pressure": { "Metric": { "Value": 1016.26, "Unit": "mb" } },
            "AirAndPollen": [
                { "Name": "AirQuality", "Value": 23, "Category": "Good" },
                { "Name": "Grass", "Value": 4, "Category": "Low" }
            ]
        }))
    }

    fn sample_forecast() -> RawForecast {
        serde_json::from_value(json!({
            "Headline": { "Text": "Pleasant this weekend", "Severity": 4 },
            "DailyForecasts": [{
                "Date": "2026-10-16T07:00:00+10:00",
                "Temperature": {
                    "Minimum": { "Value": 11.4, "Unit": "C" },
                    "Maximum": { "Value": 23.9, "Unit": "C" }
                },
                "Day": { "LongPhrase": "Sunshine and a few clouds" },
                "Night": { "LongPhrase": "Clear" }
            }]
        }))
        .expect("forecast")
    }

    fn sample_location() -> RawLocation {
        serde_json::from_value(json!({
            "Key": "202440",
            "LocalizedName": "Brisbane",
            "AdministrativeArea": { "LocalizedName": "Queensland" },
            "Country": { "LocalizedName": "Australia" },
            "TimeZone": { "Name": "Australia/Brisbane", "GmtOffset": 10.0 }
        }))
        .expect("location")
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 0, 30, 0).unwrap()
    }

    #[test]
    fn test_format_metric_rounds_to_one_decimal() {
        let m = measurement(json!("12.34"), "mb");
        assert_eq!(format_metric(Some(&m)), Some("12.3 mb".to_string()));

        let m = measurement(json!(1016), "mb");
        assert_eq!(format_metric(Some(&m)), Some("1016.0 mb".to_string()));
    }

    #[test]
    fn test_format_metric_non_numeric_is_none() {
        let m = measurement(json!("abc"), "mb");
        assert_eq!(format_metric(Some(&m)), None);
        assert_eq!(format_metric(Some(&Measurement::default())), None);
        assert_eq!(format_metric(None), None);
    }

    #[test]
    fn test_format_metric_without_unit_is_trimmed() {
        let m = Measurement {
            value: Some(json!(7.26)),
            unit: None,
        };
        assert_eq!(format_metric(Some(&m)), Some("7.3".to_string()));

        let m = measurement(json!(-0.0), "");
        assert_eq!(format_metric(Some(&m)), Some("0.0".to_string()));
    }

    #[test]
    fn test_format_metric_ties_round_away_from_zero() {
        for (value, expected) in [
            (1016.25, "1016.3 mb"),
            (0.25, "0.3 mb"),
            (-1.25, "-1.3 mb"),
            (2.5, "2.5 mb"),
            (1016.26, "1016.3 mb"),
            (0.35, "0.3 mb"),
        ] {
            let m = measurement(json!(value), "mb");
            assert_eq!(format_metric(Some(&m)).as_deref(), Some(expected), "{value}");
        }
    }

    #[test]
    fn test_format_metric_null_value_is_zero() {
        let current = current_from(json!({ "Pressure": { "Metric": { "Value": null, "Unit": "mb" } } }));
        assert_eq!(map_metrics(Some(&current))[0].display, "0.0 mb");

        let current = current_from(json!({ "Pressure": { "Metric": { "Unit": "mb" } } }));
        assert_eq!(map_metrics(Some(&current))[0].display, UNAVAILABLE);
    }

    #[test]
    fn test_map_metrics_numeric_strings() {
        let current = current_from(json!({
            "Pressure": { "Metric": { "Value": "12.34", "Unit": "mb" } },
            "Visibility": { "Metric": { "Value": " 9 ", "Unit": "km" } },
            "Wind": { "Speed": { "Metric": { "Value": "abc", "Unit": "km/h" } } }
        }));
        let metrics = map_metrics(Some(&current));
        assert_eq!(metrics[0].display, "12.3 mb");
        assert_eq!(metrics[2].display, UNAVAILABLE);
        assert_eq!(metrics[3].display, "9.0 km");
    }

    #[test]
    fn test_aqi_non_scalar_values() {
        let current = current_from(json!({ "AirAndPollen": [{ "Name": "AirQuality", "Value": [1, 2] }] }));
        assert_eq!(map_metrics(Some(&current))[4].display, "1,2");

        let current = current_from(json!({ "AirAndPollen": [{ "Name": "AirQuality", "Value": { "Index": 3 } }] }));
        assert_eq!(map_metrics(Some(&current))[4].display, "[object Object]");
    }

    #[test]
    fn test_malformed_first_day_is_not_replaced() {
        let forecast: RawForecast = serde_json::from_value(json!({
            "DailyForecasts": [
                null,
                {
                    "Date": "2026-10-17T07:00:00+10:00",
                    "Temperature": { "Maximum": { "Value": 30.0, "Unit": "C" } },
                    "Day": { "LongPhrase": "Tomorrow" }
                }
            ]
        }))
        .unwrap();
        let payload = assemble_payload_at(None, Some(&forecast), None, fixed_now());

        assert!(payload.forecast.high.is_none());
        assert!(payload.forecast.low.is_none());
        assert_eq!(payload.forecast.narrative, "");
        assert_eq!(payload.local_time, "2026-10-16T00:30:00.000Z");
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(3.5)), Some(3.5));
        assert_eq!(coerce_number(&json!(" 42 ")), Some(42.0));
        assert_eq!(coerce_number(&json!("")), Some(0.0));
        assert_eq!(coerce_number(&json!("0x1A")), Some(26.0));
        assert_eq!(coerce_number(&json!(true)), Some(1.0));
        assert_eq!(coerce_number(&json!("Infinity")), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!("12px")), None);
        assert_eq!(coerce_number(&json!(null)), Some(0.0));
        assert_eq!(coerce_number(&json!([1])), None);
    }

    #[test]
    fn test_map_metrics_empty_input() {
        for metrics in [
            map_metrics(None),
            map_metrics(Some(&RawCurrentConditions::default())),
        ] {
            let keys: Vec<MetricKey> = metrics.iter().map(|m| m.key).collect();
            assert_eq!(
                keys,
                vec![
                    MetricKey::Pressure,
                    MetricKey::UvIndex,
                    MetricKey::Wind,
                    MetricKey::Visibility,
                    MetricKey::Aqi
                ]
            );
            assert_eq!(displays(&metrics), vec![UNAVAILABLE; 5]);
        }
    }

    #[test]
    fn test_map_metrics_full_sample() {
        let metrics = map_metrics(Some(&sample_current()));
        assert_eq!(
            displays(&metrics),
            vec!["1016.3 mb", "5 (Moderate)", "14.8 km/h NW", "16.1 km", "23"]
        );
        let labels: Vec<&str> = metrics.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Pressure", "UV Index", "Wind", "Visibility", "AQI"]);
    }

    #[test]
    fn test_map_metrics_pressure_not_numeric() {
        let current = current_from(json!({ "Pressure": { "Metric": { "Value": "abc", "Unit": "mb" } } }));
        assert_eq!(map_metrics(Some(&current))[0].display, UNAVAILABLE);

        let current = current_from(json!({ "Pressure": {} }));
        assert_eq!(map_metrics(Some(&current))[0].display, UNAVAILABLE);
    }

    #[test]
    fn test_wind_with_and_without_direction() {
        let current = current_from(json!({
            "Wind": {
                "Speed": { "Metric": { "Value": 10, "Unit": "km/h" } },
                "Direction": { "Localized": "NW" }
            }
        }));
        assert_eq!(map_metrics(Some(&current))[2].display, "10.0 km/h NW");

        let current = current_from(json!({
            "Wind": { "Speed": { "Metric": { "Value": 10, "Unit": "km/h" } } }
        }));
        assert_eq!(map_metrics(Some(&current))[2].display, "10.0 km/h");
    }

    #[test]
    fn test_wind_direction_without_speed_is_unavailable() {
        let current = current_from(json!({ "Wind": { "Direction": { "Localized": "SE" } } }));
        assert_eq!(map_metrics(Some(&current))[2].display, UNAVAILABLE);
    }

    #[test]
    fn test_uv_index_variants() {
        let current = current_from(json!({ "UVIndexText": "Low" }));
        assert_eq!(map_metrics(Some(&current))[1].display, "— (Low)");

        let current = current_from(json!({ "UVIndex": 0 }));
        assert_eq!(map_metrics(Some(&current))[1].display, "0");

        let current = current_from(json!({ "UVIndex": 7, "UVIndexText": "" }));
        assert_eq!(map_metrics(Some(&current))[1].display, "7");
    }

    #[test]
    fn test_aqi_lookup_is_case_insensitive() {
        for name in ["AirQuality", "airquality", "AIRQUALITY"] {
            let current = current_from(json!({
                "AirAndPollen": [
                    { "Name": "Mold", "Value": 1 },
                    { "Name": name, "Value": 57 }
                ]
            }));
            assert_eq!(map_metrics(Some(&current))[4].display, "57");
        }
    }

    #[test]
    fn test_aqi_missing_or_null() {
        let current = current_from(json!({ "AirAndPollen": [{ "Name": "Grass", "Value": 3 }] }));
        assert_eq!(map_metrics(Some(&current))[4].display, UNAVAILABLE);

        let current = current_from(json!({ "AirAndPollen": "none" }));
        assert_eq!(map_metrics(Some(&current))[4].display, UNAVAILABLE);

        let current = current_from(json!({ "AirAndPollen": [{ "Name": "AirQuality", "Value": null }] }));
        assert_eq!(map_metrics(Some(&current))[4].display, UNAVAILABLE);
    }

    #[test]
    fn test_assemble_payload_all_absent() {
        let payload = assemble_payload_at(None, None, None, fixed_now());

        assert_eq!(payload.city, DEFAULT_LOCATION_NAME);
        assert_eq!(payload.region, "");
        assert_eq!(payload.timezone, "");
        assert_eq!(payload.local_time, "2026-10-16T00:30:00.000Z");
        assert_eq!(payload.fetched_at, "2026-10-16T00:30:00.000Z");
        assert!(payload.temperature.current.is_none());
        assert!(payload.temperature.feels_like.is_none());
        assert!(payload.forecast.high.is_none());
        assert!(payload.forecast.low.is_none());
        assert_eq!(payload.forecast.narrative, "");
        assert_eq!(payload.conditions.description, UNAVAILABLE);
        assert_eq!(payload.conditions.narrative, "");
        assert_eq!(payload.conditions.precipitation_type, "");
        assert!(payload.conditions.icon.is_none());
        assert_eq!(payload.metrics.len(), 5);
        assert_eq!(payload.refresh_interval_minutes, 15);
    }

    #[test]
    fn test_assemble_payload_serializes_every_field() {
        let payload = assemble_payload_at(None, None, None, fixed_now());
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["temperature"]["current"], Value::Null);
        assert_eq!(value["temperature"]["feelsLike"], Value::Null);
        assert_eq!(value["conditions"]["isDayTime"], Value::Null);
        assert_eq!(value["conditions"]["icon"], Value::Null);
        assert_eq!(value["forecast"]["high"], Value::Null);
        assert_eq!(value["metrics"][1]["key"], json!("uvIndex"));
        assert_eq!(value["refreshIntervalMinutes"], json!(15));
        assert!(value.get("fetchedAt").is_some());
        assert!(value.get("localTime").is_some());
    }

    #[test]
    fn test_region_join() {
        let location: RawLocation = serde_json::from_value(json!({
            "AdministrativeArea": { "LocalizedName": "Queensland" }
        }))
        .unwrap();
        let payload = assemble_payload_at(None, None, Some(&location), fixed_now());
        assert_eq!(payload.region, "Queensland");

        let payload = assemble_payload_at(None, None, Some(&sample_location()), fixed_now());
        assert_eq!(payload.region, "Queensland, Australia");
    }

    #[test]
    fn test_assemble_payload_full_sample() {
        let current = sample_current();
        let forecast = sample_forecast();
        let location = sample_location();
        let payload =
            assemble_payload_at(Some(&current), Some(&forecast), Some(&location), fixed_now());

        assert_eq!(payload.city, "Brisbane");
        assert_eq!(payload.timezone, "Australia/Brisbane");
        assert_eq!(payload.local_time, "2026-10-16T09:25:00+10:00");
        assert_eq!(payload.temperature.current, Some(18.3));
        assert_eq!(payload.temperature.feels_like, Some(19.1));
        assert_eq!(payload.conditions.description, "Mostly sunny");
        assert_eq!(payload.conditions.narrative, "Pleasant this weekend");
        assert_eq!(payload.conditions.is_day_time, Some(true));
        assert_eq!(payload.conditions.has_precipitation, Some(false));
        assert_eq!(payload.conditions.precipitation_type, "");
        assert_eq!(payload.conditions.icon, Some(2));
        assert_eq!(payload.forecast.high, Some(23.9));
        assert_eq!(payload.forecast.low, Some(11.4));
        assert_eq!(payload.forecast.narrative, "Sunshine and a few clouds");
        assert_eq!(payload.metrics[0].display, "1016.3 mb");
    }

    #[test]
    fn test_local_time_falls_back_to_forecast_date() {
        let forecast = sample_forecast();
        let payload = assemble_payload_at(
            Some(&RawCurrentConditions::default()),
            Some(&forecast),
            None,
            fixed_now(),
        );
        assert_eq!(payload.local_time, "2026-10-16T07:00:00+10:00");
    }

    #[test]
    fn test_forecast_narrative_fallback_chain() {
        let forecast: RawForecast = serde_json::from_value(json!({
            "Headline": { "Text": "Storms later" },
            "DailyForecasts": [{ "Day": { "LongPhrase": "" }, "Night": { "LongPhrase": "Clearing" } }]
        }))
        .unwrap();
        let payload = assemble_payload_at(None, Some(&forecast), None, fixed_now());
        assert_eq!(payload.forecast.narrative, "Clearing");

        let forecast: RawForecast = serde_json::from_value(json!({
            "Headline": { "Text": "Storms later" },
            "DailyForecasts": [{}]
        }))
        .unwrap();
        let payload = assemble_payload_at(None, Some(&forecast), None, fixed_now());
        assert_eq!(payload.forecast.narrative, "Storms later");
    }
}
