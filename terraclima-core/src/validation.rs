//! Request validation. Turns an untyped JSON body into a [`WeatherQuery`] or
//! reports every offending field at once.

use chrono::{DateTime, Days, Local, NaiveDate};
use serde_json::{Map, Value};

use crate::{
    error::FieldErrors,
    model::{Coordinate, DATE_FORMAT, WeatherQuery},
    provider::ProviderId,
};

/// How far ahead of today a query may look, inclusive.
pub const MAX_DAYS_AHEAD: u64 = 7;

/// Validates against the local calendar date at call time, so a body that
/// passes today may fail tomorrow.
pub fn validate(raw: &Value) -> Result<WeatherQuery, FieldErrors> {
    validate_on(raw, Local::now().date_naive())
}

pub fn validate_on(raw: &Value, today: NaiveDate) -> Result<WeatherQuery, FieldErrors> {
    let mut errors = FieldErrors::new();

    let Some(body) = raw.as_object() else {
        errors.add("body", "Request body must be a JSON object");
        return Err(errors);
    };

    let latitude = bounded_number(body, "latitude", "Latitude", 90.0, &mut errors);
    let longitude = bounded_number(body, "longitude", "Longitude", 180.0, &mut errors);
    let date = date_in_window(body.get("date"), today, &mut errors);
    let provider = provider_id(body.get("provider"), &mut errors);

    match (latitude, longitude, date, provider) {
        (Some(latitude), Some(longitude), Some(date), Some(provider)) if errors.is_empty() => {
            Ok(WeatherQuery {
                location: Coordinate::new(latitude, longitude),
                date,
                provider,
            })
        }
        _ => Err(errors),
    }
}

fn bounded_number(
    body: &Map<String, Value>,
    field: &str,
    label: &str,
    limit: f64,
    errors: &mut FieldErrors,
) -> Option<f64> {
    let Some(value) = body.get(field).and_then(Value::as_f64) else {
        errors.add(field, format!("{label} is required and must be a number"));
        return None;
    };

    if !(-limit..=limit).contains(&value) {
        errors.add(field, format!("{label} must be between -{limit} and {limit}"));
        return None;
    }

    Some(value)
}

fn date_in_window(
    value: Option<&Value>,
    today: NaiveDate,
    errors: &mut FieldErrors,
) -> Option<NaiveDate> {
    let raw = value
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if raw.is_empty() {
        errors.add("date", "Date is required");
        return None;
    }

    let Some(date) = parse_date(raw) else {
        errors.add("date", "Date must be a valid ISO date (YYYY-MM-DD)");
        return None;
    };

    let latest = today
        .checked_add_days(Days::new(MAX_DAYS_AHEAD))
        .unwrap_or(NaiveDate::MAX);
    if date < today || date > latest {
        errors.add(
            "date",
            format!("Date must be between today and the next {MAX_DAYS_AHEAD} days"),
        );
        return None;
    }

    Some(date)
}

/// Accepts a plain calendar date or an RFC 3339 timestamp. A timestamp keeps
/// only its calendar date in its own offset; the time of day is dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn provider_id(value: Option<&Value>, errors: &mut FieldErrors) -> Option<ProviderId> {
    let found = value
        .and_then(Value::as_str)
        .and_then(|s| ProviderId::all().iter().copied().find(|id| id.as_str() == s));

    if found.is_none() {
        let allowed: Vec<_> = ProviderId::all().iter().map(ProviderId::as_str).collect();
        errors.add("provider", format!("Provider must be one of: {}", allowed.join(", ")));
    }

    found
}
