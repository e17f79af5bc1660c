use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Field name to human-readable message, sorted by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`. The first message for a field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum HumidityError {
    #[error("Method not allowed: {method}")]
    MethodNotAllowed { method: String },

    #[error("Invalid input data ({0})")]
    Validation(FieldErrors),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("{0}")]
    Service(String),
}

impl HumidityError {
    /// HTTP status the endpoint reports for this error. Anything the caller
    /// can fix (a bad field, a provider id outside the closed set) is a 400;
    /// only failures inside a resolved strategy are a 500.
    pub fn status_code(&self) -> u16 {
        match self {
            HumidityError::MethodNotAllowed { .. } => 405,
            HumidityError::Validation(_) | HumidityError::UnsupportedProvider(_) => 400,
            HumidityError::Service(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_keep_first_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("latitude", "first");
        errors.add("latitude", "second");
        errors.add("date", "bad date");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("latitude"), Some("first"));
        assert_eq!(errors.to_string(), "date: bad date; latitude: first");
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        let method = HumidityError::MethodNotAllowed {
            method: "GET".into(),
        };
        assert_eq!(method.status_code(), 405);
        assert_eq!(HumidityError::Validation(FieldErrors::new()).status_code(), 400);
        assert_eq!(HumidityError::UnsupportedProvider("x".into()).status_code(), 400);
        assert_eq!(HumidityError::Service("boom".into()).status_code(), 500);
    }

    #[test]
    fn unsupported_provider_names_the_id() {
        let err = HumidityError::UnsupportedProvider("darksky".into());
        assert!(err.to_string().contains("darksky"));
    }
}
