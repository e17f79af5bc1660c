//! Humidity classification: severity tiers, their colors and the survival
//! narrative attached to every reading.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fictional era every survival bulletin is dated in.
pub const ERA_YEAR: &str = "2087";

/// Six contiguous humidity bands, driest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Critical,
    Dangerous,
    Warning,
    Moderate,
    Good,
    Excellent,
}

impl SeverityTier {
    /// Upper-inclusive thresholds; anything above 85 is excellent.
    /// NaN is treated as the driest band.
    pub fn classify(humidity: f64) -> Self {
        if humidity.is_nan() || humidity <= 25.0 {
            SeverityTier::Critical
        } else if humidity <= 40.0 {
            SeverityTier::Dangerous
        } else if humidity <= 55.0 {
            SeverityTier::Warning
        } else if humidity <= 70.0 {
            SeverityTier::Moderate
        } else if humidity <= 85.0 {
            SeverityTier::Good
        } else {
            SeverityTier::Excellent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityTier::Critical => "critical",
            SeverityTier::Dangerous => "dangerous",
            SeverityTier::Warning => "warning",
            SeverityTier::Moderate => "moderate",
            SeverityTier::Good => "good",
            SeverityTier::Excellent => "excellent",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            SeverityTier::Critical => "#dc2626",
            SeverityTier::Dangerous => "#ea580c",
            SeverityTier::Warning => "#d97706",
            SeverityTier::Moderate => "#65a30d",
            SeverityTier::Good => "#16a34a",
            SeverityTier::Excellent => "#059669",
        }
    }

    pub const fn all() -> &'static [SeverityTier] {
        &[
            SeverityTier::Critical,
            SeverityTier::Dangerous,
            SeverityTier::Warning,
            SeverityTier::Moderate,
            SeverityTier::Good,
            SeverityTier::Excellent,
        ]
    }

    /// Renders this tier's bulletin for an already formatted humidity value.
    fn bulletin(&self, humidity: &str, date: &str) -> String {
        match self {
            SeverityTier::Critical => format!(
                "🚨 RED ALERT - {date}, {ERA_YEAR}. Critical humidity of {humidity}%. \
                 The air is too dry for prolonged survival. Seek shelter immediately."
            ),
            SeverityTier::Dangerous => format!(
                "⚠️ EXTREME DANGER - {date}, {ERA_YEAR}. Dangerous humidity of {humidity}%. \
                 The soil is too dry for cultivation. Conserve water at all costs."
            ),
            SeverityTier::Warning => format!(
                "🟡 CAUTION - {date}, {ERA_YEAR}. Humidity of {humidity}%. \
                 Marginal conditions for cultivation. Consider water conservation techniques."
            ),
            SeverityTier::Moderate => format!(
                "🟠 SURVIVAL POSSIBLE - {date}, {ERA_YEAR}. Humidity of {humidity}%. \
                 Acceptable conditions for basic cultivation. Stay constantly vigilant."
            ),
            SeverityTier::Good => format!(
                "🟢 HOPE - {date}, {ERA_YEAR}. Humidity of {humidity}%. \
                 Good conditions for cultivation! This area can sustain life."
            ),
            SeverityTier::Excellent => format!(
                "✨ OASIS FOUND - {date}, {ERA_YEAR}. Excellent humidity of {humidity}%. \
                 Ideal conditions! This place could be the key to rebuilding."
            ),
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color of the band `humidity` falls in.
pub fn humidity_color(humidity: f64) -> &'static str {
    SeverityTier::classify(humidity).color()
}

/// Survival bulletin for `humidity` on `date`. The value is rounded to two
/// decimals before it is classified and printed.
pub fn survival_message(humidity: f64, date: &str) -> String {
    let rounded = round_hundredths(humidity);
    SeverityTier::classify(rounded).bulletin(&rounded.to_string(), date)
}

pub(crate) fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Humidity thresholds that matter for growing food.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurvivalConfig {
    pub min_humidity_for_cultivation: f64,
    pub optimal_humidity_range: (f64, f64),
    pub critical_humidity_threshold: f64,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            min_humidity_for_cultivation: 35.0,
            optimal_humidity_range: (60.0, 80.0),
            critical_humidity_threshold: 25.0,
        }
    }
}

impl SurvivalConfig {
    pub fn is_cultivable(&self, humidity: f64) -> bool {
        humidity >= self.min_humidity_for_cultivation
    }

    pub fn is_optimal(&self, humidity: f64) -> bool {
        let (low, high) = self.optimal_humidity_range;
        (low..=high).contains(&humidity)
    }

    pub fn is_critical(&self, humidity: f64) -> bool {
        humidity <= self.critical_humidity_threshold
    }
}
