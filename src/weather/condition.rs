//! Weather conditions and their effect on the courier

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current weather condition.
///
/// Conditions come from the city feed by name; names outside the known set
/// are kept as `Other` and behave like clear weather.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WeatherCondition {
    Clear,
    Clouds,
    RainLight,
    Rain,
    Storm,
    Fog,
    Wind,
    Heat,
    Other(String),
}

impl WeatherCondition {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Clear => "clear",
            Self::Clouds => "clouds",
            Self::RainLight => "rain_light",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Fog => "fog",
            Self::Wind => "wind",
            Self::Heat => "heat",
            Self::Other(name) => name,
        }
    }

    /// Movement speed multiplier (1.0 = normal)
    pub fn speed_multiplier(&self) -> f64 {
        match self {
            Self::Clear => 1.00,
            Self::Clouds => 0.98,
            Self::RainLight => 0.90,
            Self::Rain => 0.85,
            Self::Storm => 0.75,
            Self::Fog => 0.88,
            Self::Wind => 0.92,
            Self::Heat => 0.90,
            Self::Other(_) => 1.00,
        }
    }

    /// Extra stamina spent per step on top of the base cost
    pub fn stamina_surcharge(&self) -> f64 {
        match self {
            Self::Rain | Self::Wind => 0.1,
            Self::Storm => 0.3,
            Self::Heat => 0.2,
            _ => 0.0,
        }
    }
}

impl Default for WeatherCondition {
    fn default() -> Self {
        Self::Clear
    }
}

impl From<&str> for WeatherCondition {
    fn from(name: &str) -> Self {
        match name {
            "clear" => Self::Clear,
            "clouds" => Self::Clouds,
            "rain_light" => Self::RainLight,
            "rain" => Self::Rain,
            "storm" => Self::Storm,
            "fog" => Self::Fog,
            "wind" => Self::Wind,
            "heat" => Self::Heat,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for WeatherCondition {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<WeatherCondition> for String {
    fn from(condition: WeatherCondition) -> Self {
        condition.as_str().to_string()
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_multipliers() {
        assert_eq!(WeatherCondition::Clear.speed_multiplier(), 1.0);
        assert_eq!(WeatherCondition::Storm.speed_multiplier(), 0.75);
        assert_eq!(WeatherCondition::from("hail").speed_multiplier(), 1.0);
    }

    #[test]
    fn test_rain_light_has_no_surcharge() {
        assert_eq!(WeatherCondition::RainLight.stamina_surcharge(), 0.0);
        assert_eq!(WeatherCondition::Rain.stamina_surcharge(), 0.1);
        assert_eq!(WeatherCondition::Heat.stamina_surcharge(), 0.2);
    }

    #[test]
    fn test_names_survive_serde() {
        let json = serde_json::to_string(&WeatherCondition::RainLight).unwrap();
        assert_eq!(json, "\"rain_light\"");
        let back: WeatherCondition = serde_json::from_str("\"hail\"").unwrap();
        assert_eq!(back, WeatherCondition::Other("hail".into()));
    }
}
