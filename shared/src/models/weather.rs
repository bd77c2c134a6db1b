//! Sky condition model and WMO weather code mapping

use serde::{Deserialize, Serialize};

/// Sky condition over the drying yard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkyCondition {
    #[serde(rename = "cerah")]
    Clear,
    #[serde(rename = "mendung")]
    Overcast,
    #[serde(rename = "hujan")]
    Rainy,
}

/// WMO codes reported as cloudy/foggy conditions
const OVERCAST_CODES: &[u32] = &[1, 2, 3, 45, 48];

/// WMO codes reported as drizzle, rain, showers, or thunderstorms
const RAIN_CODES: &[u32] = &[
    51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 80, 81, 82, 95, 96, 99,
];

impl SkyCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkyCondition::Clear => "cerah",
            SkyCondition::Overcast => "mendung",
            SkyCondition::Rainy => "hujan",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cerah" => Some(SkyCondition::Clear),
            "mendung" => Some(SkyCondition::Overcast),
            "hujan" => Some(SkyCondition::Rainy),
            _ => None,
        }
    }

    /// Classify a WMO weather code into the three conditions the
    /// cooperative plans around. Unknown codes count as clear.
    pub fn from_wmo_code(code: u32) -> Self {
        if RAIN_CODES.contains(&code) {
            SkyCondition::Rainy
        } else if OVERCAST_CODES.contains(&code) {
            SkyCondition::Overcast
        } else {
            SkyCondition::Clear
        }
    }
}

impl std::fmt::Display for SkyCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
