//! Harvest intake models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::SkyCondition;

/// Parameters of one harvest intake, as entered by the operator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestInput {
    /// Farmer group submitting the harvest
    #[serde(default = "default_group_name")]
    pub group_name: String,
    /// Raw cherry weight in kilograms
    pub quantity_kg: Decimal,
    pub method: ProcessingMethod,
    #[serde(default)]
    pub equipment: DryingEquipment,
    /// Sky condition observed at intake; recorded for reporting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<SkyCondition>,
    /// First day of production
    pub start_date: NaiveDate,
}

pub fn default_group_name() -> String {
    "Anonim".to_string()
}

/// Coffee processing methods used by the cooperative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMethod {
    Fullwash,
    Honey,
    Natural,
}

impl ProcessingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMethod::Fullwash => "fullwash",
            ProcessingMethod::Honey => "honey",
            ProcessingMethod::Natural => "natural",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fullwash" => Some(ProcessingMethod::Fullwash),
            "honey" => Some(ProcessingMethod::Honey),
            "natural" => Some(ProcessingMethod::Natural),
            _ => None,
        }
    }

    /// Fraction of raw cherry weight expected to remain as finished product
    pub fn recovery_ratio(&self) -> Decimal {
        match self {
            ProcessingMethod::Fullwash => Decimal::new(16, 2),
            ProcessingMethod::Honey => Decimal::new(18, 2),
            ProcessingMethod::Natural => Decimal::new(20, 2),
        }
    }

    /// Fermentation duration in days
    pub fn fermentation_days(&self) -> u32 {
        match self {
            ProcessingMethod::Fullwash => 3,
            ProcessingMethod::Honey => 2,
            ProcessingMethod::Natural => 1,
        }
    }

    /// Nominal sun-drying duration in days, before the equipment factor
    pub fn drying_base_days(&self) -> u32 {
        match self {
            ProcessingMethod::Fullwash => 9,
            ProcessingMethod::Honey => 18,
            ProcessingMethod::Natural => 30,
        }
    }
}

impl std::fmt::Display for ProcessingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Drying aid available to the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DryingEquipment {
    #[default]
    Manual,
    Greenhouse,
}

impl DryingEquipment {
    pub fn as_str(&self) -> &'static str {
        match self {
            DryingEquipment::Manual => "manual",
            DryingEquipment::Greenhouse => "greenhouse",
        }
    }

    /// Multiplier applied to the nominal drying duration
    pub fn drying_factor(&self) -> Decimal {
        match self {
            DryingEquipment::Manual => Decimal::ONE,
            DryingEquipment::Greenhouse => Decimal::new(8, 1),
        }
    }
}

impl std::fmt::Display for DryingEquipment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
