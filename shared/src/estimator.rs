//! Production schedule estimation
//!
//! Pure, deterministic forecast of stage durations, a date-sequenced
//! schedule, and a yield estimate from harvest parameters. Drying duration
//! follows the equipment-weighted model: nominal days per method scaled by
//! the drying-aid factor, ceiling-rounded. The recorded sky condition does
//! not change the forecast.

use chrono::Duration;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::models::{
    DryingEquipment, EstimationResult, HarvestInput, ProcessingMethod, ScheduleEntry, Stage,
};

/// Manual roasting throughput in kilograms per day
pub const MANUAL_ROAST_KG_PER_DAY: u32 = 5;

/// Rejection reasons for estimation input
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EstimationError {
    #[error("harvest quantity must be positive")]
    NonPositiveQuantity,
    #[error("harvest quantity is too large to schedule")]
    QuantityOutOfRange,
}

/// Duration of every pipeline stage in days, before the one-day floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDurations {
    pub sorting: u32,
    pub fermentation: u32,
    pub drying: u32,
    pub roasting: u32,
    pub packing: u32,
}

impl StageDurations {
    pub fn for_stage(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Sorting => self.sorting,
            Stage::Fermentation => self.fermentation,
            Stage::Drying => self.drying,
            Stage::Roasting => self.roasting,
            Stage::Packing => self.packing,
        }
    }
}

/// Compute per-stage durations from harvest parameters
pub fn stage_durations(input: &HarvestInput) -> Result<StageDurations, EstimationError> {
    if input.quantity_kg <= Decimal::ZERO {
        return Err(EstimationError::NonPositiveQuantity);
    }

    let drying = (Decimal::from(input.method.drying_base_days()) * input.equipment.drying_factor())
        .ceil()
        .to_u32()
        .ok_or(EstimationError::QuantityOutOfRange)?;

    let roasting = match input.equipment {
        DryingEquipment::Manual => (input.quantity_kg / Decimal::from(MANUAL_ROAST_KG_PER_DAY))
            .ceil()
            .to_u32()
            .ok_or(EstimationError::QuantityOutOfRange)?,
        DryingEquipment::Greenhouse => 1,
    };

    Ok(StageDurations {
        sorting: 1,
        fermentation: input.method.fermentation_days(),
        drying,
        roasting,
        packing: 1,
    })
}

/// Expected finished product for a harvest, rounded to whole kilograms
pub fn estimated_yield_kg(quantity_kg: Decimal, method: ProcessingMethod) -> Decimal {
    (quantity_kg * method.recovery_ratio())
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Estimate the full production schedule for a harvest.
///
/// Walks the fixed stage order from the start date. Each stage begins the
/// day after the previous one ends; a stage occupies at least one calendar
/// day even when its computed duration is shorter, while the reported
/// duration keeps the raw value.
pub fn estimate(input: &HarvestInput) -> Result<EstimationResult, EstimationError> {
    let durations = stage_durations(input)?;

    let mut schedule = Vec::with_capacity(Stage::ALL.len());
    let mut cursor = input.start_date;
    let mut total_days = 0u32;

    for stage in Stage::ALL {
        let duration_days = durations.for_stage(stage);
        let occupied_days = duration_days.max(1);
        let start_date = cursor;
        let end_date = start_date + Duration::days(i64::from(occupied_days) - 1);

        schedule.push(ScheduleEntry {
            stage,
            start_date,
            end_date,
            duration_days,
        });

        cursor = end_date + Duration::days(1);
        total_days += duration_days;
    }

    // The cursor sits one day past the last stage
    let completion_date = cursor - Duration::days(1);

    Ok(EstimationResult {
        schedule,
        completion_date,
        total_days,
        estimated_yield_kg: estimated_yield_kg(input.quantity_kg, input.method),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkyCondition;
    use chrono::NaiveDate;

    fn input(
        quantity: u32,
        method: ProcessingMethod,
        equipment: DryingEquipment,
    ) -> HarvestInput {
        HarvestInput {
            group_name: "Tani Maju".to_string(),
            quantity_kg: Decimal::from(quantity),
            method,
            equipment,
            weather: None,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let mut bad = input(10, ProcessingMethod::Natural, DryingEquipment::Manual);
        bad.quantity_kg = Decimal::ZERO;
        assert_eq!(
            estimate(&bad),
            Err(EstimationError::NonPositiveQuantity)
        );
        bad.quantity_kg = Decimal::from(-3);
        assert_eq!(
            stage_durations(&bad),
            Err(EstimationError::NonPositiveQuantity)
        );
    }

    #[test]
    fn test_fermentation_days_by_method() {
        let d = stage_durations(&input(10, ProcessingMethod::Fullwash, DryingEquipment::Manual))
            .unwrap();
        assert_eq!(d.fermentation, 3);
        let d =
            stage_durations(&input(10, ProcessingMethod::Honey, DryingEquipment::Manual)).unwrap();
        assert_eq!(d.fermentation, 2);
        let d = stage_durations(&input(10, ProcessingMethod::Natural, DryingEquipment::Manual))
            .unwrap();
        assert_eq!(d.fermentation, 1);
    }

    #[test]
    fn test_drying_is_equipment_weighted() {
        // manual keeps the nominal days
        let d = stage_durations(&input(10, ProcessingMethod::Natural, DryingEquipment::Manual))
            .unwrap();
        assert_eq!(d.drying, 30);
        // greenhouse scales by 0.8 with a ceiling
        let d = stage_durations(&input(
            10,
            ProcessingMethod::Natural,
            DryingEquipment::Greenhouse,
        ))
        .unwrap();
        assert_eq!(d.drying, 24);
        let d = stage_durations(&input(
            10,
            ProcessingMethod::Fullwash,
            DryingEquipment::Greenhouse,
        ))
        .unwrap();
        assert_eq!(d.drying, 8); // ceil(9 * 0.8) = ceil(7.2)
        let d = stage_durations(&input(
            10,
            ProcessingMethod::Honey,
            DryingEquipment::Greenhouse,
        ))
        .unwrap();
        assert_eq!(d.drying, 15); // ceil(18 * 0.8) = ceil(14.4)
    }

    #[test]
    fn test_roasting_throughput() {
        let d = stage_durations(&input(23, ProcessingMethod::Natural, DryingEquipment::Manual))
            .unwrap();
        assert_eq!(d.roasting, 5); // ceil(23 / 5)
        let d = stage_durations(&input(
            23,
            ProcessingMethod::Natural,
            DryingEquipment::Greenhouse,
        ))
        .unwrap();
        assert_eq!(d.roasting, 1);
        let d = stage_durations(&input(200, ProcessingMethod::Natural, DryingEquipment::Manual))
            .unwrap();
        assert_eq!(d.roasting, 40);
    }

    #[test]
    fn test_yield_per_method() {
        assert_eq!(
            estimated_yield_kg(Decimal::from(100), ProcessingMethod::Fullwash),
            Decimal::from(16)
        );
        assert_eq!(
            estimated_yield_kg(Decimal::from(100), ProcessingMethod::Honey),
            Decimal::from(18)
        );
        assert_eq!(
            estimated_yield_kg(Decimal::from(100), ProcessingMethod::Natural),
            Decimal::from(20)
        );
        // rounds half away from zero like the paper forms do
        assert_eq!(
            estimated_yield_kg(Decimal::new(125, 1), ProcessingMethod::Fullwash),
            Decimal::from(2)
        );
    }

    #[test]
    fn test_schedule_walks_contiguously() {
        let result = estimate(&input(23, ProcessingMethod::Honey, DryingEquipment::Manual))
            .unwrap();
        assert_eq!(result.schedule.len(), 5);
        for pair in result.schedule.windows(2) {
            assert_eq!(
                pair[1].start_date,
                pair[0].end_date + Duration::days(1)
            );
        }
        // sortasi 1, fermentasi 2, jemur 18, roasting 5, kemas 1
        assert_eq!(result.total_days, 27);
        assert_eq!(
            result.completion_date,
            NaiveDate::from_ymd_opt(2024, 6, 27).unwrap()
        );
        assert_eq!(
            result.completion_date,
            result.schedule.last().unwrap().end_date
        );
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let sample = HarvestInput {
            weather: Some(SkyCondition::Rainy),
            ..input(57, ProcessingMethod::Natural, DryingEquipment::Greenhouse)
        };
        assert_eq!(estimate(&sample), estimate(&sample));
    }
}
