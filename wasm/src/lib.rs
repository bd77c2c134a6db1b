//! WebAssembly module for the Kopi Nglurah production tracker
//!
//! Provides client-side computation for:
//! - Schedule estimation
//! - Yield calculation
//! - Harvest form validation
//! - WMO weather code classification
//! - The session-scoped view state the dashboard keeps between renders

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use shared::{
    estimator, validate_harvest_input, Batch, EstimationResult, HarvestInput, ProcessingMethod,
    SkyCondition, Stage,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Run the schedule estimator on a harvest form encoded as JSON
#[wasm_bindgen]
pub fn estimate_schedule(input_json: &str) -> Result<String, JsValue> {
    run_estimate(input_json).map_err(|e| JsValue::from_str(&e))
}

fn run_estimate(input_json: &str) -> Result<String, String> {
    let input: HarvestInput = serde_json::from_str(input_json)
        .map_err(|e| format!("Invalid harvest JSON: {}", e))?;
    validate_harvest_input(&input).map_err(str::to_string)?;

    let result = estimator::estimate(&input).map_err(|e| e.to_string())?;
    serde_json::to_string(&result).map_err(|e| format!("Serialization failed: {}", e))
}

/// Expected finished product in kilograms for a harvest
#[wasm_bindgen]
pub fn estimated_yield(quantity_kg: f64, method: &str) -> f64 {
    let Some(method) = ProcessingMethod::from_str(method) else {
        return 0.0;
    };
    let quantity = Decimal::from_f64_retain(quantity_kg).unwrap_or_default();
    estimator::estimated_yield_kg(quantity, method)
        .to_f64()
        .unwrap_or(0.0)
}

/// Validate raw cherry weight before submitting the form
#[wasm_bindgen]
pub fn validate_harvest_quantity(quantity_kg: f64) -> bool {
    quantity_kg > 0.0
}

/// Classify a WMO weather code into cerah / mendung / hujan
#[wasm_bindgen]
pub fn classify_wmo_code(code: u32) -> String {
    SkyCondition::from_wmo_code(code).as_str().to_string()
}

/// Display label for a stage wire name; unknown names echo back
#[wasm_bindgen]
pub fn stage_label(stage: &str) -> String {
    match Stage::from_str(stage) {
        Some(stage) => stage.label().to_string(),
        None => stage.to_string(),
    }
}

/// Session-scoped view state. The dashboard holds one per page load and
/// drops it on navigation; nothing here is shared across sessions.
#[wasm_bindgen]
pub struct ClientSession {
    last_estimation: Option<EstimationResult>,
    active_batches: Vec<Batch>,
}

#[wasm_bindgen]
impl ClientSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ClientSession {
        ClientSession {
            last_estimation: None,
            active_batches: Vec::new(),
        }
    }

    /// Run the estimator and remember the result for later export
    pub fn estimate(&mut self, input_json: &str) -> Result<String, JsValue> {
        let output = run_estimate(input_json).map_err(|e| JsValue::from_str(&e))?;
        self.last_estimation = serde_json::from_str(&output).ok();
        Ok(output)
    }

    /// Last computed estimation as JSON, if any
    pub fn last_estimation(&self) -> Option<String> {
        self.last_estimation
            .as_ref()
            .and_then(|result| serde_json::to_string(result).ok())
    }

    /// Replace the cached active-batch list with a freshly listed one
    pub fn cache_batches(&mut self, batches_json: &str) -> Result<(), JsValue> {
        self.active_batches = serde_json::from_str(batches_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid batch list JSON: {}", e)))?;
        Ok(())
    }

    /// Look up one cached batch by id, for the update modal
    pub fn cached_batch(&self, batch_id: &str) -> Option<String> {
        self.active_batches
            .iter()
            .find(|batch| batch.id == batch_id)
            .and_then(|batch| serde_json::to_string(batch).ok())
    }

    pub fn cached_batch_count(&self) -> usize {
        self.active_batches.len()
    }

    /// Forget everything; called on navigation away from the dashboard
    pub fn clear(&mut self) {
        self.last_estimation = None;
        self.active_batches.clear();
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}
