//! WebAssembly module for the Farm Operations Platform
//!
//! Provides client-side computation for:
//! - FCR calculation and performance classification
//! - Stock projection for pending ledger entries
//! - Offline input validation

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Calculate feed conversion ratio. Returns NaN when the gain is not positive,
/// signalling insufficient data rather than a computable ratio.
#[wasm_bindgen]
pub fn calculate_fcr(total_feed_kg: f64, total_weight_gain_kg: f64) -> f64 {
    if total_weight_gain_kg <= 0.0 {
        return f64::NAN;
    }
    total_feed_kg / total_weight_gain_kg
}

/// Classify an FCR value against the standard broiler benchmarks
#[wasm_bindgen]
pub fn classify_fcr_value(fcr: f64) -> String {
    let value = Decimal::try_from(fcr).unwrap_or(Decimal::ZERO);
    let tier = classify_fcr(value, &FcrBenchmarks::broiler());
    format!("{}", tier)
}

/// Classify an FCR value against a custom benchmark table, passed as JSON
/// `{"excellent": ..., "good": ..., "average": ..., "poor": ...}`
#[wasm_bindgen]
pub fn classify_fcr_with_benchmarks(fcr: f64, benchmarks_json: &str) -> Result<String, JsValue> {
    let benchmarks: FcrBenchmarks = serde_json::from_str(benchmarks_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid benchmarks JSON: {}", e)))?;
    if !benchmarks.is_ordered() {
        return Err(JsValue::from_str("Benchmark thresholds must be ascending"));
    }

    let value = Decimal::try_from(fcr).unwrap_or(Decimal::ZERO);
    Ok(format!("{}", classify_fcr(value, &benchmarks)))
}

/// Project a lot's quantity after applying a pending entry, for form preview.
/// Negative results are clamped server-side; here they signal the entry would
/// be rejected.
#[wasm_bindgen]
pub fn project_lot_quantity(current_kg: f64, quantity_kg: f64, is_consumption: bool) -> f64 {
    if is_consumption {
        current_kg - quantity_kg
    } else {
        current_kg + quantity_kg
    }
}

/// Check a pending consumption against the lot's current quantity
#[wasm_bindgen]
pub fn consumption_within_stock(current_kg: f64, quantity_kg: f64) -> bool {
    quantity_kg > 0.0 && quantity_kg <= current_kg
}

/// Calculate daily weight gain per bird (kg/day)
#[wasm_bindgen]
pub fn calculate_daily_gain(weight_gain_kg: f64, age_days: i32) -> f64 {
    if age_days <= 0 {
        return 0.0;
    }
    weight_gain_kg / age_days as f64
}

/// Calculate cumulative mortality percentage for a batch
#[wasm_bindgen]
pub fn calculate_mortality_percent(initial_count: i32, current_count: i32) -> f64 {
    if initial_count <= 0 {
        return 0.0;
    }
    let lost = (initial_count - current_count).max(0);
    (lost as f64 / initial_count as f64) * 100.0
}

/// Validate a weight sample entry before submission
#[wasm_bindgen]
pub fn validate_sample_entry(sample_size: i32, avg_weight_kg: f64) -> bool {
    sample_size > 0 && avg_weight_kg > 0.0
}
