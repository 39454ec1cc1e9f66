//! Validation utilities for the Farm Operations Platform

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::FcrBenchmarks;

// ============================================================================
// Stock and Ledger Validations
// ============================================================================

/// Validate a ledger quantity (must be strictly positive)
pub fn validate_quantity(quantity_kg: Decimal) -> Result<(), &'static str> {
    if quantity_kg <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a unit price (non-negative)
pub fn validate_unit_cost(unit_cost: Decimal) -> Result<(), &'static str> {
    if unit_cost < Decimal::ZERO {
        return Err("Unit cost cannot be negative");
    }
    Ok(())
}

/// Validate a reorder threshold (non-negative)
pub fn validate_reorder_threshold(threshold_kg: Decimal) -> Result<(), &'static str> {
    if threshold_kg < Decimal::ZERO {
        return Err("Reorder threshold cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Batch and Sampling Validations
// ============================================================================

/// Validate a bird count (must be strictly positive at batch creation)
pub fn validate_bird_count(count: i32) -> Result<(), &'static str> {
    if count <= 0 {
        return Err("Bird count must be positive");
    }
    Ok(())
}

/// Validate a mortality record against the current live count
pub fn validate_mortality(count: i32, current_birds: i32) -> Result<(), &'static str> {
    if count <= 0 {
        return Err("Mortality count must be positive");
    }
    if count > current_birds {
        return Err("Mortality cannot exceed the current bird count");
    }
    Ok(())
}

/// Validate a weight sample
pub fn validate_weight_sample(
    sample_size: i32,
    avg_weight_kg: Decimal,
    sample_date: NaiveDate,
    arrival_date: NaiveDate,
) -> Result<(), &'static str> {
    if sample_size <= 0 {
        return Err("Sample size must be positive");
    }
    if avg_weight_kg <= Decimal::ZERO {
        return Err("Average weight must be positive");
    }
    if sample_date < arrival_date {
        return Err("Sample date cannot precede the batch arrival date");
    }
    Ok(())
}

// ============================================================================
// Analytics Validations
// ============================================================================

/// Validate an FCR benchmark table (thresholds strictly ascending)
pub fn validate_benchmarks(benchmarks: &FcrBenchmarks) -> Result<(), &'static str> {
    if benchmarks.excellent <= Decimal::ZERO {
        return Err("Benchmark thresholds must be positive");
    }
    if !benchmarks.is_ordered() {
        return Err("Benchmark thresholds must be strictly ascending");
    }
    Ok(())
}
