//! Business logic services for the Farm Operations Platform

pub mod analytics;
pub mod batch;
pub mod ledger;
pub mod lot;
pub mod weight;

pub use analytics::AnalyticsService;
pub use batch::BatchService;
pub use ledger::LedgerService;
pub use lot::LotService;
pub use weight::WeightService;
