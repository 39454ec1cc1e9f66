//! HTTP handlers for the Farm Operations Platform

mod analytics;
mod batch;
mod health;
mod ledger;
mod lot;
mod weight;

pub use analytics::*;
pub use batch::*;
pub use health::*;
pub use ledger::*;
pub use lot::*;
pub use weight::*;
