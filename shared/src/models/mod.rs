//! Domain models for the Farm Operations Platform

mod batch;
mod fcr;
mod ledger;
mod lot;
mod weight;

pub use batch::*;
pub use fcr::*;
pub use ledger::*;
pub use lot::*;
pub use weight::*;
