//! Test fixtures for delivery-pricer.
//!
//! Provides realistic Tver-region data: settlements around the hub city
//! and the wholesale route circuits.

pub mod tver_region;

pub use tver_region::*;
