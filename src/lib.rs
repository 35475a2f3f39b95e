//! delivery-pricer core
//!
//! Delivery price estimation around a regional hub city: a flat base
//! price by parcel size plus a per-kilometer surcharge from the nearest
//! city exit point, with a discounted tariff when the destination lies
//! near a scheduled wholesale route on the chosen day of week.

pub mod geo;
pub mod exits;
pub mod locality;
pub mod geocode;
pub mod routing;
pub mod cache;
pub mod resolver;
pub mod catalog;
pub mod matcher;
pub mod pricing;
pub mod config;
pub mod quote;
