//! End-to-end quote computation and the route-discount session flow.
//!
//! One quote is one user action: geocode the address, short-circuit for
//! in-boundary deliveries, otherwise resolve the round-trip distance and
//! check route proximity concurrently, then apply the pricing rules.
//! Only an empty address or a geocoding miss abort a quote; collaborator
//! outages degrade to fallback data instead.

use chrono::NaiveDate;
use thiserror::Error;

use crate::cache::{DistanceCache, DistanceSource};
use crate::catalog::{weekday_index, RouteCatalog};
use crate::config::PricingConfig;
use crate::exits::{ExitNetwork, ExitPoint};
use crate::geo::Coordinate;
use crate::geocode::{GeocodeError, Geocoder};
use crate::matcher::{RouteMatch, RouteMatcher};
use crate::pricing::{price, ParcelSize, PricingRequest, PricingResult};
use crate::resolver::{DistanceResolver, DistanceTable};
use crate::routing::RoadDistanceProvider;

#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub address: String,
    pub parcel_size: ParcelSize,
    pub delivery_date: NaiveDate,
}

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("delivery address is empty")]
    EmptyAddress,
    #[error("address not found, please clarify")]
    AddressNotFound,
    #[error("geocoding failed: {0}")]
    Geocoding(String),
    #[error("exit network is empty")]
    NoExitPoints,
}

impl From<GeocodeError> for QuoteError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound => Self::AddressNotFound,
            GeocodeError::Service(message) => Self::Geocoding(message),
        }
    }
}

/// Route-discount flow for one (address, date) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountState {
    NoRouteChecked,
    RouteOffered,
    Confirmed,
    Declined,
}

/// Session-scoped discount state, keyed by a fingerprint of the
/// normalized address and delivery date.
///
/// Changing either input resets the flow to `NoRouteChecked`: a discount
/// confirmed for one address/date pair never carries over to another,
/// and a stale route offer is never applied to new inputs.
#[derive(Debug, Clone)]
pub struct QuoteSession {
    fingerprint: u64,
    state: DiscountState,
}

impl Default for QuoteSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteSession {
    pub fn new() -> Self {
        Self {
            fingerprint: 0,
            state: DiscountState::NoRouteChecked,
        }
    }

    pub fn state(&self) -> DiscountState {
        self.state
    }

    pub fn confirmed(&self) -> bool {
        self.state == DiscountState::Confirmed
    }

    /// Accept the offered route discount. No-op while no route has been
    /// offered for the current inputs.
    pub fn confirm(&mut self) {
        if self.state != DiscountState::NoRouteChecked {
            self.state = DiscountState::Confirmed;
        }
    }

    /// Turn the offered route discount down. The offer stays available;
    /// confirming later is still possible until the inputs change.
    pub fn decline(&mut self) {
        if self.state != DiscountState::NoRouteChecked {
            self.state = DiscountState::Declined;
        }
    }

    fn sync(&mut self, fingerprint: u64) {
        if self.fingerprint != fingerprint {
            self.fingerprint = fingerprint;
            self.state = DiscountState::NoRouteChecked;
        }
    }

    fn register_offer(&mut self, offered: bool) {
        if !offered {
            self.state = DiscountState::NoRouteChecked;
        } else if self.state == DiscountState::NoRouteChecked {
            self.state = DiscountState::RouteOffered;
        }
    }
}

/// Fingerprint of the inputs that scope a route-discount confirmation.
fn request_fingerprint(address: &str, date: NaiveDate) -> u64 {
    let key = format!("{}|{}", address.trim().to_lowercase(), date);
    seahash::hash(key.as_bytes())
}

/// A priced delivery quote with the data the caller presents alongside it.
#[derive(Debug, Clone)]
pub struct Quote {
    pub settlement: String,
    pub locality: String,
    pub destination: Coordinate,
    pub within_hub: bool,
    pub exit_point: Option<ExitPoint>,
    /// Straight-line distance to the chosen exit point.
    pub exit_straight_km: Option<f64>,
    pub round_trip_km: f64,
    pub route_offer: Option<RouteMatch>,
    pub discount_state: DiscountState,
    pub pricing: PricingResult,
}

/// Wires the collaborators together for quote computation.
///
/// Everything is borrowed: the service itself is cheap, request-scoped
/// plumbing over process-wide read-mostly configuration.
pub struct QuoteService<'a, G: ?Sized, C: ?Sized, R: ?Sized> {
    geocoder: &'a G,
    exits: &'a ExitNetwork,
    table: &'a DistanceTable,
    cache: &'a C,
    router: &'a R,
    catalog: &'a RouteCatalog,
    config: &'a PricingConfig,
}

impl<'a, G, C, R> QuoteService<'a, G, C, R>
where
    G: Geocoder + ?Sized,
    C: DistanceCache + Sync + ?Sized,
    R: RoadDistanceProvider + Sync + ?Sized,
{
    pub fn new(
        geocoder: &'a G,
        exits: &'a ExitNetwork,
        table: &'a DistanceTable,
        cache: &'a C,
        router: &'a R,
        catalog: &'a RouteCatalog,
        config: &'a PricingConfig,
    ) -> Self {
        Self {
            geocoder,
            exits,
            table,
            cache,
            router,
            catalog,
            config,
        }
    }

    /// Price one delivery request.
    ///
    /// The session carries the route-discount flow across recalculations
    /// of the same inputs; it is re-synced against the request fingerprint
    /// before any other work, so a changed address or date can never reuse
    /// a stale offer or confirmation.
    pub fn quote(
        &self,
        request: &QuoteRequest,
        session: &mut QuoteSession,
    ) -> Result<Quote, QuoteError> {
        if request.address.trim().is_empty() {
            return Err(QuoteError::EmptyAddress);
        }

        session.sync(request_fingerprint(&request.address, request.delivery_date));

        let geocoded = self.geocoder.geocode(&request.address)?;

        if geocoded.within_hub {
            // Flat rate inside the hub boundary: no exit-point, distance,
            // or route-matching work at all.
            session.register_offer(false);
            let pricing = price(
                &PricingRequest {
                    parcel_size: request.parcel_size,
                    locality: geocoded.locality.clone(),
                    destination: geocoded.coord,
                    within_hub: true,
                    distance_km: 0.0,
                    route_match: None,
                    user_confirmed_route_discount: false,
                    distance_source: DistanceSource::InBoundary,
                },
                &self.config.base_prices,
                &self.config.tariffs,
            );
            return Ok(Quote {
                settlement: geocoded.settlement,
                locality: geocoded.locality,
                destination: geocoded.coord,
                within_hub: true,
                exit_point: None,
                exit_straight_km: None,
                round_trip_km: 0.0,
                route_offer: None,
                discount_state: session.state(),
                pricing,
            });
        }

        let (exit, exit_straight_km) = self
            .exits
            .nearest(geocoded.coord)
            .ok_or(QuoteError::NoExitPoints)?;

        let resolver = DistanceResolver::new(self.table, self.cache, self.router);
        let matcher = RouteMatcher::new(self.catalog, self.router, self.config.matcher.clone());
        let weekday = weekday_index(request.delivery_date);
        let destination = geocoded.coord;
        let exit_coord = exit.coord;

        // Distance resolution and route matching are independent; run them
        // side by side since both may issue routing calls.
        let (record, route_offer) = rayon::join(
            || resolver.resolve(&geocoded.locality, exit_coord, destination),
            || matcher.matches(destination, weekday),
        );

        session.register_offer(route_offer.is_some());

        let pricing = price(
            &PricingRequest {
                parcel_size: request.parcel_size,
                locality: geocoded.locality.clone(),
                destination,
                within_hub: false,
                distance_km: record.round_trip_km,
                route_match: route_offer.clone(),
                user_confirmed_route_discount: session.confirmed(),
                distance_source: record.source,
            },
            &self.config.base_prices,
            &self.config.tariffs,
        );

        Ok(Quote {
            settlement: geocoded.settlement,
            locality: geocoded.locality,
            destination,
            within_hub: false,
            exit_point: Some(exit.clone()),
            exit_straight_km: Some(exit_straight_km),
            round_trip_km: record.round_trip_km,
            route_offer,
            discount_state: session.state(),
            pricing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fingerprint_stable_and_input_sensitive() {
        let a = request_fingerprint("Тверская область, Конаково", date(2025, 9, 2));
        let b = request_fingerprint("  тверская область, конаково ", date(2025, 9, 2));
        let c = request_fingerprint("Тверская область, Конаково", date(2025, 9, 3));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_confirm_requires_an_offer() {
        let mut session = QuoteSession::new();
        session.confirm();
        assert_eq!(session.state(), DiscountState::NoRouteChecked);
        assert!(!session.confirmed());
    }

    #[test]
    fn test_offer_confirm_decline_cycle() {
        let mut session = QuoteSession::new();
        session.sync(1);
        session.register_offer(true);
        assert_eq!(session.state(), DiscountState::RouteOffered);

        session.confirm();
        assert!(session.confirmed());

        session.decline();
        assert_eq!(session.state(), DiscountState::Declined);

        // Changing one's mind is allowed while the inputs stand.
        session.confirm();
        assert!(session.confirmed());
    }

    #[test]
    fn test_fingerprint_change_resets_confirmation() {
        let mut session = QuoteSession::new();
        session.sync(1);
        session.register_offer(true);
        session.confirm();

        session.sync(2);
        assert_eq!(session.state(), DiscountState::NoRouteChecked);
        assert!(!session.confirmed());
    }

    #[test]
    fn test_recalculation_keeps_confirmation() {
        let mut session = QuoteSession::new();
        session.sync(1);
        session.register_offer(true);
        session.confirm();

        // Same inputs re-quoted: offer re-registered, confirmation stands.
        session.sync(1);
        session.register_offer(true);
        assert!(session.confirmed());
    }

    #[test]
    fn test_withdrawn_offer_clears_state() {
        let mut session = QuoteSession::new();
        session.sync(1);
        session.register_offer(true);
        session.confirm();

        session.register_offer(false);
        assert_eq!(session.state(), DiscountState::NoRouteChecked);
    }
}
