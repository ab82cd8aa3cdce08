use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::ResetClock;
use crate::models::{BookingStatus, CabinSeed};
use crate::{CoreError, CoreResult};

/// Price of breakfast per guest per night
pub const DEFAULT_BREAKFAST_PRICE: i32 = 15;

/// Derived money and lifecycle fields for a single stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayQuote {
    pub num_nights: i64,
    pub cabin_price: i64,
    pub extras_price: i64,
    pub total_price: i64,
    pub status: BookingStatus,
}

/// Pricing and status derivation for seeded stays
#[derive(Debug, Clone, Copy)]
pub struct StayPricing {
    breakfast_price: i32,
}

impl Default for StayPricing {
    fn default() -> Self {
        Self::new(DEFAULT_BREAKFAST_PRICE)
    }
}

impl StayPricing {
    pub fn new(breakfast_price: i32) -> Self {
        Self { breakfast_price }
    }

    pub fn breakfast_price(&self) -> i32 {
        self.breakfast_price
    }

    /// Price a stay in `cabin` and place it in its lifecycle.
    ///
    /// A stay that ends before it starts is rejected rather than priced
    /// negatively. Zero-night stays are valid and cost nothing.
    pub fn quote(
        &self,
        clock: &ResetClock,
        cabin: &CabinSeed,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        num_guests: i32,
        has_breakfast: bool,
    ) -> CoreResult<StayQuote> {
        let num_nights = ResetClock::days_between(end, start);
        if num_nights < 0 {
            return Err(CoreError::NegativeStay { nights: num_nights });
        }

        let overflow = || CoreError::PriceOverflow { nights: num_nights };
        let cabin_price = num_nights
            .checked_mul(i64::from(cabin.nightly_rate()))
            .ok_or_else(overflow)?;
        let extras_price = if has_breakfast {
            num_nights
                .checked_mul(i64::from(self.breakfast_price))
                .and_then(|p| p.checked_mul(i64::from(num_guests)))
                .ok_or_else(overflow)?
        } else {
            0
        };
        let total_price = cabin_price.checked_add(extras_price).ok_or_else(overflow)?;
        let status = derive_status(clock, start, end)?;

        debug!(
            "Quoted {} nights in cabin {}: {} + {} ({})",
            num_nights, cabin.name, cabin_price, extras_price, status
        );

        Ok(StayQuote {
            num_nights,
            cabin_price,
            extras_price,
            total_price,
            status,
        })
    }
}

/// Evaluate the lifecycle predicates in order. Every predicate that holds
/// overwrites the status set by the ones before it, so the last match wins.
pub fn derive_status(
    clock: &ResetClock,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CoreResult<BookingStatus> {
    let rules = [
        (clock.is_past_strict(end), BookingStatus::CheckedOut),
        (clock.is_today_or_future(start), BookingStatus::Unconfirmed),
        (
            clock.is_today_or_future(end) && clock.is_past_strict(start),
            BookingStatus::CheckedIn,
        ),
    ];

    fold_status(&rules).ok_or(CoreError::UnresolvedStatus)
}

fn fold_status(rules: &[(bool, BookingStatus)]) -> Option<BookingStatus> {
    rules
        .iter()
        .fold(None, |current, &(matched, status)| if matched { Some(status) } else { current })
}
