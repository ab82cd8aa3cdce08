use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;

use crate::clock::ResetClock;
use crate::{CoreError, CoreResult, DemoTable};

/// A cabin as it appears in the seed files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CabinSeed {
    pub name: String,
    pub max_capacity: i32,
    pub regular_price: i32,
    pub discount: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl CabinSeed {
    /// Nightly price after discount
    pub fn nightly_rate(&self) -> i32 {
        self.regular_price - self.discount
    }
}

/// A guest as it appears in the seed files. Contact attributes are passed
/// through to storage untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuestSeed {
    pub full_name: String,
    pub email: String,
    pub nationality: String,
    #[serde(rename = "nationalID")]
    pub national_id: String,
    #[serde(default)]
    pub country_flag: Option<String>,
}

/// When a seeded stay happens: either relative to the reset instant or pinned
/// to absolute timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StayWindow {
    #[serde(rename_all = "camelCase")]
    Offsets {
        created_offset: i64,
        start_offset: i64,
        end_offset: i64,
    },
    #[serde(rename_all = "camelCase")]
    Absolute {
        created_at: DateTime<Utc>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    },
}

/// Concrete creation, start and end instants of a stay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayTimestamps {
    pub created_at: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl StayWindow {
    /// Offsets become instants relative to `clock`; start and end land on
    /// midnight UTC while the creation time keeps its time of day.
    /// Absolute windows are taken as written.
    pub fn timestamps(&self, clock: &ResetClock) -> CoreResult<StayTimestamps> {
        match *self {
            StayWindow::Offsets { created_offset, start_offset, end_offset } => Ok(StayTimestamps {
                created_at: clock.date_from_offset(created_offset, true)?,
                start: clock.date_from_offset(start_offset, false)?,
                end: clock.date_from_offset(end_offset, false)?,
            }),
            StayWindow::Absolute { created_at, start_date, end_date } => Ok(StayTimestamps {
                created_at,
                start: start_date,
                end: end_date,
            }),
        }
    }
}

/// A booking as it appears in the seed files. `guest_id` and `cabin_id` are
/// 1-based positions in the guest and cabin seed lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingSeed {
    pub guest_id: usize,
    pub cabin_id: usize,
    pub num_guests: i32,
    pub has_breakfast: bool,
    pub is_paid: bool,
    #[serde(default)]
    pub observations: String,
    #[serde(flatten)]
    pub window: StayWindow,
}

/// Booking lifecycle relative to the reset instant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Unconfirmed,
    CheckedIn,
    CheckedOut,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Unconfirmed => "unconfirmed",
            BookingStatus::CheckedIn => "checked-in",
            BookingStatus::CheckedOut => "checked-out",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The booking row that actually gets written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedBooking {
    pub created_at: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub num_nights: i64,
    pub num_guests: i32,
    pub cabin_price: i64,
    pub extras_price: i64,
    pub total_price: i64,
    pub status: BookingStatus,
    pub has_breakfast: bool,
    pub is_paid: bool,
    pub observations: String,
    pub cabin_id: i64,
    pub guest_id: i64,
}

/// The three ordered seed sequences a reset works from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedSet {
    pub cabins: Vec<CabinSeed>,
    pub guests: Vec<GuestSeed>,
    pub bookings: Vec<BookingSeed>,
}

impl SeedSet {
    /// Look up a cabin seed by its 1-based ordinal
    pub fn cabin(&self, ordinal: usize) -> CoreResult<&CabinSeed> {
        ordinal
            .checked_sub(1)
            .and_then(|idx| self.cabins.get(idx))
            .ok_or(CoreError::OrdinalOutOfRange {
                table: DemoTable::Cabins,
                ordinal,
                len: self.cabins.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_seed_with_offsets() {
        let seed: BookingSeed = serde_json::from_value(serde_json::json!({
            "createdOffset": -20,
            "startOffset": -3,
            "endOffset": 2,
            "cabinId": 1,
            "guestId": 4,
            "hasBreakfast": true,
            "observations": "",
            "isPaid": false,
            "numGuests": 2
        }))
        .unwrap();

        assert_eq!(seed.guest_id, 4);
        assert_eq!(
            seed.window,
            StayWindow::Offsets { created_offset: -20, start_offset: -3, end_offset: 2 }
        );
    }

    #[test]
    fn test_booking_seed_with_absolute_dates() {
        let seed: BookingSeed = serde_json::from_value(serde_json::json!({
            "createdAt": "2024-01-02T09:15:00Z",
            "startDate": "2024-02-01T00:00:00Z",
            "endDate": "2024-02-04T00:00:00Z",
            "cabinId": 2,
            "guestId": 1,
            "hasBreakfast": false,
            "isPaid": true,
            "numGuests": 1
        }))
        .unwrap();

        assert!(matches!(seed.window, StayWindow::Absolute { .. }));
        assert!(seed.observations.is_empty());
    }

    #[test]
    fn test_offset_window_timestamps() {
        use chrono::TimeZone;

        let clock = ResetClock::fixed(Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap());
        let window = StayWindow::Offsets { created_offset: -20, start_offset: -3, end_offset: 2 };
        let ts = window.timestamps(&clock).unwrap();

        assert_eq!(ts.created_at, Utc.with_ymd_and_hms(2024, 5, 26, 10, 30, 0).unwrap());
        assert_eq!(ts.start, Utc.with_ymd_and_hms(2024, 6, 12, 0, 0, 0).unwrap());
        assert_eq!(ts.end, Utc.with_ymd_and_hms(2024, 6, 17, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_huge_offset_window_is_an_error() {
        let seed: BookingSeed = serde_json::from_value(serde_json::json!({
            "createdOffset": -1,
            "startOffset": 0,
            "endOffset": 200000000,
            "cabinId": 1,
            "guestId": 1,
            "hasBreakfast": false,
            "isPaid": false,
            "numGuests": 1
        }))
        .unwrap();

        assert!(matches!(
            seed.window.timestamps(&ResetClock::now()),
            Err(CoreError::OffsetOutOfRange { offset: 200000000 })
        ));
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        assert_eq!(serde_json::to_value(BookingStatus::CheckedIn).unwrap(), "checked-in");
        assert_eq!(BookingStatus::CheckedOut.to_string(), "checked-out");
    }

    #[test]
    fn test_cabin_lookup_by_ordinal() {
        let seeds = SeedSet {
            cabins: vec![CabinSeed {
                name: "001".into(),
                max_capacity: 2,
                regular_price: 250,
                discount: 0,
                description: String::new(),
                image: None,
            }],
            ..Default::default()
        };

        assert_eq!(seeds.cabin(1).unwrap().name, "001");
        assert!(matches!(seeds.cabin(0), Err(CoreError::OrdinalOutOfRange { ordinal: 0, .. })));
        assert!(matches!(seeds.cabin(2), Err(CoreError::OrdinalOutOfRange { len: 1, .. })));
    }
}
