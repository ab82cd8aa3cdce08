use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use oasis_core::repository::{DemoRepository, DemoTable, RepositoryError};
use oasis_core::{
    BookingSeed, BookingStatus, CoreError, CoreResult, IdentifierMap, ResetClock, ResolvedBooking, SeedSet,
    StayPricing,
};

/// The five steps of a reset, in the only order they may run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPhase {
    DeleteBookings,
    DeleteGuests,
    DeleteCabins,
    InsertBaseRecords,
    InsertBookings,
}

impl ResetPhase {
    pub fn number(&self) -> u8 {
        match self {
            ResetPhase::DeleteBookings => 1,
            ResetPhase::DeleteGuests => 2,
            ResetPhase::DeleteCabins => 3,
            ResetPhase::InsertBaseRecords => 4,
            ResetPhase::InsertBookings => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResetPhase::DeleteBookings => "delete bookings",
            ResetPhase::DeleteGuests => "delete guests",
            ResetPhase::DeleteCabins => "delete cabins",
            ResetPhase::InsertBaseRecords => "insert cabins and guests",
            ResetPhase::InsertBookings => "resolve and insert bookings",
        }
    }
}

impl fmt::Display for ResetPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "phase {} ({})", self.number(), self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResetError {
    #[error("{phase} failed: {action} {table}: {source}")]
    Persistence {
        phase: ResetPhase,
        table: DemoTable,
        action: &'static str,
        #[source]
        source: RepositoryError,
    },
    #[error("{phase} failed: {source}")]
    Integrity {
        phase: ResetPhase,
        #[source]
        source: CoreError,
    },
    #[error("{phase} failed: booking {ordinal}: {source}")]
    Booking {
        phase: ResetPhase,
        ordinal: usize,
        #[source]
        source: CoreError,
    },
}

impl ResetError {
    pub fn phase(&self) -> ResetPhase {
        match self {
            ResetError::Persistence { phase, .. }
            | ResetError::Integrity { phase, .. }
            | ResetError::Booking { phase, .. } => *phase,
        }
    }
}

/// Summary of a completed reset
#[derive(Debug, Clone, Serialize)]
pub struct ResetReport {
    pub run_id: Uuid,
    pub reference_time: DateTime<Utc>,
    pub cabins: usize,
    pub guests: usize,
    pub bookings: usize,
    pub statuses: BTreeMap<BookingStatus, usize>,
}

/// Wipes and repopulates the demo tables.
///
/// Phases run strictly one after another and the first failure ends the run.
/// Nothing is rolled back: phases 1-3 empty every table, so re-running the
/// whole reset after any failure converges on the same state.
pub struct ResetOrchestrator {
    repository: Arc<dyn DemoRepository>,
    pricing: StayPricing,
}

impl ResetOrchestrator {
    pub fn new(repository: Arc<dyn DemoRepository>, pricing: StayPricing) -> Self {
        Self { repository, pricing }
    }

    pub async fn run(&self, seeds: &SeedSet, clock: &ResetClock) -> Result<ResetReport, ResetError> {
        let run_id = Uuid::new_v4();
        info!("Resetting Oasis demo data (run {}, reference time {})...", run_id, clock.instant());

        self.delete(ResetPhase::DeleteBookings, DemoTable::Bookings).await?;
        self.delete(ResetPhase::DeleteGuests, DemoTable::Guests).await?;
        self.delete(ResetPhase::DeleteCabins, DemoTable::Cabins).await?;

        let (cabin_ids, guest_ids) = self.insert_base_records(seeds).await?;

        let phase = ResetPhase::InsertBookings;
        info!("Starting {}", phase);
        let bookings = resolve_bookings(seeds, &cabin_ids, &guest_ids, clock, &self.pricing)?;
        let assigned = self
            .repository
            .insert_bookings(&bookings)
            .await
            .map_err(|source| ResetError::Persistence {
                phase,
                table: DemoTable::Bookings,
                action: "insert",
                source,
            })?;
        confirm_count(phase, DemoTable::Bookings, bookings.len(), assigned.len())?;

        let mut statuses = BTreeMap::new();
        for booking in &bookings {
            *statuses.entry(booking.status).or_insert(0) += 1;
        }

        info!(
            "Demo reset complete: {} cabins, {} guests, {} bookings",
            cabin_ids.len(),
            guest_ids.len(),
            bookings.len()
        );

        Ok(ResetReport {
            run_id,
            reference_time: clock.instant(),
            cabins: cabin_ids.len(),
            guests: guest_ids.len(),
            bookings: bookings.len(),
            statuses,
        })
    }

    async fn delete(&self, phase: ResetPhase, table: DemoTable) -> Result<(), ResetError> {
        info!("Starting {}", phase);
        self.repository
            .delete_all(table)
            .await
            .map_err(|source| ResetError::Persistence {
                phase,
                table,
                action: "delete",
                source,
            })
    }

    async fn insert_base_records(
        &self,
        seeds: &SeedSet,
    ) -> Result<(IdentifierMap, IdentifierMap), ResetError> {
        let phase = ResetPhase::InsertBaseRecords;
        info!("Starting {}", phase);

        let cabin_ids = self
            .repository
            .insert_cabins(&seeds.cabins)
            .await
            .map_err(|source| ResetError::Persistence {
                phase,
                table: DemoTable::Cabins,
                action: "insert",
                source,
            })?;
        let cabin_ids = IdentifierMap::build(DemoTable::Cabins, seeds.cabins.len(), &cabin_ids)
            .map_err(|source| ResetError::Integrity { phase, source })?;

        let guest_ids = self
            .repository
            .insert_guests(&seeds.guests)
            .await
            .map_err(|source| ResetError::Persistence {
                phase,
                table: DemoTable::Guests,
                action: "insert",
                source,
            })?;
        let guest_ids = IdentifierMap::build(DemoTable::Guests, seeds.guests.len(), &guest_ids)
            .map_err(|source| ResetError::Integrity { phase, source })?;

        debug!("Mapped {} cabins and {} guests", cabin_ids.len(), guest_ids.len());
        Ok((cabin_ids, guest_ids))
    }
}

/// Turn every booking seed into the row that gets written, remapping its
/// guest and cabin ordinals through the assigned identifiers.
pub fn resolve_bookings(
    seeds: &SeedSet,
    cabin_ids: &IdentifierMap,
    guest_ids: &IdentifierMap,
    clock: &ResetClock,
    pricing: &StayPricing,
) -> Result<Vec<ResolvedBooking>, ResetError> {
    seeds
        .bookings
        .iter()
        .enumerate()
        .map(|(idx, seed)| {
            resolve_booking(seed, seeds, cabin_ids, guest_ids, clock, pricing).map_err(|source| {
                ResetError::Booking {
                    phase: ResetPhase::InsertBookings,
                    ordinal: idx + 1,
                    source,
                }
            })
        })
        .collect()
}

fn resolve_booking(
    seed: &BookingSeed,
    seeds: &SeedSet,
    cabin_ids: &IdentifierMap,
    guest_ids: &IdentifierMap,
    clock: &ResetClock,
    pricing: &StayPricing,
) -> CoreResult<ResolvedBooking> {
    let guest_id = guest_ids.resolve(seed.guest_id)?;
    let cabin_id = cabin_ids.resolve(seed.cabin_id)?;
    let cabin = seeds.cabin(seed.cabin_id)?;

    let stay = seed.window.timestamps(clock)?;
    let quote = pricing.quote(clock, cabin, stay.start, stay.end, seed.num_guests, seed.has_breakfast)?;

    Ok(ResolvedBooking {
        created_at: stay.created_at,
        start_date: stay.start,
        end_date: stay.end,
        num_nights: quote.num_nights,
        num_guests: seed.num_guests,
        cabin_price: quote.cabin_price,
        extras_price: quote.extras_price,
        total_price: quote.total_price,
        status: quote.status,
        has_breakfast: seed.has_breakfast,
        is_paid: seed.is_paid,
        observations: seed.observations.clone(),
        cabin_id,
        guest_id,
    })
}

fn confirm_count(
    phase: ResetPhase,
    table: DemoTable,
    seeded: usize,
    assigned: usize,
) -> Result<(), ResetError> {
    if seeded == assigned {
        return Ok(());
    }
    Err(ResetError::Integrity {
        phase,
        source: CoreError::IdentifierCountMismatch { table, seeded, assigned },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use oasis_core::{CabinSeed, GuestSeed, StayWindow};

    fn seeds() -> SeedSet {
        SeedSet {
            cabins: vec![CabinSeed {
                name: "001".into(),
                max_capacity: 4,
                regular_price: 100,
                discount: 10,
                description: String::new(),
                image: None,
            }],
            guests: vec![GuestSeed {
                full_name: "Maria Rodriguez".into(),
                email: "maria@example.com".into(),
                nationality: "Spain".into(),
                national_id: "1234567890".into(),
                country_flag: None,
            }],
            bookings: vec![BookingSeed {
                guest_id: 1,
                cabin_id: 1,
                num_guests: 2,
                has_breakfast: true,
                is_paid: false,
                observations: "Late arrival".into(),
                window: StayWindow::Offsets { created_offset: -10, start_offset: -3, end_offset: 2 },
            }],
        }
    }

    fn clock() -> ResetClock {
        ResetClock::fixed(Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap())
    }

    #[test]
    fn test_resolve_remaps_and_prices() {
        let seeds = seeds();
        let cabins = IdentifierMap::build(DemoTable::Cabins, 1, &[70]).unwrap();
        let guests = IdentifierMap::build(DemoTable::Guests, 1, &[301]).unwrap();

        let bookings = resolve_bookings(&seeds, &cabins, &guests, &clock(), &StayPricing::default()).unwrap();
        let booking = &bookings[0];

        assert_eq!(booking.cabin_id, 70);
        assert_eq!(booking.guest_id, 301);
        assert_eq!(booking.num_nights, 5);
        assert_eq!(booking.cabin_price, 450);
        assert_eq!(booking.extras_price, 150);
        assert_eq!(booking.total_price, 600);
        assert_eq!(booking.status, BookingStatus::CheckedIn);
        assert_eq!(booking.observations, "Late arrival");
        assert_eq!(booking.created_at, Utc.with_ymd_and_hms(2024, 6, 5, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_unknown_guest_ordinal_names_booking() {
        let mut seeds = seeds();
        seeds.bookings[0].guest_id = 2;
        let cabins = IdentifierMap::build(DemoTable::Cabins, 1, &[70]).unwrap();
        let guests = IdentifierMap::build(DemoTable::Guests, 1, &[301]).unwrap();

        let err = resolve_bookings(&seeds, &cabins, &guests, &clock(), &StayPricing::default()).unwrap_err();
        assert!(matches!(
            err,
            ResetError::Booking {
                ordinal: 1,
                source: CoreError::OrdinalOutOfRange { table: DemoTable::Guests, ordinal: 2, .. },
                ..
            }
        ));
        assert_eq!(err.phase(), ResetPhase::InsertBookings);
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(ResetPhase::DeleteBookings.to_string(), "phase 1 (delete bookings)");
        assert_eq!(ResetPhase::InsertBookings.to_string(), "phase 5 (resolve and insert bookings)");
    }
}
