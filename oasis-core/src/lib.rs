pub mod models;
pub mod clock;
pub mod pricing;
pub mod remap;
pub mod repository;

pub use models::{BookingSeed, BookingStatus, CabinSeed, GuestSeed, ResolvedBooking, SeedSet, StayTimestamps, StayWindow};
pub use clock::ResetClock;
pub use pricing::{StayPricing, StayQuote, DEFAULT_BREAKFAST_PRICE};
pub use remap::IdentifierMap;
pub use repository::{DemoRepository, DemoTable, RepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Ordinal {ordinal} is out of range for {table} (expected 1..={len})")]
    OrdinalOutOfRange {
        table: DemoTable,
        ordinal: usize,
        len: usize,
    },
    #[error("Identifier count mismatch for {table}: {seeded} seeds but {assigned} assigned identifiers")]
    IdentifierCountMismatch {
        table: DemoTable,
        seeded: usize,
        assigned: usize,
    },
    #[error("Identifier {id} was assigned more than once for {table}")]
    DuplicateIdentifier { table: DemoTable, id: i64 },
    #[error("Day offset {offset} is outside the supported calendar range")]
    OffsetOutOfRange { offset: i64 },
    #[error("Price of a {nights} night stay does not fit in 64 bits")]
    PriceOverflow { nights: i64 },
    #[error("Stay ends before it starts ({nights} nights)")]
    NegativeStay { nights: i64 },
    #[error("No lifecycle status predicate matched the stay window")]
    UnresolvedStatus,
}

pub type CoreResult<T> = Result<T, CoreError>;
