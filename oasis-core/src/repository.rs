use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{CabinSeed, GuestSeed, ResolvedBooking};

pub type RepositoryError = Box<dyn std::error::Error + Send + Sync>;

/// Tables touched by a demo reset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DemoTable {
    Bookings,
    Guests,
    Cabins,
}

impl DemoTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoTable::Bookings => "bookings",
            DemoTable::Guests => "guests",
            DemoTable::Cabins => "cabins",
        }
    }
}

impl fmt::Display for DemoTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage boundary for the demo data set
#[async_trait]
pub trait DemoRepository: Send + Sync {
    /// Remove every row of `table`
    async fn delete_all(&self, table: DemoTable) -> Result<(), RepositoryError>;

    /// Insert cabins, returning their identifiers in ascending order
    async fn insert_cabins(&self, cabins: &[CabinSeed]) -> Result<Vec<i64>, RepositoryError>;

    /// Insert guests, returning their identifiers in ascending order
    async fn insert_guests(&self, guests: &[GuestSeed]) -> Result<Vec<i64>, RepositoryError>;

    /// Insert bookings as one batch
    async fn insert_bookings(
        &self,
        bookings: &[ResolvedBooking],
    ) -> Result<Vec<i64>, RepositoryError>;
}
