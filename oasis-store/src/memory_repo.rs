use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;
use tracing::debug;

use oasis_core::repository::{DemoRepository, DemoTable, RepositoryError};
use oasis_core::{CabinSeed, GuestSeed, ResolvedBooking};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryAction {
    Delete,
    Insert,
}

/// One call made against the in-memory store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOperation {
    pub action: RepositoryAction,
    pub table: DemoTable,
    pub rows: usize,
}

#[derive(Default)]
struct MemoryTables {
    cabins: BTreeMap<i64, CabinSeed>,
    guests: BTreeMap<i64, GuestSeed>,
    bookings: BTreeMap<i64, ResolvedBooking>,
    sequences: HashMap<DemoTable, i64>,
    journal: Vec<RepositoryOperation>,
}

impl MemoryTables {
    fn next_ids(&mut self, table: DemoTable, count: usize) -> Vec<i64> {
        let last = self.sequences.entry(table).or_insert(0);
        let ids = (1..=count as i64).map(|n| *last + n).collect();
        *last += count as i64;
        ids
    }

    fn record(&mut self, action: RepositoryAction, table: DemoTable, rows: usize) {
        self.journal.push(RepositoryOperation { action, table, rows });
    }
}

/// Process-local demo store. Identifiers keep increasing across deletes the
/// way a database sequence does, and bookings may only point at rows that
/// exist.
#[derive(Default)]
pub struct InMemoryDemoRepository {
    tables: Mutex<MemoryTables>,
}

impl InMemoryDemoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn cabins(&self) -> Vec<(i64, CabinSeed)> {
        let tables = self.tables.lock().await;
        tables.cabins.iter().map(|(id, c)| (*id, c.clone())).collect()
    }

    pub async fn guests(&self) -> Vec<(i64, GuestSeed)> {
        let tables = self.tables.lock().await;
        tables.guests.iter().map(|(id, g)| (*id, g.clone())).collect()
    }

    pub async fn bookings(&self) -> Vec<(i64, ResolvedBooking)> {
        let tables = self.tables.lock().await;
        tables.bookings.iter().map(|(id, b)| (*id, b.clone())).collect()
    }

    /// Every delete and insert seen so far, oldest first
    pub async fn journal(&self) -> Vec<RepositoryOperation> {
        self.tables.lock().await.journal.clone()
    }
}

#[async_trait]
impl DemoRepository for InMemoryDemoRepository {
    async fn delete_all(&self, table: DemoTable) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;

        let referenced = match table {
            DemoTable::Bookings => false,
            DemoTable::Guests => !tables.bookings.is_empty() && !tables.guests.is_empty(),
            DemoTable::Cabins => !tables.bookings.is_empty() && !tables.cabins.is_empty(),
        };
        if referenced {
            return Err(format!("delete on {} violates foreign key constraint from bookings", table).into());
        }

        let rows = match table {
            DemoTable::Bookings => std::mem::take(&mut tables.bookings).len(),
            DemoTable::Guests => std::mem::take(&mut tables.guests).len(),
            DemoTable::Cabins => std::mem::take(&mut tables.cabins).len(),
        };
        tables.record(RepositoryAction::Delete, table, rows);

        debug!("Deleted {} rows from {}", rows, table);
        Ok(())
    }

    async fn insert_cabins(&self, cabins: &[CabinSeed]) -> Result<Vec<i64>, RepositoryError> {
        let mut tables = self.tables.lock().await;

        let ids = tables.next_ids(DemoTable::Cabins, cabins.len());
        for (id, cabin) in ids.iter().zip(cabins) {
            tables.cabins.insert(*id, cabin.clone());
        }
        tables.record(RepositoryAction::Insert, DemoTable::Cabins, ids.len());

        Ok(ids)
    }

    async fn insert_guests(&self, guests: &[GuestSeed]) -> Result<Vec<i64>, RepositoryError> {
        let mut tables = self.tables.lock().await;

        let ids = tables.next_ids(DemoTable::Guests, guests.len());
        for (id, guest) in ids.iter().zip(guests) {
            tables.guests.insert(*id, guest.clone());
        }
        tables.record(RepositoryAction::Insert, DemoTable::Guests, ids.len());

        Ok(ids)
    }

    async fn insert_bookings(
        &self,
        bookings: &[ResolvedBooking],
    ) -> Result<Vec<i64>, RepositoryError> {
        let mut tables = self.tables.lock().await;

        // The batch is all-or-nothing
        for booking in bookings {
            if !tables.cabins.contains_key(&booking.cabin_id) {
                return Err(format!("booking references unknown cabin {}", booking.cabin_id).into());
            }
            if !tables.guests.contains_key(&booking.guest_id) {
                return Err(format!("booking references unknown guest {}", booking.guest_id).into());
            }
        }

        let ids = tables.next_ids(DemoTable::Bookings, bookings.len());
        for (id, booking) in ids.iter().zip(bookings) {
            tables.bookings.insert(*id, booking.clone());
        }
        tables.record(RepositoryAction::Insert, DemoTable::Bookings, ids.len());

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use oasis_core::BookingStatus;

    fn cabin(name: &str) -> CabinSeed {
        CabinSeed {
            name: name.into(),
            max_capacity: 2,
            regular_price: 250,
            discount: 0,
            description: String::new(),
            image: None,
        }
    }

    fn guest(name: &str) -> GuestSeed {
        GuestSeed {
            full_name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            nationality: "Portugal".into(),
            national_id: "3525436345".into(),
            country_flag: None,
        }
    }

    fn booking(cabin_id: i64, guest_id: i64) -> ResolvedBooking {
        let now = Utc::now();
        ResolvedBooking {
            created_at: now,
            start_date: now,
            end_date: now,
            num_nights: 0,
            num_guests: 1,
            cabin_price: 0,
            extras_price: 0,
            total_price: 0,
            status: BookingStatus::Unconfirmed,
            has_breakfast: false,
            is_paid: false,
            observations: String::new(),
            cabin_id,
            guest_id,
        }
    }

    #[tokio::test]
    async fn test_identifiers_keep_increasing_after_delete() {
        let repo = InMemoryDemoRepository::new();

        let first = repo.insert_cabins(&[cabin("001"), cabin("002")]).await.unwrap();
        assert_eq!(first, vec![1, 2]);

        repo.delete_all(DemoTable::Cabins).await.unwrap();
        assert!(repo.cabins().await.is_empty());

        let second = repo.insert_cabins(&[cabin("001")]).await.unwrap();
        assert_eq!(second, vec![3]);
    }

    #[tokio::test]
    async fn test_referenced_rows_cannot_be_deleted() {
        let repo = InMemoryDemoRepository::new();
        let cabins = repo.insert_cabins(&[cabin("001")]).await.unwrap();
        let guests = repo.insert_guests(&[guest("Jonas")]).await.unwrap();
        repo.insert_bookings(&[booking(cabins[0], guests[0])]).await.unwrap();

        assert!(repo.delete_all(DemoTable::Guests).await.is_err());
        assert!(repo.delete_all(DemoTable::Cabins).await.is_err());

        repo.delete_all(DemoTable::Bookings).await.unwrap();
        repo.delete_all(DemoTable::Guests).await.unwrap();
        repo.delete_all(DemoTable::Cabins).await.unwrap();
    }

    #[tokio::test]
    async fn test_bookings_need_existing_parents() {
        let repo = InMemoryDemoRepository::new();
        let cabins = repo.insert_cabins(&[cabin("001")]).await.unwrap();

        let err = repo.insert_bookings(&[booking(cabins[0], 99)]).await.unwrap_err();
        assert!(err.to_string().contains("unknown guest 99"));
        assert!(repo.bookings().await.is_empty());
    }

    #[tokio::test]
    async fn test_journal_records_calls_in_order() {
        let repo = InMemoryDemoRepository::new();
        repo.delete_all(DemoTable::Bookings).await.unwrap();
        repo.insert_guests(&[guest("Jonas"), guest("Maria")]).await.unwrap();

        assert_eq!(
            repo.journal().await,
            vec![
                RepositoryOperation { action: RepositoryAction::Delete, table: DemoTable::Bookings, rows: 0 },
                RepositoryOperation { action: RepositoryAction::Insert, table: DemoTable::Guests, rows: 2 },
            ]
        );
    }
}
