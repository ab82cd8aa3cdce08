use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use oasis_core::repository::{DemoRepository, DemoTable, RepositoryError};
use oasis_core::{CabinSeed, GuestSeed, ResolvedBooking};

pub struct PostgresDemoRepository {
    pool: PgPool,
}

impl PostgresDemoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_ids(
        &self,
        table: DemoTable,
        mut query: QueryBuilder<'_, Postgres>,
    ) -> Result<Vec<i64>, RepositoryError> {
        query.push(" RETURNING id");

        let mut ids: Vec<i64> = query
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await?;
        // RETURNING order is not guaranteed; ascending ids follow insertion order
        ids.sort_unstable();

        debug!("Inserted {} rows into {}", ids.len(), table);
        Ok(ids)
    }
}

#[async_trait]
impl DemoRepository for PostgresDemoRepository {
    async fn delete_all(&self, table: DemoTable) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!("DELETE FROM {}", table.as_str()))
            .execute(&self.pool)
            .await?;

        debug!("Deleted {} rows from {}", result.rows_affected(), table);
        Ok(())
    }

    async fn insert_cabins(&self, cabins: &[CabinSeed]) -> Result<Vec<i64>, RepositoryError> {
        if cabins.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO cabins (name, max_capacity, regular_price, discount, description, image) ",
        );
        query.push_values(cabins, |mut row, cabin| {
            row.push_bind(cabin.name.clone())
                .push_bind(cabin.max_capacity)
                .push_bind(cabin.regular_price)
                .push_bind(cabin.discount)
                .push_bind(cabin.description.clone())
                .push_bind(cabin.image.clone());
        });

        self.fetch_ids(DemoTable::Cabins, query).await
    }

    async fn insert_guests(&self, guests: &[GuestSeed]) -> Result<Vec<i64>, RepositoryError> {
        if guests.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO guests (full_name, email, nationality, national_id, country_flag) ",
        );
        query.push_values(guests, |mut row, guest| {
            row.push_bind(guest.full_name.clone())
                .push_bind(guest.email.clone())
                .push_bind(guest.nationality.clone())
                .push_bind(guest.national_id.clone())
                .push_bind(guest.country_flag.clone());
        });

        self.fetch_ids(DemoTable::Guests, query).await
    }

    async fn insert_bookings(
        &self,
        bookings: &[ResolvedBooking],
    ) -> Result<Vec<i64>, RepositoryError> {
        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Postgres>::new(
            r#"INSERT INTO bookings (created_at, start_date, end_date, num_nights, num_guests,
                cabin_price, extras_price, total_price, status, has_breakfast, is_paid,
                observations, cabin_id, guest_id) "#,
        );
        query.push_values(bookings, |mut row, booking| {
            row.push_bind(booking.created_at)
                .push_bind(booking.start_date)
                .push_bind(booking.end_date)
                .push_bind(booking.num_nights)
                .push_bind(booking.num_guests)
                .push_bind(booking.cabin_price)
                .push_bind(booking.extras_price)
                .push_bind(booking.total_price)
                .push_bind(booking.status.as_str())
                .push_bind(booking.has_breakfast)
                .push_bind(booking.is_paid)
                .push_bind(booking.observations.clone())
                .push_bind(booking.cabin_id)
                .push_bind(booking.guest_id);
        });

        self.fetch_ids(DemoTable::Bookings, query).await
    }
}
