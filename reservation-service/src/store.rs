use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::models::{Customer, DbCustomer, DbReservation, Reservation, ReservationStatus};
use crate::schema::{customers, reservations};

pub type DbPool = Pool<AsyncPgConnection>;

/// Authoritative reservation storage. Invariants (hour alignment, time
/// ordering, positive participants) are enforced at this boundary even if
/// the validator was bypassed.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn insert(&self, reservation: Reservation) -> Result<Reservation>;
    async fn find(&self, id: Uuid) -> Result<Option<Reservation>>;
    async fn list_all(&self) -> Result<Vec<Reservation>>;
    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Reservation>>;
    async fn update(&self, reservation: Reservation) -> Result<Reservation>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn list_confirmed_for_date(&self, date: NaiveDate) -> Result<Vec<Reservation>>;

    /// Sum of participants over CONFIRMED reservations on `date` whose
    /// interval overlaps `[start, end)`. `exclude` keeps an in-place update
    /// from counting against itself.
    async fn confirmed_participants(
        &self,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude: Option<Uuid>,
    ) -> Result<i32>;
}

/// The customer directory is an external collaborator; the service only
/// resolves authenticated company names to identities.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn find_by_company_name(&self, company_name: &str) -> Result<Option<Customer>>;
}

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<PooledConnection<'_, AsyncPgConnection>> {
        self.pool
            .get()
            .await
            .map_err(|e| Error::Other(anyhow::anyhow!("database pool: {}", e)))
    }
}

/// The participants column is i32; an aggregate past that range can only
/// exist if writes bypassed the capacity limit, so clamp rather than
/// truncate.
fn clamp_participant_total(total: Option<i64>) -> i32 {
    i32::try_from(total.unwrap_or(0)).unwrap_or(i32::MAX)
}

fn into_domain(rows: Vec<DbReservation>) -> Result<Vec<Reservation>> {
    rows.into_iter()
        .map(|row| Reservation::try_from(row).map_err(Error::Other))
        .collect()
}

#[async_trait]
impl ReservationStore for PgStore {
    async fn insert(&self, reservation: Reservation) -> Result<Reservation> {
        let mut conn = self.conn().await?;

        let row: DbReservation = diesel::insert_into(reservations::table)
            .values(DbReservation::from(reservation))
            .get_result(&mut conn)
            .await?;
        Ok(Reservation::try_from(row)?)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Reservation>> {
        let mut conn = self.conn().await?;

        let row = reservations::table
            .filter(reservations::id.eq(id))
            .first::<DbReservation>(&mut conn)
            .await
            .optional()?;
        row.map(|row| Reservation::try_from(row).map_err(Error::Other))
            .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Reservation>> {
        let mut conn = self.conn().await?;

        let rows = reservations::table
            .order((reservations::date.asc(), reservations::start_time.asc()))
            .load::<DbReservation>(&mut conn)
            .await?;
        into_domain(rows)
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Reservation>> {
        let mut conn = self.conn().await?;

        let rows = reservations::table
            .filter(reservations::customer_id.eq(customer_id))
            .order((reservations::date.asc(), reservations::start_time.asc()))
            .load::<DbReservation>(&mut conn)
            .await?;
        into_domain(rows)
    }

    async fn update(&self, reservation: Reservation) -> Result<Reservation> {
        let mut conn = self.conn().await?;

        let mut row = DbReservation::from(reservation);
        row.updated_at = Some(Utc::now());

        let row: DbReservation = diesel::update(reservations::table.filter(reservations::id.eq(row.id)))
            .set(&row)
            .get_result(&mut conn)
            .await?;
        Ok(Reservation::try_from(row)?)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut conn = self.conn().await?;

        let affected = diesel::delete(reservations::table.filter(reservations::id.eq(id)))
            .execute(&mut conn)
            .await?;
        if affected == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn list_confirmed_for_date(&self, date: NaiveDate) -> Result<Vec<Reservation>> {
        let mut conn = self.conn().await?;

        let rows = reservations::table
            .filter(reservations::date.eq(date))
            .filter(reservations::status.eq(ReservationStatus::Confirmed.as_str()))
            .order(reservations::start_time.asc())
            .load::<DbReservation>(&mut conn)
            .await?;
        into_domain(rows)
    }

    async fn confirmed_participants(
        &self,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude: Option<Uuid>,
    ) -> Result<i32> {
        let mut conn = self.conn().await?;

        let query = reservations::table
            .filter(reservations::date.eq(date))
            .filter(reservations::status.eq(ReservationStatus::Confirmed.as_str()))
            .filter(reservations::start_time.lt(end))
            .filter(reservations::end_time.gt(start));

        let total: Option<i64> = match exclude {
            Some(id) => {
                query
                    .filter(reservations::id.ne(id))
                    .select(sum(reservations::num_of_participants))
                    .first(&mut conn)
                    .await?
            }
            None => {
                query
                    .select(sum(reservations::num_of_participants))
                    .first(&mut conn)
                    .await?
            }
        };
        Ok(clamp_participant_total(total))
    }
}

pub struct PgCustomerDirectory {
    pool: DbPool,
}

impl PgCustomerDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerDirectory for PgCustomerDirectory {
    async fn find_by_company_name(&self, company_name: &str) -> Result<Option<Customer>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| Error::Other(anyhow::anyhow!("database pool: {}", e)))?;

        let row = customers::table
            .filter(customers::company_name.eq(company_name))
            .first::<DbCustomer>(&mut conn)
            .await
            .optional()?;
        Ok(row.map(Customer::from))
    }
}
