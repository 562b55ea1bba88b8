use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::cache::SlotCache;
use crate::errors::{Error, Result};
use crate::models::{Customer, Reservation, ReservationStatus};
use crate::slots::{compute_slots, Slot, CAPACITY_LIMIT};
use crate::store::ReservationStore;
use crate::validate::{check_time_range, check_window};

#[derive(Debug, Clone)]
pub struct ReservationInput {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub num_of_participants: i32,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct ReservationChanges {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub num_of_participants: Option<i32>,
}

/// Orchestrates the reservation lifecycle: validation, persistence,
/// ownership rules, and availability-cache invalidation.
#[derive(Clone)]
pub struct ReservationService {
    store: Arc<dyn ReservationStore>,
    cache: Arc<dyn SlotCache>,
}

impl ReservationService {
    pub fn new(store: Arc<dyn ReservationStore>, cache: Arc<dyn SlotCache>) -> Self {
        Self { store, cache }
    }

    /// Booking rules in canonical order: window, time range, capacity.
    /// First failure wins.
    async fn validate_booking(
        &self,
        today: NaiveDate,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        num_of_participants: i32,
        exclude: Option<Uuid>,
    ) -> Result<()> {
        check_window(today, date)?;
        check_time_range(start, end)?;

        let confirmed = self
            .store
            .confirmed_participants(date, start, end, exclude)
            .await?;
        if confirmed + num_of_participants > CAPACITY_LIMIT {
            return Err(Error::CapacityExceeded {
                requested: num_of_participants,
                remaining: CAPACITY_LIMIT - confirmed,
            });
        }
        Ok(())
    }

    pub async fn create(&self, requester: &Customer, input: ReservationInput) -> Result<Reservation> {
        let today = Utc::now().date_naive();
        self.validate_booking(
            today,
            input.date,
            input.start_time,
            input.end_time,
            input.num_of_participants,
            None,
        )
        .await?;

        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            title: input.title,
            date: input.date,
            start_time: input.start_time,
            end_time: input.end_time,
            customer_id: requester.id,
            num_of_participants: input.num_of_participants,
            status: ReservationStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert(reservation).await?;
        info!(
            "customer {} created reservation {} for {}",
            requester.company_name, created.id, created.date
        );
        Ok(created)
    }

    /// A reservation owned by someone else is indistinguishable from a
    /// missing one, so ids do not leak existence.
    async fn load_visible(&self, id: Uuid, requester: &Customer) -> Result<Reservation> {
        let reservation = self.store.find(id).await?.ok_or(Error::NotFound)?;
        if !requester.is_admin() && reservation.customer_id != requester.id {
            return Err(Error::NotFound);
        }
        Ok(reservation)
    }

    pub async fn get(&self, id: Uuid, requester: &Customer) -> Result<Reservation> {
        self.load_visible(id, requester).await
    }

    pub async fn list(&self, requester: &Customer) -> Result<Vec<Reservation>> {
        if requester.is_admin() {
            self.store.list_all().await
        } else {
            self.store.list_for_customer(requester.id).await
        }
    }

    pub async fn update(
        &self,
        id: Uuid,
        requester: &Customer,
        changes: ReservationChanges,
    ) -> Result<Reservation> {
        let existing = self.load_visible(id, requester).await?;
        if existing.status == ReservationStatus::Confirmed && !requester.is_admin() {
            return Err(Error::Forbidden);
        }

        let mut updated = existing.clone();
        if let Some(title) = changes.title {
            updated.title = title;
        }
        if let Some(date) = changes.date {
            updated.date = date;
        }
        if let Some(start_time) = changes.start_time {
            updated.start_time = start_time;
        }
        if let Some(end_time) = changes.end_time {
            updated.end_time = end_time;
        }
        if let Some(num_of_participants) = changes.num_of_participants {
            updated.num_of_participants = num_of_participants;
        }

        let today = Utc::now().date_naive();
        self.validate_booking(
            today,
            updated.date,
            updated.start_time,
            updated.end_time,
            updated.num_of_participants,
            Some(id),
        )
        .await?;

        let saved = self.store.update(updated).await?;
        if existing.status == ReservationStatus::Confirmed {
            // The edit may move confirmed capacity between days.
            self.cache.invalidate(existing.date);
            self.cache.invalidate(saved.date);
        }
        Ok(saved)
    }

    pub async fn confirm(&self, id: Uuid, requester: &Customer) -> Result<Reservation> {
        if !requester.is_admin() {
            return Err(Error::Forbidden);
        }

        let mut reservation = self.store.find(id).await?.ok_or(Error::NotFound)?;
        reservation.status = ReservationStatus::Confirmed;
        let saved = self.store.update(reservation).await?;

        self.cache.invalidate(saved.date);
        info!(
            "admin {} confirmed reservation {} for {}",
            requester.company_name, saved.id, saved.date
        );
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid, requester: &Customer) -> Result<()> {
        let existing = self.load_visible(id, requester).await?;
        if existing.status == ReservationStatus::Confirmed && !requester.is_admin() {
            return Err(Error::Forbidden);
        }

        self.store.delete(id).await?;
        if existing.status == ReservationStatus::Confirmed {
            self.cache.invalidate(existing.date);
        }
        info!(
            "customer {} deleted reservation {}",
            requester.company_name, id
        );
        Ok(())
    }

    /// Cached read of the day's slot grid, recomputed from confirmed
    /// reservations on a miss.
    pub async fn available_slots(&self, date: NaiveDate) -> Result<Vec<Slot>> {
        check_window(Utc::now().date_naive(), date)?;

        if let Some(slots) = self.cache.get(date) {
            return Ok(slots);
        }

        let confirmed = self.store.list_confirmed_for_date(date).await?;
        let slots = compute_slots(&confirmed);
        self.cache.set(date, slots.clone());
        Ok(slots)
    }
}
