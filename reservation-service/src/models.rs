use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Customer,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub company_name: String,
    pub role: Role,
}

impl Customer {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "Pending confirmation",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Cancelled => "Cancelled",
        }
    }
}

impl TryFrom<&str> for ReservationStatus {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(ReservationStatus::Pending),
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            other => Err(anyhow::anyhow!("unknown reservation status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub customer_id: Uuid,
    pub num_of_participants: i32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Half-open interval overlap against `[start, end)`.
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time < end && self.end_time > start
    }
}

#[derive(Debug, Clone, Queryable)]
pub struct DbCustomer {
    pub id: Uuid,
    pub company_name: String,
    pub is_admin: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<DbCustomer> for Customer {
    fn from(row: DbCustomer) -> Self {
        Self {
            id: row.id,
            company_name: row.company_name,
            role: if row.is_admin { Role::Admin } else { Role::Customer },
        }
    }
}

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::reservations)]
pub struct DbReservation {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub customer_id: Uuid,
    pub num_of_participants: i32,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Reservation> for DbReservation {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            title: reservation.title,
            date: reservation.date,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            customer_id: reservation.customer_id,
            num_of_participants: reservation.num_of_participants,
            status: reservation.status.as_str().to_string(),
            created_at: Some(reservation.created_at),
            updated_at: Some(reservation.updated_at),
        }
    }
}

impl TryFrom<DbReservation> for Reservation {
    type Error = anyhow::Error;

    fn try_from(row: DbReservation) -> Result<Self, Self::Error> {
        let status = ReservationStatus::try_from(row.status.as_str())?;

        Ok(Self {
            id: row.id,
            title: row.title,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            customer_id: row.customer_id,
            num_of_participants: row.num_of_participants,
            status,
            created_at: row.created_at.unwrap_or_else(Utc::now),
            updated_at: row.updated_at.unwrap_or_else(Utc::now),
        })
    }
}
