use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentCustomer;
use crate::errors::{Error, Result};
use crate::handlers::{ReservationChanges, ReservationInput, ReservationService};
use crate::models::{Reservation, ReservationStatus};
use crate::slots::Slot;
use crate::store::CustomerDirectory;

#[derive(Clone)]
pub struct AppState {
    pub service: ReservationService,
    pub customers: Arc<dyn CustomerDirectory>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub num_of_participants: i32,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateReservationRequest {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub num_of_participants: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub num_of_participants: i32,
    pub status: ReservationStatus,
    pub status_display: String,
    pub created_at: DateTime<Utc>,
    pub customer: Uuid,
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            title: reservation.title,
            date: reservation.date,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            num_of_participants: reservation.num_of_participants,
            status: reservation.status,
            status_display: reservation.status.display().to_string(),
            created_at: reservation.created_at,
            customer: reservation.customer_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub date: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/reservations", post(create_reservation).get(list_reservations))
        .route("/reservations/available-slots", get(available_slots))
        .route(
            "/reservations/:id",
            get(get_reservation)
                .put(update_reservation)
                .patch(update_reservation)
                .delete(delete_reservation),
        )
        .route("/reservations/:id/confirm", post(confirm_reservation))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

pub async fn create_reservation(
    State(state): State<AppState>,
    CurrentCustomer(customer): CurrentCustomer,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>)> {
    let input = ReservationInput {
        title: request.title,
        date: request.date,
        start_time: request.start_time,
        end_time: request.end_time,
        num_of_participants: request.num_of_participants,
    };

    let created = state.service.create(&customer, input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    CurrentCustomer(customer): CurrentCustomer,
) -> Result<Json<Vec<ReservationResponse>>> {
    let reservations = state.service.list(&customer).await?;
    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    CurrentCustomer(customer): CurrentCustomer,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>> {
    let reservation = state.service.get(id, &customer).await?;
    Ok(Json(reservation.into()))
}

/// PUT and PATCH share this handler; absent fields keep their stored
/// values, so a full PUT body and a partial PATCH body behave alike.
pub async fn update_reservation(
    State(state): State<AppState>,
    CurrentCustomer(customer): CurrentCustomer,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateReservationRequest>,
) -> Result<Json<ReservationResponse>> {
    let changes = ReservationChanges {
        title: request.title,
        date: request.date,
        start_time: request.start_time,
        end_time: request.end_time,
        num_of_participants: request.num_of_participants,
    };

    let updated = state.service.update(id, &customer, changes).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_reservation(
    State(state): State<AppState>,
    CurrentCustomer(customer): CurrentCustomer,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service.delete(id, &customer).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn confirm_reservation(
    State(state): State<AppState>,
    CurrentCustomer(customer): CurrentCustomer,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>> {
    let confirmed = state.service.confirm(id, &customer).await?;
    Ok(Json(confirmed.into()))
}

pub async fn available_slots(
    State(state): State<AppState>,
    CurrentCustomer(_): CurrentCustomer,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Vec<Slot>>> {
    let raw = query.date.ok_or_else(|| Error::InvalidDate {
        message: "date query parameter is required".to_string(),
    })?;
    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| Error::InvalidDate {
        message: "date query parameter must be formatted YYYY-MM-DD".to_string(),
    })?;

    let slots = state.service.available_slots(date).await?;
    Ok(Json(slots))
}

pub async fn health_check() -> &'static str {
    "OK"
}
