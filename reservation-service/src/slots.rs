use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::models::Reservation;

/// Global cap on concurrent participants per hour slot.
pub const CAPACITY_LIMIT: i32 = 50_000;

/// The single capacity pool covers 09:00-18:00, nine one-hour slots.
pub const OPENING_HOUR: u32 = 9;
pub const CLOSING_HOUR: u32 = 18;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub remaining: i32,
}

fn on_the_hour(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

/// Whether the reservation occupies this slot.
pub fn covers(slot: &Slot, reservation: &Reservation) -> bool {
    (reservation.start_time <= slot.start_time && slot.start_time < reservation.end_time)
        || (reservation.start_time < slot.end_time && slot.end_time <= reservation.end_time)
}

/// Derive the day's slot grid from its confirmed reservations.
///
/// Pure: same inputs always yield the same grid, in slot-start order.
/// Remaining capacity is floored at zero, so a grid computed after an
/// over-admission race understates rather than going negative.
pub fn compute_slots(confirmed: &[Reservation]) -> Vec<Slot> {
    let mut slots: Vec<Slot> = (OPENING_HOUR..CLOSING_HOUR)
        .map(|hour| Slot {
            start_time: on_the_hour(hour),
            end_time: on_the_hour(hour + 1),
            remaining: CAPACITY_LIMIT,
        })
        .collect();

    for reservation in confirmed {
        for slot in slots.iter_mut() {
            if covers(slot, reservation) {
                slot.remaining = (slot.remaining - reservation.num_of_participants).max(0);
            }
        }
    }

    slots
}
