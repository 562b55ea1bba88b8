use std::time::Duration;

use chrono::NaiveDate;
use moka::sync::Cache;

use crate::slots::Slot;

/// Cached grids live for at most an hour; explicit invalidation on writes
/// keeps the window much smaller in practice.
pub const SLOT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Narrow seam over the availability cache so tests can substitute a fake
/// instead of patching shared state.
pub trait SlotCache: Send + Sync {
    fn get(&self, date: NaiveDate) -> Option<Vec<Slot>>;
    fn set(&self, date: NaiveDate, slots: Vec<Slot>);
    fn invalidate(&self, date: NaiveDate);
}

pub struct MokaSlotCache {
    inner: Cache<NaiveDate, Vec<Slot>>,
}

impl MokaSlotCache {
    pub fn new() -> Self {
        Self::with_ttl(SLOT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(64).time_to_live(ttl).build(),
        }
    }
}

impl Default for MokaSlotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotCache for MokaSlotCache {
    fn get(&self, date: NaiveDate) -> Option<Vec<Slot>> {
        self.inner.get(&date)
    }

    fn set(&self, date: NaiveDate, slots: Vec<Slot>) {
        self.inner.insert(date, slots);
    }

    fn invalidate(&self, date: NaiveDate) {
        self.inner.invalidate(&date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::compute_slots;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
    }

    #[test]
    fn set_then_get_returns_the_grid() {
        let cache = MokaSlotCache::new();
        let slots = compute_slots(&[]);

        cache.set(date(10), slots.clone());

        assert_eq!(cache.get(date(10)), Some(slots));
        assert_eq!(cache.get(date(11)), None);
    }

    #[test]
    fn invalidate_removes_only_that_date() {
        let cache = MokaSlotCache::new();
        let slots = compute_slots(&[]);

        cache.set(date(10), slots.clone());
        cache.set(date(11), slots.clone());
        cache.invalidate(date(10));

        assert_eq!(cache.get(date(10)), None);
        assert_eq!(cache.get(date(11)), Some(slots));
    }

    #[test]
    fn entries_expire_after_the_ttl() {
        let cache = MokaSlotCache::with_ttl(Duration::from_millis(20));

        cache.set(date(10), compute_slots(&[]));
        assert!(cache.get(date(10)).is_some());

        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.get(date(10)), None);
    }
}
