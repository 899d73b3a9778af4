use crate::city::{City, CityId};
use std::collections::HashMap;

/// Memoized pairwise distances. Entries are keyed by the unordered pair of
/// city ids, so `(a, b)` and `(b, a)` share one slot.
#[derive(Debug, Default)]
pub struct DistanceCache {
    entries: HashMap<(CityId, CityId), f32>,
}

fn key(a: CityId, b: CityId) -> (CityId, CityId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance(&mut self, a: &City, b: &City) -> f32 {
        if a.id == b.id {
            return 0.0;
        }
        *self.entries.entry(key(a.id, b.id)).or_insert_with(|| {
            let d = a.euclidean(b);
            tracing::trace!(a = %a.id, b = %b.id, d, "cached distance");
            d
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
