use crate::city::City;
use crate::distance::DistanceCache;
use rand::Rng;

/// One candidate solution: a visiting order over every city plus the length
/// of the closed loop through them (lower = better).
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    cities: Vec<City>,
    total_length: f64,
}

/// Owned copy of a tour handed to whoever draws or prints it.
#[derive(Debug, Clone, PartialEq)]
pub struct TourSnapshot {
    pub points: Vec<(f32, f32)>,
    pub total_length: f64,
}

/// Sum of consecutive legs plus the closing leg from last back to first.
pub fn closed_length(cities: &[City], cache: &mut DistanceCache) -> f64 {
    if cities.len() < 2 {
        return 0.0;
    }
    let legs: f64 = cities
        .windows(2)
        .map(|w| cache.distance(&w[0], &w[1]) as f64)
        .sum();
    let wrap = cache.distance(&cities[cities.len() - 1], &cities[0]) as f64;
    legs + wrap
}

impl Tour {
    /// Callers must pass a permutation of the full city set; the length is
    /// computed as given.
    pub fn new(cities: Vec<City>, cache: &mut DistanceCache) -> Self {
        let total_length = closed_length(&cities, cache);
        Self {
            cities,
            total_length,
        }
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Swap mutation. Both positions are drawn independently, so the swap
    /// is a no-op when they coincide.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R, cache: &mut DistanceCache) {
        if self.cities.is_empty() {
            return;
        }
        let p1 = rng.gen_range(0..self.cities.len());
        let p2 = rng.gen_range(0..self.cities.len());
        self.cities.swap(p1, p2);
        self.total_length = closed_length(&self.cities, cache);
    }

    pub fn snapshot(&self) -> TourSnapshot {
        TourSnapshot {
            points: self.cities.iter().map(City::position).collect(),
            total_length: self.total_length,
        }
    }
}
