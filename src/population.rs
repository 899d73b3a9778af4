use crate::city::City;
use crate::distance::DistanceCache;
use crate::tour::Tour;
use rand::{seq::SliceRandom, Rng};
use std::cmp::Ordering;

fn by_length(a: &Tour, b: &Tour) -> Ordering {
    a.total_length()
        .partial_cmp(&b.total_length())
        .unwrap_or(Ordering::Equal)
}

/// All tours of one generation.
#[derive(Debug, Clone)]
pub struct Population {
    tours: Vec<Tour>,
}

impl Population {
    pub fn from_tours(tours: Vec<Tour>) -> Self {
        Self { tours }
    }

    /// `size` tours, each an independent shuffle of `cities`.
    pub fn random<R: Rng>(
        rng: &mut R,
        cities: &[City],
        size: usize,
        cache: &mut DistanceCache,
    ) -> Self {
        let tours = (0..size)
            .map(|_| {
                let mut order = cities.to_vec();
                order.shuffle(rng);
                Tour::new(order, cache)
            })
            .collect();
        Self { tours }
    }

    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    pub fn len(&self) -> usize {
        self.tours.len()
    }

    /// Tournament selection: `size` draws with replacement, shortest tour
    /// wins. The first drawn wins ties.
    pub fn select_parent_tournament<R: Rng>(&self, rng: &mut R, size: usize) -> &Tour {
        let mut best = &self.tours[rng.gen_range(0..self.tours.len())];
        for _ in 1..size {
            let cand = &self.tours[rng.gen_range(0..self.tours.len())];
            if cand.total_length() < best.total_length() {
                best = cand;
            }
        }
        best
    }

    /// The `count` shortest tours, ties kept in population order.
    pub fn elites(&self, count: usize) -> Vec<Tour> {
        let mut sorted: Vec<&Tour> = self.tours.iter().collect();
        sorted.sort_by(|a, b| by_length(a, b));
        sorted.into_iter().take(count).cloned().collect()
    }

    /// Shortest tour; the earliest one on ties.
    pub fn best(&self) -> Option<&Tour> {
        self.tours
            .iter()
            .reduce(|best, t| if by_length(t, best) == Ordering::Less { t } else { best })
    }

    pub fn worst(&self) -> Option<&Tour> {
        self.tours.iter().max_by(|a, b| by_length(a, b))
    }

    pub fn mean_length(&self) -> f64 {
        if self.tours.is_empty() {
            return 0.0;
        }
        self.tours.iter().map(Tour::total_length).sum::<f64>() / self.tours.len() as f64
    }
}
