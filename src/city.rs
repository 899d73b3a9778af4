use rand::Rng;
use std::fmt;

/// Stable identity of a city, independent of where it sits on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CityId(pub u32);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point on the field. Cities are the genes of a tour and never change
/// once placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub id: CityId,
    pub x: f32,
    pub y: f32,
}

impl City {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id: CityId(id),
            x,
            y,
        }
    }

    /// Straight-line distance, uncached.
    pub fn euclidean(&self, other: &City) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// Places `count` cities uniformly inside `[margin, field_size - margin]` on
/// both axes. Ids are assigned sequentially from zero.
pub fn random_cities<R: Rng>(rng: &mut R, count: usize, field_size: f32, margin: f32) -> Vec<City> {
    let min = margin;
    let max = field_size - margin;
    (0..count)
        .map(|i| {
            let x = rng.gen_range(min..=max);
            let y = rng.gen_range(min..=max);
            let city = City::new(i as u32, x, y);
            tracing::debug!(id = %city.id, x, y, "placed city");
            city
        })
        .collect()
}
