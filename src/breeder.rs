use crate::city::{City, CityId};
use crate::distance::DistanceCache;
use crate::error::CrossoverError;
use crate::tour::Tour;
use rand::Rng;
use std::collections::HashSet;

/// Ordered crossover. A contiguous block of `p1` (inclusive bounds) is kept
/// as-is and spliced at its original offset into the cities of `p2` that are
/// not in the block, in `p2` order. Membership is decided by city id, so two
/// distinct cities sharing coordinates both survive.
pub fn ordered_crossover<R: Rng>(
    p1: &[City],
    p2: &[City],
    rng: &mut R,
) -> Result<Vec<City>, CrossoverError> {
    if p1.len() != p2.len() {
        return Err(CrossoverError::ParentLengthMismatch {
            first: p1.len(),
            second: p2.len(),
        });
    }
    let n = p1.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let g1 = rng.gen_range(0..n);
    let g2 = rng.gen_range(0..n);
    let (start, end) = (g1.min(g2), g1.max(g2));

    let segment = &p1[start..=end];
    let taken: HashSet<CityId> = segment.iter().map(|c| c.id).collect();

    let mut child: Vec<City> = p2
        .iter()
        .filter(|c| !taken.contains(&c.id))
        .copied()
        .collect();
    let tail = child.split_off(start.min(child.len()));
    child.extend_from_slice(segment);
    child.extend(tail);

    check_permutation(&child, n)?;
    Ok(child)
}

fn check_permutation(child: &[City], expected: usize) -> Result<(), CrossoverError> {
    let mut seen = HashSet::with_capacity(child.len());
    for c in child {
        if !seen.insert(c.id) {
            return Err(CrossoverError::DuplicateCity(c.id));
        }
    }
    if child.len() != expected {
        return Err(CrossoverError::InvariantViolated {
            expected,
            actual: child.len(),
        });
    }
    Ok(())
}

/// Produces one offspring: crossover, then exactly one swap mutation.
pub fn breed<R: Rng>(
    p1: &Tour,
    p2: &Tour,
    rng: &mut R,
    cache: &mut DistanceCache,
) -> Result<Tour, CrossoverError> {
    let genes = ordered_crossover(p1.cities(), p2.cities(), rng)?;
    let mut offspring = Tour::new(genes, cache);
    offspring.mutate(rng, cache);
    Ok(offspring)
}
