use crate::city::CityId;

/// Rejected run parameters. Checked once before any city is placed.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq))]
pub enum ConfigError {
    #[error("population size must be greater than 0")]
    EmptyPopulation,

    #[error("need at least 2 cities, got {0}")]
    TooFewCities(usize),

    #[error("elite size ({elite_size}) must be smaller than population size ({population_size})")]
    EliteTooLarge {
        elite_size: usize,
        population_size: usize,
    },

    #[error("tournament size must be between 1 and population size ({population_size}), got {tournament_size}")]
    InvalidTournamentSize {
        tournament_size: usize,
        population_size: usize,
    },

    #[error("generation count must be greater than 0")]
    NoGenerations,

    #[error("field size ({field_size}) must exceed twice the margin ({margin})")]
    FieldTooSmall { field_size: f32, margin: f32 },
}

/// Offspring failed the permutation check after crossover.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum CrossoverError {
    #[error("parents differ in length: {first} vs {second}")]
    ParentLengthMismatch { first: usize, second: usize },

    #[error("crossover invariant violated: expected {expected} cities, got {actual}")]
    InvariantViolated { expected: usize, actual: usize },

    #[error("crossover invariant violated: city {0} appears more than once")]
    DuplicateCity(CityId),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("breeding failed: {0}")]
    Crossover(#[from] CrossoverError),
}
