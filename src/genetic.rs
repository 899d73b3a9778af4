use crate::breeder::breed;
use crate::city::{random_cities, City};
use crate::distance::DistanceCache;
use crate::error::{ConfigError, Error};
use crate::population::Population;
use crate::tour::{Tour, TourSnapshot};
use rand::Rng;
use tracing::instrument;

#[derive(Clone, Debug)]
pub struct GaConfig {
    pub population_size: usize,
    pub cities_count: usize,
    pub elite_size: usize,
    pub tournament_size: usize,
    pub generations: usize,
    pub field_size: f32,
    pub margin: f32,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            cities_count: 20,
            elite_size: 1,
            tournament_size: 5,
            generations: 100,
            field_size: 700.0,
            margin: 10.0,
        }
    }
}

impl GaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.cities_count < 2 {
            return Err(ConfigError::TooFewCities(self.cities_count));
        }
        if self.elite_size >= self.population_size {
            return Err(ConfigError::EliteTooLarge {
                elite_size: self.elite_size,
                population_size: self.population_size,
            });
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(ConfigError::InvalidTournamentSize {
                tournament_size: self.tournament_size,
                population_size: self.population_size,
            });
        }
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        // negated so NaN fails too
        if !(self.field_size - 2.0 * self.margin > 0.0)
            || !self.field_size.is_finite()
            || !self.margin.is_finite()
        {
            return Err(ConfigError::FieldTooSmall {
                field_size: self.field_size,
                margin: self.margin,
            });
        }
        Ok(())
    }
}

/// Published once per generation. Holds copies only.
#[derive(Clone, Debug)]
pub struct GenerationReport {
    pub generation: usize,
    pub best: TourSnapshot,
    pub mean_length: f64,
    pub worst_length: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Next generation to be produced, 1-based.
    Running(usize),
    Done,
}

pub struct RunSummary {
    pub best: Tour,
    /// (generation, best length) after each generation
    pub history: Vec<(usize, f64)>,
    pub cache_entries: usize,
}

/// Owns all GA state for one run: the cities, the distance cache, the
/// current population and the random source.
pub struct Evolver<R: Rng> {
    cfg: GaConfig,
    rng: R,
    cache: DistanceCache,
    cities: Vec<City>,
    population: Population,
    best: Option<Tour>,
    phase: Phase,
}

impl<R: Rng> Evolver<R> {
    /// Validates `cfg`, places random cities and builds the initial
    /// population.
    pub fn new(cfg: GaConfig, mut rng: R) -> Result<Self, Error> {
        cfg.validate()?;
        let cities = random_cities(&mut rng, cfg.cities_count, cfg.field_size, cfg.margin);
        Self::with_cities(cfg, cities, rng)
    }

    /// Same as [`Evolver::new`] but on a fixed city set; `cities_count` is
    /// taken from `cities`.
    pub fn with_cities(mut cfg: GaConfig, cities: Vec<City>, mut rng: R) -> Result<Self, Error> {
        cfg.cities_count = cities.len();
        cfg.validate()?;

        let mut cache = DistanceCache::new();
        let population = Population::random(&mut rng, &cities, cfg.population_size, &mut cache);
        tracing::debug!(
            cities = cities.len(),
            population = population.len(),
            "initial population ready"
        );

        Ok(Self {
            cfg,
            rng,
            cache,
            cities,
            population,
            best: None,
            phase: Phase::Running(1),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Produces one generation. Returns `Ok(None)` once all generations
    /// have run.
    pub fn step(&mut self) -> Result<Option<GenerationReport>, Error> {
        let generation = match self.phase {
            Phase::Running(g) => g,
            Phase::Done => return Ok(None),
        };

        let mut next = self.population.elites(self.cfg.elite_size);
        next.reserve(self.cfg.population_size - next.len());

        while next.len() < self.cfg.population_size {
            let p1 = self
                .population
                .select_parent_tournament(&mut self.rng, self.cfg.tournament_size);
            let p2 = self
                .population
                .select_parent_tournament(&mut self.rng, self.cfg.tournament_size);
            let child = breed(p1, p2, &mut self.rng, &mut self.cache)?;
            next.push(child);
        }

        self.population = Population::from_tours(next);
        self.best = self.population.best().cloned();

        let report = match &self.best {
            Some(best) => GenerationReport {
                generation,
                best: best.snapshot(),
                mean_length: self.population.mean_length(),
                worst_length: self
                    .population
                    .worst()
                    .map(Tour::total_length)
                    .unwrap_or_default(),
            },
            None => return Ok(None),
        };
        tracing::debug!(
            generation,
            best = report.best.total_length,
            mean = report.mean_length,
            worst = report.worst_length,
            cache = self.cache.len(),
            "generation complete"
        );

        self.phase = if generation >= self.cfg.generations {
            Phase::Done
        } else {
            Phase::Running(generation + 1)
        };
        Ok(Some(report))
    }

    /// Runs every remaining generation, handing each report to `on_generation`.
    #[instrument(level = "info", skip_all, fields(
        population = self.cfg.population_size,
        cities = self.cities.len(),
        generations = self.cfg.generations,
    ))]
    pub fn run<F>(mut self, mut on_generation: F) -> Result<RunSummary, Error>
    where
        F: FnMut(GenerationReport),
    {
        tracing::info!("evolution started");
        let mut history = Vec::with_capacity(self.cfg.generations);

        while let Some(report) = self.step()? {
            history.push((report.generation, report.best.total_length));
            on_generation(report);
        }

        let cache_entries = self.cache.len();
        let best = match self.best {
            Some(best) => best,
            // generations > 0 is validated, so at least one step ran
            None => Tour::new(self.cities, &mut self.cache),
        };
        tracing::info!(
            best = best.total_length(),
            cache_entries,
            "evolution finished"
        );
        Ok(RunSummary {
            best,
            history,
            cache_entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn square() -> Vec<City> {
        vec![
            City::new(0, 0.0, 0.0),
            City::new(1, 10.0, 0.0),
            City::new(2, 10.0, 10.0),
            City::new(3, 0.0, 10.0),
        ]
    }

    fn small_cfg() -> GaConfig {
        GaConfig {
            population_size: 30,
            cities_count: 15,
            elite_size: 2,
            tournament_size: 4,
            generations: 40,
            ..GaConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(GaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejections() {
        let base = GaConfig::default();

        let cfg = GaConfig { elite_size: 20, ..base.clone() };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EliteTooLarge { elite_size: 20, population_size: 20 })
        );

        let cfg = GaConfig { tournament_size: 21, ..base.clone() };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidTournamentSize { .. })));

        let cfg = GaConfig { tournament_size: 0, ..base.clone() };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidTournamentSize { .. })));

        let cfg = GaConfig { cities_count: 1, ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::TooFewCities(1)));

        let cfg = GaConfig { population_size: 0, elite_size: 0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyPopulation));

        let cfg = GaConfig { generations: 0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::NoGenerations));

        let cfg = GaConfig { field_size: 20.0, margin: 10.0, ..base.clone() };
        assert!(matches!(cfg.validate(), Err(ConfigError::FieldTooSmall { .. })));

        let cfg = GaConfig { field_size: f32::NAN, ..base };
        assert!(matches!(cfg.validate(), Err(ConfigError::FieldTooSmall { .. })));
    }

    #[test]
    fn test_new_refuses_invalid_config() {
        let cfg = GaConfig { elite_size: 25, ..GaConfig::default() };
        let res = Evolver::new(cfg, StdRng::seed_from_u64(0));
        assert!(matches!(res, Err(Error::Config(ConfigError::EliteTooLarge { .. }))));
    }

    #[test]
    fn test_population_size_constant() {
        let mut evolver = Evolver::new(small_cfg(), StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(evolver.phase(), Phase::Running(1));
        while evolver.step().unwrap().is_some() {
            assert_eq!(evolver.population().len(), 30);
        }
        assert_eq!(evolver.phase(), Phase::Done);
    }

    #[test]
    fn test_best_never_worsens() {
        let mut evolver = Evolver::new(small_cfg(), StdRng::seed_from_u64(17)).unwrap();
        let mut last = f64::INFINITY;
        while let Some(report) = evolver.step().unwrap() {
            assert!(
                report.best.total_length <= last,
                "generation {} regressed: {} > {}",
                report.generation,
                report.best.total_length,
                last
            );
            last = report.best.total_length;
        }
    }

    #[test]
    fn test_offspring_are_permutations() {
        let mut evolver = Evolver::new(small_cfg(), StdRng::seed_from_u64(5)).unwrap();
        for _ in 0..10 {
            evolver.step().unwrap();
        }
        let expected: Vec<u32> = (0..15).collect();
        for tour in evolver.population().tours() {
            let mut ids: Vec<u32> = tour.cities().iter().map(|c| c.id.0).collect();
            ids.sort();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn test_generation_indices_and_done() {
        let cfg = GaConfig { generations: 5, ..small_cfg() };
        let mut evolver = Evolver::new(cfg, StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(evolver.phase(), Phase::Running(1));

        let mut seen = Vec::new();
        while let Some(report) = evolver.step().unwrap() {
            seen.push(report.generation);
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        assert!(evolver.step().unwrap().is_none());
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let run = |seed| {
            let evolver = Evolver::new(small_cfg(), StdRng::seed_from_u64(seed)).unwrap();
            let mut reports = Vec::new();
            let summary = evolver.run(|r| reports.push(r.best)).unwrap();
            (reports, summary.best, summary.history)
        };

        let (reports_a, best_a, history_a) = run(123);
        let (reports_b, best_b, history_b) = run(123);
        assert_eq!(reports_a, reports_b);
        assert_eq!(best_a, best_b);
        assert_eq!(history_a, history_b);
    }

    #[test]
    fn test_square_converges_to_perimeter() {
        let cfg = GaConfig {
            population_size: 20,
            elite_size: 1,
            tournament_size: 5,
            generations: 100,
            ..GaConfig::default()
        };
        let evolver = Evolver::with_cities(cfg, square(), StdRng::seed_from_u64(2024)).unwrap();
        let summary = evolver.run(|_| {}).unwrap();

        assert!((summary.best.total_length() - 40.0).abs() < 1e-6);
        let first_optimal = summary
            .history
            .iter()
            .find(|(_, len)| (len - 40.0).abs() < 1e-6)
            .map(|(g, _)| *g)
            .unwrap();
        assert!(first_optimal < 100);
        assert!(summary.cache_entries <= 6);
    }

    #[test]
    fn test_single_offspring_generation() {
        let cfg = GaConfig {
            population_size: 10,
            elite_size: 9,
            generations: 20,
            ..small_cfg()
        };
        let evolver = Evolver::new(cfg, StdRng::seed_from_u64(8)).unwrap();
        let summary = evolver.run(|_| {}).unwrap();
        assert_eq!(summary.history.len(), 20);
    }

    #[test]
    fn test_tournament_of_whole_population() {
        let cfg = GaConfig {
            population_size: 12,
            tournament_size: 12,
            generations: 15,
            ..small_cfg()
        };
        let mut evolver = Evolver::new(cfg, StdRng::seed_from_u64(31)).unwrap();
        while evolver.step().unwrap().is_some() {
            assert_eq!(evolver.population().len(), 12);
        }
    }

    #[test]
    fn test_two_cities() {
        let cfg = GaConfig { cities_count: 2, generations: 3, ..small_cfg() };
        let evolver = Evolver::new(cfg, StdRng::seed_from_u64(0)).unwrap();
        let cities = evolver.cities().to_vec();
        let summary = evolver.run(|_| {}).unwrap();
        let expected = 2.0 * cities[0].euclidean(&cities[1]) as f64;
        assert!((summary.best.total_length() - expected).abs() < 1e-4);
    }
}
