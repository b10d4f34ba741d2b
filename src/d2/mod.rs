mod cell;
pub mod rate;

pub use cell::{CellState, MAX_THICKNESS};

use log::{debug, info};
use ndarray::{Array, Array2, Zip};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::error::{BoxError, OxidationError};
use crate::params::SimulationParameters;

/// Source of uniform draws in [0, 1).
pub trait RandomSource {
    fn uniform(&mut self) -> f64;
}

impl<R: RngCore> RandomSource for R {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Receives a snapshot of cell codes every reporting interval.
pub trait Observer {
    /// `elapsed` is the simulated time in seconds at the end of `tick`.
    fn observe(
        &mut self,
        tick: usize,
        elapsed: f64,
        snapshot: &Array2<u8>,
    ) -> Result<(), BoxError>;
}

/// Cell counts per state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Census {
    pub metallic: usize,
    pub oxide: usize,
    pub void: usize,
}

pub struct Simulation<S = StdRng> {
    params: SimulationParameters,
    grid: Array2<CellState>,
    concentration: Array2<f64>,
    source: S,
    tick: usize,
}

impl Simulation<StdRng> {
    /// Seeded from `params.seed`, or from entropy when there is none.
    pub fn new(params: SimulationParameters) -> Result<Self, OxidationError> {
        let source = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_source(params, source)
    }
}

impl<S: RandomSource> Simulation<S> {
    pub fn with_source(params: SimulationParameters, source: S) -> Result<Self, OxidationError> {
        params.validate()?;

        let shape = params.shape();
        let concentration = params.concentration.field(shape);

        Ok(Simulation {
            grid: Array::from_elem(shape, CellState::Metallic),
            concentration,
            params,
            source,
            tick: 0,
        })
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn grid(&self) -> &Array2<CellState> {
        &self.grid
    }

    /// Ticks applied so far.
    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Seconds simulated so far.
    pub fn elapsed(&self) -> f64 {
        self.tick as f64 * self.params.time_step
    }

    pub fn is_finished(&self) -> bool {
        self.tick >= self.params.ticks()
    }

    pub fn snapshot(&self) -> Array2<u8> {
        self.grid.mapv(CellState::code)
    }

    pub fn census(&self) -> Census {
        self.grid.iter().fold(Census::default(), |mut census, cell| {
            match cell {
                CellState::Metallic => census.metallic += 1,
                CellState::Oxide(_) => census.oxide += 1,
                CellState::Void => census.void += 1,
            }
            census
        })
    }

    /// Oxidation probability of every cell for the current tick.
    fn rates(&self) -> Result<Array2<f64>, OxidationError> {
        let mut rates = rate::rate_field(&self.params, &self.concentration);

        if let Some(((row, col), &value)) = rates.indexed_iter().find(|(_, r)| !r.is_finite()) {
            return Err(OxidationError::Numeric {
                tick: self.tick,
                row,
                col,
                value,
            });
        }

        rates.mapv_inplace(|r| r.max(0.0).min(1.0));
        Ok(rates)
    }

    /// Advance one tick and return the new snapshot.
    pub fn step(&mut self) -> Result<Array2<u8>, OxidationError> {
        let rates = self.rates()?;
        let source = &mut self.source;

        let next = Zip::from(&self.grid)
            .and(&rates)
            .map_collect(|&cell, &rate| cell.transition(rate, source));

        self.grid = next;
        self.tick += 1;

        Ok(self.snapshot())
    }

    /// Run the remaining ticks, reporting every `report_every` ticks.
    pub fn run<O: Observer>(&mut self, observer: &mut O) -> Result<Census, OxidationError> {
        let (rows, cols) = self.params.shape();
        let ticks = self.params.ticks();
        info!(
            "oxidizing {} x {} cells for {} ticks of {} s at {} K",
            rows, cols, ticks, self.params.time_step, self.params.temperature
        );

        while !self.is_finished() {
            let t = self.tick;
            let snapshot = self.step()?;

            if t % self.params.report_every == 0 {
                debug!("tick {}: {:?}", t, self.census());
                observer
                    .observe(t, self.elapsed(), &snapshot)
                    .map_err(OxidationError::Observer)?;
            }
        }

        let census = self.census();
        info!(
            "finished after {} s: {} metallic, {} oxide, {} void",
            self.elapsed(),
            census.metallic,
            census.oxide,
            census.void
        );
        Ok(census)
    }
}

#[cfg(test)]
pub(crate) struct Constant(pub f64);

#[cfg(test)]
impl RandomSource for Constant {
    fn uniform(&mut self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::ConcentrationProfile;
    use approx::assert_abs_diff_eq;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(usize, f64, Array2<u8>)>,
    }

    impl Observer for Recorder {
        fn observe(
            &mut self,
            tick: usize,
            elapsed: f64,
            snapshot: &Array2<u8>,
        ) -> Result<(), BoxError> {
            self.frames.push((tick, elapsed, snapshot.clone()));
            Ok(())
        }
    }

    struct Broken;

    impl Observer for Broken {
        fn observe(&mut self, _: usize, _: f64, _: &Array2<u8>) -> Result<(), BoxError> {
            Err("display closed".into())
        }
    }

    /// 2 x 2 grid, two 1 s ticks, every cell certain to oxidize.
    fn small() -> SimulationParameters {
        SimulationParameters {
            rows: 2,
            cols: 2,
            time_step: 1.0,
            duration: 2.0,
            report_every: 1,
            concentration: ConcentrationProfile::Linear {
                surface: 1.0,
                bulk: 0.0,
            },
            ..SimulationParameters::default()
        }
    }

    #[test]
    fn test_starts_metallic() {
        let sim = Simulation::new(SimulationParameters::default()).unwrap();

        assert_eq!(sim.grid().dim(), (100, 100));
        assert!(sim.grid().iter().all(|&c| c == CellState::Metallic));
        assert_eq!(sim.tick(), 0);
        assert_abs_diff_eq!(sim.elapsed(), 0.0);
        assert_eq!(
            sim.census(),
            Census {
                metallic: 10000,
                oxide: 0,
                void: 0
            }
        );
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let params = SimulationParameters {
            gas_constant: 0.0,
            ..SimulationParameters::default()
        };

        match Simulation::new(params) {
            Err(OxidationError::Configuration(_)) => {}
            Err(e) => panic!("unexpected {}", e),
            Ok(_) => panic!("zero gas constant accepted"),
        }
    }

    #[test]
    fn test_always_oxidize() {
        let mut sim = Simulation::with_source(small(), Constant(0.0)).unwrap();

        sim.step().unwrap();
        assert!(sim.grid().iter().all(|&c| c == CellState::Oxide(1)));

        // rate 1 -> thickness 2, negated, clamped to 0
        let snapshot = sim.step().unwrap();
        assert!(sim.grid().iter().all(|&c| c == CellState::Void));
        assert!(snapshot.iter().all(|&c| c == 2));
        assert!(sim.is_finished());
    }

    #[test]
    fn test_never_oxidize() {
        let params = SimulationParameters {
            duration: 50.0,
            ..small()
        };
        let mut sim = Simulation::with_source(params, Constant(1.0)).unwrap();
        let mut recorder = Recorder::default();

        let census = sim.run(&mut recorder).unwrap();

        assert_eq!(census.metallic, 4);
        assert!(sim.grid().iter().all(|&c| c == CellState::Metallic));
        assert_eq!(recorder.frames.len(), 50);
    }

    #[test]
    fn test_uniform_concentration_never_oxidizes() {
        let params = SimulationParameters {
            rows: 5,
            cols: 5,
            duration: 10.0,
            ..SimulationParameters::default()
        };
        let mut sim = Simulation::with_source(params, Constant(0.0)).unwrap();

        for _ in 0..10 {
            sim.step().unwrap();
        }
        assert_eq!(sim.census().metallic, 25);
    }

    #[test]
    fn test_snapshots() {
        let params = SimulationParameters {
            rows: 7,
            cols: 3,
            duration: 20.0,
            seed: Some(42),
            ..small()
        };
        let mut sim = Simulation::new(params).unwrap();
        let mut recorder = Recorder::default();

        sim.run(&mut recorder).unwrap();

        assert_eq!(recorder.frames.len(), 20);
        for (_, _, snapshot) in &recorder.frames {
            assert_eq!(snapshot.dim(), (7, 3));
            assert!(snapshot.iter().all(|&c| c <= 2));
        }
        assert_eq!(recorder.frames.last().unwrap().2, sim.snapshot());
    }

    #[test]
    fn test_void_stays_void() {
        let params = SimulationParameters {
            rows: 10,
            cols: 10,
            duration: 30.0,
            seed: Some(7),
            ..small()
        };
        let mut sim = Simulation::new(params).unwrap();
        let mut previous = sim.grid().clone();

        while !sim.is_finished() {
            sim.step().unwrap();
            Zip::from(&previous).and(sim.grid()).for_each(|&before, &after| {
                if before == CellState::Void {
                    assert_eq!(after, CellState::Void);
                }
                if let CellState::Oxide(k) = after {
                    assert!((1..=MAX_THICKNESS).contains(&k));
                }
            });
            previous = sim.grid().clone();
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let params = SimulationParameters {
            rows: 8,
            cols: 8,
            duration: 5.0,
            seed: Some(3),
            ..small()
        };

        let mut a = Simulation::new(params.clone()).unwrap();
        let mut b = Simulation::new(params).unwrap();
        for _ in 0..5 {
            assert_eq!(a.step().unwrap(), b.step().unwrap());
        }
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn test_report_cadence() {
        let params = SimulationParameters {
            duration: 10.0,
            time_step: 0.5,
            report_every: 3,
            ..small()
        };
        let mut sim = Simulation::with_source(params, Constant(1.0)).unwrap();
        let mut recorder = Recorder::default();

        sim.run(&mut recorder).unwrap();

        let ticks: Vec<usize> = recorder.frames.iter().map(|f| f.0).collect();
        assert_eq!(ticks, vec![0, 3, 6, 9, 12, 15, 18]);
        assert_abs_diff_eq!(recorder.frames[0].1, 0.5);
        assert_abs_diff_eq!(recorder.frames[1].1, 2.0);
        assert_eq!(sim.tick(), 20);
    }

    #[test]
    fn test_non_finite_rate() {
        let params = SimulationParameters {
            concentration: ConcentrationProfile::Linear {
                surface: f64::MAX,
                bulk: 0.0,
            },
            ..small()
        };
        let mut sim = Simulation::with_source(params, Constant(0.0)).unwrap();

        match sim.step() {
            Err(OxidationError::Numeric { tick, row, col, .. }) => {
                assert_eq!((tick, row, col), (0, 0, 0));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn test_observer_failure_aborts() {
        let mut sim = Simulation::with_source(small(), Constant(0.0)).unwrap();

        match sim.run(&mut Broken) {
            Err(OxidationError::Observer(e)) => assert_eq!(e.to_string(), "display closed"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sim.tick(), 1);
    }
}
