use crate::config::{SimConfig, SimConfigError};
use crate::herbivore::Herbivore;
use crate::lattice::{GridCoord, Lattice, LatticeError, Spin};
use crate::metrics::{collect_step_metrics, RunCounters, RunSummary};
use crate::rng;
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use std::f64::consts::TAU;
use std::{error::Error, fmt};

mod phases;


/// Owns the defense lattice, the herbivore population, and the single RNG
/// stream. The external driver advances it one tick at a time with
/// [`World::step`]; every tick runs the sampler, then the activation clock,
/// then one full herbivory pass, in that fixed order.
pub struct World {
    lattice: Lattice,
    herbivores: Vec<Herbivore>,
    // Kept private to preserve constructor invariants; mutated only through
    // the thermostat editor operation.
    config: SimConfig,
    rng: ChaCha12Rng,
    counters: RunCounters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentError {
    InvalidSampleEvery,
    TooManySteps { max: usize, actual: usize },
    TooManySamples { max: usize, actual: usize },
}

impl fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentError::InvalidSampleEvery => write!(f, "sample_every must be greater than 0"),
            ExperimentError::TooManySteps { max, actual } => {
                write!(f, "steps ({actual}) exceeds supported maximum ({max})")
            }
            ExperimentError::TooManySamples { max, actual } => {
                write!(f, "samples ({actual}) exceeds supported maximum ({max})")
            }
        }
    }
}

impl Error for ExperimentError {}

impl World {
    pub const MAX_EXPERIMENT_STEPS: usize = 10_000_000;
    pub const MAX_EXPERIMENT_SAMPLES: usize = 1_000_000;

    pub fn new(config: SimConfig) -> Result<Self, SimConfigError> {
        config.validate()?;
        let mut rng = rng::create_rng(config.seed);

        let mut lattice = Lattice::new(config.grid_size);
        if config.mixed_start {
            for cell in lattice.cells_mut() {
                if rng.random::<bool>() {
                    cell.spin = Spin::Defended;
                }
            }
        }

        let extent = config.grid_size as f64;
        let herbivores = (0..config.herbivore_count)
            .map(|_| {
                let position = [rng.random::<f64>() * extent, rng.random::<f64>() * extent];
                let heading = rng.random_range(0.0..TAU);
                let velocity = [
                    heading.cos() * config.herbivore_speed,
                    heading.sin() * config.herbivore_speed,
                ];
                let cooldown = rng.random_range(0..config.bite_cooldown_ticks);
                Herbivore::new(position, velocity, cooldown)
            })
            .collect();

        Ok(Self {
            lattice,
            herbivores,
            config,
            rng,
            counters: RunCounters::default(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn herbivores(&self) -> &[Herbivore] {
        &self.herbivores
    }

    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    pub fn temperature(&self) -> f64 {
        self.config.temperature
    }

    pub fn alive_count(&self) -> usize {
        self.herbivores.iter().filter(|h| h.alive).count()
    }

    pub fn active_cell_count(&self) -> usize {
        self.lattice.defended_count()
    }

    /// Editor operation: overwrite one cell's spin (mouse toggle in the
    /// external input loop). Resets the cell's activation counter; does not
    /// touch the run counters, which track simulation dynamics only.
    pub fn set_cell(&mut self, coord: GridCoord, spin: Spin) -> Result<(), LatticeError> {
        self.lattice.set_spin(coord, spin)
    }

    /// Editor operation: thermostat control over the responsiveness.
    pub fn set_temperature(&mut self, value: f64) -> Result<(), SimConfigError> {
        SimConfig::validate_temperature(value)?;
        self.config.temperature = value;
        Ok(())
    }

    /// Advance the world by one tick. `dt` is the elapsed model time since
    /// the previous tick and scales movement only; a non-finite or negative
    /// dt is treated as 0 (the sampler, clock, and predation still run).
    pub fn step(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if self.config.enable_sampler {
            self.step_sampler_phase();
        }
        self.step_activation_phase();
        if self.config.enable_herbivory {
            self.step_herbivory_phase(dt);
        }
        self.counters.ticks += 1;
    }

    /// Run `steps` ticks at a fixed `dt`, sampling metrics every
    /// `sample_every` ticks (plus the final tick).
    pub fn run_experiment(
        &mut self,
        steps: usize,
        sample_every: usize,
        dt: f64,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if steps > Self::MAX_EXPERIMENT_STEPS {
            return Err(ExperimentError::TooManySteps {
                max: Self::MAX_EXPERIMENT_STEPS,
                actual: steps,
            });
        }
        let estimated_samples = if steps == 0 {
            0
        } else {
            ((steps - 1) / sample_every) + 1
        };
        if estimated_samples > Self::MAX_EXPERIMENT_SAMPLES {
            return Err(ExperimentError::TooManySamples {
                max: Self::MAX_EXPERIMENT_SAMPLES,
                actual: estimated_samples,
            });
        }

        let mut samples = Vec::with_capacity(estimated_samples);
        for step in 1..=steps {
            self.step(dt);
            if step % sample_every == 0 || step == steps {
                samples.push(collect_step_metrics(
                    &self.lattice,
                    &self.herbivores,
                    &self.counters,
                    self.config.coupling,
                    self.config.temperature,
                ));
            }
        }
        Ok(RunSummary {
            schema_version: 1,
            steps,
            sample_every,
            dt,
            final_alive_herbivores: self.alive_count(),
            counters: self.counters,
            samples,
        })
    }
}
