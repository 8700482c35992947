pub mod config;
pub mod constants;
pub mod herbivore;
pub mod lattice;
pub mod metrics;
pub mod rng;
pub mod world;

pub use constants::MAX_GRID_SIZE;
pub use lattice::{Cell, GridCoord, Lattice, LatticeError, Spin};
pub use metrics::{RunCounters, RunSummary, StepMetrics};
pub use world::{ExperimentError, World};
