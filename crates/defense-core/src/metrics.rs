use crate::herbivore::Herbivore;
use crate::lattice::Lattice;
use serde::{Deserialize, Serialize};

/// Cumulative counters for a run, sufficient for the external analysis
/// scripts to reconstruct activation-vs-attack ratios and cost metrics.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunCounters {
    /// Completed calls to `World::step`.
    pub ticks: u64,
    /// Undefended→defended transitions from sampler acceptance or bites.
    pub activation_events: u64,
    /// Bites on undefended cells (attack succeeded, defense triggered).
    pub undefended_bites: u64,
    /// Bites on defended cells (attack deterred, herbivore died).
    pub deterred_bites: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StepMetrics {
    pub tick: u64,
    pub active_cells: usize,
    pub alive_herbivores: usize,
    pub lattice_energy: f64,
    pub temperature: f64,
    pub activation_events: u64,
    pub undefended_bites: u64,
    pub deterred_bites: u64,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps: usize,
    pub sample_every: usize,
    /// Fixed per-tick elapsed time used for this run.
    pub dt: f64,
    pub final_alive_herbivores: usize,
    pub counters: RunCounters,
    pub samples: Vec<StepMetrics>,
}

pub fn collect_step_metrics(
    lattice: &Lattice,
    herbivores: &[Herbivore],
    counters: &RunCounters,
    coupling: f64,
    temperature: f64,
) -> StepMetrics {
    StepMetrics {
        tick: counters.ticks,
        active_cells: lattice.defended_count(),
        alive_herbivores: herbivores.iter().filter(|h| h.alive).count(),
        lattice_energy: lattice.total_energy(coupling),
        temperature,
        activation_events: counters.activation_events,
        undefended_bites: counters.undefended_bites,
        deterred_bites: counters.deterred_bites,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{GridCoord, Spin};

    #[test]
    fn collect_counts_active_cells_and_alive_herbivores() {
        let mut lattice = Lattice::new(3);
        lattice
            .set_spin(GridCoord::new(0, 0), Spin::Defended)
            .unwrap();
        lattice
            .set_spin(GridCoord::new(2, 2), Spin::Defended)
            .unwrap();
        let mut herbivores = vec![
            Herbivore::new([0.5, 0.5], [1.0, 0.0], 3),
            Herbivore::new([1.5, 1.5], [1.0, 0.0], 3),
        ];
        herbivores[1].alive = false;

        let counters = RunCounters {
            ticks: 10,
            activation_events: 4,
            undefended_bites: 2,
            deterred_bites: 1,
        };
        let metrics = collect_step_metrics(&lattice, &herbivores, &counters, 1.0, 3.0);
        assert_eq!(metrics.tick, 10);
        assert_eq!(metrics.active_cells, 2);
        assert_eq!(metrics.alive_herbivores, 1);
        assert_eq!(metrics.activation_events, 4);
        assert_eq!(metrics.undefended_bites, 2);
        assert_eq!(metrics.deterred_bites, 1);
    }

    #[test]
    fn run_summary_round_trips_through_json() {
        let summary = RunSummary {
            schema_version: 1,
            steps: 100,
            sample_every: 10,
            dt: 1.0 / 60.0,
            final_alive_herbivores: 3,
            counters: RunCounters::default(),
            samples: Vec::new(),
        };
        let json = serde_json::to_string(&summary).unwrap();
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.steps, 100);
        assert_eq!(parsed.final_alive_herbivores, 3);
    }
}
