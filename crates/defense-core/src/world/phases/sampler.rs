use super::super::World;
use crate::lattice::{GridCoord, Spin};
use rand::Rng;

impl World {
    /// One Metropolis-style single-site update: pick a site uniformly at
    /// random (with replacement, not a sweep), accept a flip outright when it
    /// lowers the energy, otherwise with probability `exp(-ΔE / T)`. Larger
    /// responsiveness T accepts unfavorable flips more freely.
    pub(in crate::world) fn step_sampler_phase(&mut self) {
        let size = self.lattice.size();
        let coord = GridCoord {
            row: self.rng.random_range(0..size),
            col: self.rng.random_range(0..size),
        };
        let delta = self
            .lattice
            .energy_delta(coord, self.config.coupling)
            .expect("sampled site is in bounds");

        let accept = if delta < 0.0 {
            true
        } else {
            self.rng.random::<f64>() < (-delta / self.config.temperature).exp()
        };
        if !accept {
            return;
        }

        let flipped = self
            .lattice
            .spin_at(coord)
            .expect("sampled site is in bounds")
            .flipped();
        // set_spin resets the activation counter on both transitions.
        self.lattice
            .set_spin(coord, flipped)
            .expect("sampled site is in bounds");
        if flipped == Spin::Defended {
            self.counters.activation_events += 1;
        }
    }
}
