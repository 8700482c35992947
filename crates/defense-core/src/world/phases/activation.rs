use super::super::World;
use crate::lattice::Spin;

impl World {
    /// Bounded activation clock: advance every defended cell's counter and
    /// force it back to undefended when the counter wraps. This pass covers
    /// all defended cells, not only the one the sampler touched this tick,
    /// so bite-activated cells obey the same bound.
    pub(in crate::world) fn step_activation_phase(&mut self) {
        let max_ticks = self.config.max_activation_ticks;
        for cell in self.lattice.cells_mut() {
            if cell.spin != Spin::Defended {
                continue;
            }
            cell.activation_ticks = (cell.activation_ticks + 1) % max_ticks;
            if cell.activation_ticks == 0 {
                cell.spin = Spin::Undefended;
            }
        }
    }
}
